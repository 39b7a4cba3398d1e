//! `multipart/form-data` parsing
//!
//! Text fields become strings. File fields are written to disk and represented as
//! `{"name", "type", "size", "path"}` objects, where `path` starts with the upload prefix

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};
use tokio::fs;
use tracing::debug;

use crate::params::{Params, ContentError, query};

/// `boundary` parameter of a multipart content type
pub(crate) fn boundary(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("boundary") { return None; }
        let value = value.trim();
        let value = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack.get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

fn malformed(what: &str) -> ContentError {
    ContentError::Malformed(format!("multipart: {what}"))
}

/// Splits the body into raw parts (headers + data)
fn split_parts<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>, ContentError> {
    let delimiter = format!("--{boundary}");
    let next_delimiter = format!("\r\n--{boundary}");

    let mut pos = find(body, delimiter.as_bytes(), 0).ok_or_else(|| malformed("no opening boundary"))? + delimiter.len();
    let mut parts = vec![];
    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            // closing delimiter
            return Ok(parts);
        }
        let start = if rest.starts_with(b"\r\n") { pos + 2 } else { return Err(malformed("bad boundary line")) };
        let end = find(body, next_delimiter.as_bytes(), start).ok_or_else(|| malformed("no closing boundary"))?;
        parts.push(&body[start..end]);
        pos = end + next_delimiter.len();
    }
}

struct Part<'a> {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: &'a [u8],
}

/// Reads `name="x"` style parameters of a header value
fn header_param(value: &str, param: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|p| {
        let (name, value) = p.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case(param) { return None; }
        let value = value.trim();
        Some(value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value).to_string())
    })
}

fn parse_part(raw: &[u8]) -> Result<Part<'_>, ContentError> {
    let split = find(raw, b"\r\n\r\n", 0).ok_or_else(|| malformed("part without headers"))?;
    let head = String::from_utf8_lossy(&raw[..split]);
    let data = &raw[split + 4..];

    let mut disposition = None;
    let mut content_type = None;
    for line in head.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else { continue };
        if name.trim().eq_ignore_ascii_case("Content-Disposition") {
            disposition = Some(value.trim().to_string());
        } else if name.trim().eq_ignore_ascii_case("Content-Type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let disposition = disposition.ok_or_else(|| malformed("part without Content-Disposition"))?;
    let name = header_param(&disposition, "name").ok_or_else(|| malformed("part without a name"))?;
    let filename = header_param(&disposition, "filename");
    Ok(Part { name, filename, content_type, data })
}

static UPLOADS: AtomicU64 = AtomicU64::new(0);

fn upload_path(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default();
    let n = UPLOADS.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{}-{nanos:x}-{n}", std::process::id())
}

async fn store(path: &str, data: &[u8], written: &[String]) -> Result<(), ContentError> {
    if let Err(err) = fs::write(path, data).await {
        for path in written {
            let _ = fs::remove_file(path).await;
        }
        return Err(err.into());
    }
    Ok(())
}

/// Parses a complete multipart body
///
/// Every part is checked before the first file is written, so a malformed body leaves
/// nothing behind under the upload prefix
pub(crate) async fn parse(body: &[u8], boundary: &str, upload_prefix: &str) -> Result<Params, ContentError> {
    let parts = split_parts(body, boundary)?
        .into_iter()
        .map(parse_part)
        .collect::<Result<Vec<_>, _>>()?;

    let mut params = Params::new();
    let mut written = vec![];
    for part in parts {
        let value = match part.filename {
            // browsers send an empty filename when no file was selected
            Some(filename) if filename.is_empty() => continue,
            Some(filename) => {
                let path = upload_path(upload_prefix);
                store(&path, part.data, &written).await?;
                debug!(field = %part.name, path = %path, size = part.data.len(), "stored upload");
                written.push(path.clone());
                json!({
                    "name": filename,
                    "type": part.content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                    "size": part.data.len(),
                    "path": path,
                })
            }
            None => Value::String(String::from_utf8_lossy(part.data).into_owned()),
        };
        query::insert(&mut params, part.name, value);
    }
    Ok(params)
}
