use std::io;
use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::util::escape;

/// Single-use readable content stream
pub type HttpContent = Box<dyn AsyncRead + Send + Unpin>;

/// Body of the response
#[non_exhaustive]
pub enum HttpBody {
    /// No data, **does not have Content-Length**
    Empty,
    /// In-memory bytes
    Bytes(Vec<u8>),
    /// Stream to be read by the transport
    Stream(HttpContent),
}

impl HttpBody {
    /// Wraps a readable stream
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> HttpBody {
        HttpBody::Stream(Box::new(reader))
    }

    /// Length if it is known without reading
    pub fn len(&self) -> Option<u64> {
        match self {
            HttpBody::Empty => Some(0),
            HttpBody::Bytes(v) => Some(v.len() as u64),
            HttpBody::Stream(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Reads the whole body into memory
    pub async fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            HttpBody::Empty => Ok(vec![]),
            HttpBody::Bytes(v) => Ok(v),
            HttpBody::Stream(mut reader) => {
                let mut buf = vec![];
                reader.read_to_end(&mut buf).await?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for HttpBody {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpBody::Empty => fmt.write_str("HttpBody::Empty"),
            HttpBody::Bytes(v) => write!(fmt, r#"HttpBody::Bytes(b"{}")"#, escape::to_utf8(v)),
            HttpBody::Stream(_) => fmt.write_str("HttpBody::Stream(..)"),
        }
    }
}

impl Default for HttpBody {
    fn default() -> HttpBody {
        HttpBody::Empty
    }
}

impl From<Vec<u8>> for HttpBody {
    fn from(v: Vec<u8>) -> HttpBody {
        HttpBody::Bytes(v)
    }
}

impl From<String> for HttpBody {
    fn from(s: String) -> HttpBody {
        HttpBody::Bytes(s.into_bytes())
    }
}

impl From<&str> for HttpBody {
    fn from(s: &str) -> HttpBody {
        HttpBody::Bytes(s.as_bytes().to_vec())
    }
}

impl From<HttpContent> for HttpBody {
    fn from(reader: HttpContent) -> HttpBody {
        HttpBody::Stream(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpBody;

    #[tokio::test]
    async fn stream_into_bytes() {
        let body = HttpBody::stream(&b"streamed"[..]);
        assert_eq!(body.len(), None);
        assert_eq!(body.into_bytes().await.unwrap(), b"streamed");
    }

    #[test]
    fn debug_escapes() {
        let body = HttpBody::from(b"a\nb".to_vec());
        assert_eq!(format!("{body:?}"), r#"HttpBody::Bytes(b"a\x0ab")"#);
    }
}
