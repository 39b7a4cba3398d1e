use base64::{Engine as _, engine::general_purpose::STANDARD};

use dstack::prelude::*;
use dstack::params::filter;
use dstack::reqres::res;

struct Greeter;

impl HttpService for Greeter {
    type Output = HttpResponse;

    async fn request(&self, req: &HttpRequest) -> HttpResult {
        let filters = Filters::new().add("times", filter::number);
        let params = req.filter_params(&filters, 1024, "").await?;
        let times = params.get("times").and_then(|t| t.as_u64()).unwrap_or(1);

        let user = req.remote_user().unwrap_or_default();
        let greeting = format!("Krif voth ahkrin, {user}!\n");
        Ok(res::text(greeting.repeat(times as usize)))
    }
}

fn check(user: &str, pass: &str) -> Option<String> {
    (user == "drako" && pass == "dovah").then(|| "Dovahkiin".to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut server = HttpServer::new();
    server.service(BasicAuth::new(Greeter, check).realm("Sovngarde"));

    let attempts = [
        None,
        Some("Bearer nope".to_string()),
        Some(format!("Basic {}", STANDARD.encode("drako:wrong"))),
        Some(format!("Basic {}", STANDARD.encode("drako:dovah"))),
    ];

    for auth in attempts {
        let mut builder = HttpRequest::builder()
            .path("/greet?times=2")
            .header("Host", "localhost:8080")
            .header("User-Agent", "demo/1.0");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let req = match builder.build() {
            Ok(req) => req,
            Err(err) => {
                eprintln!("bad request setup: {err}");
                return;
            }
        };

        let res = server.handle(&req).await;
        let status = res.status;
        let challenge = res.header("WWW-Authenticate").unwrap_or("-").to_string();
        let body = res.content.into_bytes().await.unwrap_or_default();
        println!("{} {} (challenge: {challenge})", status, status.as_str());
        print!("{}", String::from_utf8_lossy(&body));
        println!();
    }
}
