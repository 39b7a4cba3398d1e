use tracing::{info, error};

use crate::core::{HttpLogger, HttpError};
use crate::reqres::{HttpRequest, HttpResponse};
use crate::util::escape;

/// Default logger, writes one `tracing` event per exchange
pub struct DefaultLogger;

impl DefaultLogger {
    fn agent(req: &HttpRequest) -> String {
        // User-Agents are long, print only first segment
        let agent = req.user_agent().and_then(|a| a.split(' ').next()).unwrap_or("-");
        escape::control_sequences(agent)
    }
}

impl HttpLogger for DefaultLogger {
    fn log(&self, req: &HttpRequest, res: &HttpResponse) {
        let user = req.remote_user();
        info!(
            target: "dstack",
            remote = req.remote_host(),
            agent = %DefaultLogger::agent(req),
            user = user.as_deref().unwrap_or("-"),
            "{} {} -> {} {}",
            escape::control_sequences(req.method().as_str()),
            escape::control_sequences(req.path()),
            res.status,
            res.status.as_str(),
        );
    }

    fn err(&self, req: &HttpRequest, res: &HttpResponse, error: &dyn HttpError) {
        error!(
            target: "dstack",
            remote = req.remote_host(),
            agent = %DefaultLogger::agent(req),
            "{} {} -> {} ({}: {})",
            escape::control_sequences(req.method().as_str()),
            escape::control_sequences(req.path()),
            res.status,
            error.name(),
            escape::control_sequences(&error.to_string()),
        );
    }
}

/// Logger that does nothing
pub struct NoLogger;

impl HttpLogger for NoLogger {
    fn log(&self, _req: &HttpRequest, _res: &HttpResponse) {}
    fn err(&self, _req: &HttpRequest, _res: &HttpResponse, _error: &dyn HttpError) {}
}
