use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;

/// Payload of a caught panic
pub(crate) type Panic = Box<dyn Any + Send>;

pin_project! {
    /// Resolves to `Err` instead of unwinding when the inner future panics
    pub(crate) struct CatchPanic<F> {
        #[pin]
        inner: F,
    }
}

impl<F: Future> CatchPanic<F> {
    pub(crate) fn new(inner: F) -> CatchPanic<F> {
        CatchPanic { inner }
    }
}

impl<F: Future> Future for CatchPanic<F> {
    type Output = Result<F::Output, Panic>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = self.project().inner;
        match panic::catch_unwind(AssertUnwindSafe(|| inner.poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(out)) => Poll::Ready(Ok(out)),
            Err(panic) => Poll::Ready(Err(panic)),
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(panic: &Panic) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catches() {
        let ok = CatchPanic::new(async { 5 }).await;
        assert_eq!(ok.ok(), Some(5));

        let res = CatchPanic::new(async {
            tokio::task::yield_now().await;
            if true { panic!("after a yield"); }
            1
        }).await;
        assert_eq!(panic_message(&res.unwrap_err()), "after a yield");
    }
}
