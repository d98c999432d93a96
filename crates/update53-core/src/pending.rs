//! One-shot futures for resolver results
//!
//! Each resolver runs as its own task and hands back exactly one value
//! through a oneshot channel. [`Pending`] is the receiving half, so a
//! caller can launch work and await it later without holding the task.

use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A result that will arrive exactly once
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
    label: &'static str,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `work` on its own task and return a handle to its single result
    pub fn spawn<F>(label: &'static str, work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = work.await;
            if tx.send(result).is_err() {
                tracing::debug!("{} result dropped, nobody was waiting", label);
            }
        });

        Self { rx, label }
    }

    /// A handle that is already complete
    pub fn ready(label: &'static str, value: Result<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        // The receiver is alive until we return it
        let _ = tx.send(value);
        Self { rx, label }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let label = self.label;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Other(format!(
                "{} task ended without a result",
                label
            )))),
            Poll::Pending => Poll::Pending,
        }
    }
}
