//! Cold request producers and their subscriptions.
//!
//! # Design
//! A [`RequestObservable`] is only a request definition: nothing touches the
//! network until it is subscribed to, and every subscription runs its own
//! independent execution. The outcome travels over a oneshot channel, so at
//! most one value can ever be delivered per subscription.
//!
//! Dropping a [`Subscription`] before it resolves aborts its execution. The
//! in-flight connection is torn down with it; nothing keeps running in the
//! background.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::error::RequestError;
use crate::executor::{self, Outcome};
use crate::request::RequestSpec;
use crate::transport::Transport;

/// A request that runs once per subscription.
pub struct RequestObservable<T> {
    transport: Arc<T>,
    spec: Arc<RequestSpec>,
}

impl<T> Clone for RequestObservable<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            spec: Arc::clone(&self.spec),
        }
    }
}

impl<T> RequestObservable<T>
where
    T: Transport + 'static,
{
    pub fn new(transport: Arc<T>, spec: RequestSpec) -> Self {
        Self {
            transport,
            spec: Arc::new(spec),
        }
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Run one execution on the current task. The future is lazy: no I/O
    /// happens until it is polled, and dropping it cancels the request.
    pub async fn execute(&self) -> Outcome {
        executor::execute(self.transport.as_ref(), &self.spec).await
    }

    /// Start one execution on the tokio runtime and return a handle that
    /// resolves to its outcome.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        let spec = Arc::clone(&self.spec);

        let task = tokio::spawn(async move {
            let outcome = executor::execute(transport.as_ref(), &spec).await;
            if tx.send(outcome).is_err() {
                trace!(url = %spec.url, "subscriber gone before outcome");
            }
        });

        Subscription { outcome: rx, task }
    }
}

/// One running execution. Resolves to its [`Outcome`] exactly once.
#[must_use = "dropping a subscription cancels the request"]
pub struct Subscription {
    outcome: oneshot::Receiver<Outcome>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Cancel the execution and close its connection.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for Subscription {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.outcome).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The task ended without sending, which only happens if it panicked.
            Poll::Ready(Err(_)) => Poll::Ready(Err(RequestError::Aborted)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
