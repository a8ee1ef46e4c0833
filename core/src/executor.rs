//! Request executor.
//!
//! # Design
//! One call to [`execute`] is one execution: `Created → Sent → Receiving`,
//! ending in exactly one of `Completed` (the whole body as text) or `Failed`
//! (the first error). The returned future does nothing until polled and
//! owns every resource of the execution, so dropping it cancels the request.

use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, trace};

use crate::args::generate_request_args;
use crate::decode::Utf8Decoder;
use crate::error::RequestError;
use crate::request::RequestSpec;
use crate::target::Target;
use crate::transport::Transport;

/// The terminal outcome of one execution.
pub type Outcome = Result<String, RequestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Created,
    Sent,
    Receiving,
    Completed,
    Failed,
}

struct Execution<'a> {
    spec: &'a RequestSpec,
    phase: Phase,
}

impl Execution<'_> {
    fn advance(&mut self, next: Phase) {
        trace!(method = %self.spec.method, url = %self.spec.url, from = ?self.phase, to = ?next, "phase");
        self.phase = next;
    }

    async fn run<T>(&mut self, transport: &T) -> Outcome
    where
        T: Transport + ?Sized,
    {
        let target = Target::parse(&self.spec.url)?;
        let body = self.spec.body.to_text()?;
        let args = generate_request_args(
            &target.host,
            &target.path,
            self.spec.method,
            body.as_deref(),
            self.spec.headers.clone(),
            target.port,
        );

        self.advance(Phase::Sent);
        let mut chunks = transport.open(target.scheme, args, body.map(Bytes::from)).await?;

        self.advance(Phase::Receiving);
        let mut decoder = Utf8Decoder::default();
        let mut text = String::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            trace!(len = chunk.len(), "chunk");
            decoder.push(&chunk, &mut text);
        }
        decoder.finish(&mut text);

        Ok(text)
    }
}

/// Run one request to its terminal outcome.
pub async fn execute<T>(transport: &T, spec: &RequestSpec) -> Outcome
where
    T: Transport + ?Sized,
{
    let mut execution = Execution {
        spec,
        phase: Phase::Created,
    };
    let outcome = execution.run(transport).await;

    match &outcome {
        Ok(body) => {
            execution.advance(Phase::Completed);
            debug!(method = %spec.method, url = %spec.url, len = body.len(), "request completed");
        }
        Err(err) => {
            debug!(method = %spec.method, url = %spec.url, phase = ?execution.phase, error = %err, "request failed");
            execution.advance(Phase::Failed);
        }
    }
    outcome
}
