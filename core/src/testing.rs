//! Scripted transport for unit tests.

use std::io::{self, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::args::TransportArgs;
use crate::error::RequestError;
use crate::target::Scheme;
use crate::transport::{ChunkStream, Transport};

#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Deliver these chunks, then end.
    Chunks(Vec<&'static [u8]>),
    /// Deliver these chunks, then fail.
    FailAfter(Vec<&'static [u8]>, ErrorKind),
    /// Fail before any response.
    ConnectError(ErrorKind),
    /// Never finish; raise the flag when the stream is dropped.
    Stall(Arc<AtomicBool>),
}

impl Script {
    pub(crate) fn chunks(chunks: &[&'static [u8]]) -> Self {
        Script::Chunks(chunks.to_vec())
    }

    pub(crate) fn fail_after(chunks: &[&'static [u8]], kind: ErrorKind) -> Self {
        Script::FailAfter(chunks.to_vec(), kind)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub(crate) scheme: Scheme,
    pub(crate) args: TransportArgs,
    pub(crate) body: Option<Bytes>,
}

pub(crate) struct ScriptedTransport {
    script: Script,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn last_call(&self) -> Call {
        self.calls.lock().unwrap().last().cloned().expect("transport was never opened")
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn ok_chunks(chunks: &[&'static [u8]]) -> Vec<Result<Bytes, RequestError>> {
    chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect()
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(
        &self,
        scheme: Scheme,
        args: TransportArgs,
        body: Option<Bytes>,
    ) -> Result<ChunkStream, RequestError> {
        self.calls.lock().unwrap().push(Call { scheme, args, body });

        match &self.script {
            Script::Chunks(chunks) => Ok(stream::iter(ok_chunks(chunks)).boxed()),
            Script::FailAfter(chunks, kind) => {
                let mut items = ok_chunks(chunks);
                items.push(Err(RequestError::transport(io::Error::new(*kind, "scripted failure"))));
                Ok(stream::iter(items).boxed())
            }
            Script::ConnectError(kind) => Err(RequestError::transport(io::Error::new(*kind, "scripted connect failure"))),
            Script::Stall(flag) => {
                let guard = DropFlag(Arc::clone(flag));
                Ok(stream::pending()
                    .map(move |item: Result<Bytes, RequestError>| {
                        let _ = &guard;
                        item
                    })
                    .boxed())
            }
        }
    }
}
