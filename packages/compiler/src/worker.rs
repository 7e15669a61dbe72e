//! Background compile worker.
//!
//! One tokio task owns the endpoint and receives jobs over a channel. Each
//! job runs concurrently on its own subtask and answers on a oneshot, so a
//! failure is posted back as a message instead of crossing the task boundary.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::endpoint::TranspileEndpoint;
use crate::error::{CompileError, CompileResult};
use crate::protocol::CompileRequest;

pub type Reply = oneshot::Receiver<CompileResult<String>>;

struct Job {
    request: CompileRequest,
    reply: oneshot::Sender<CompileResult<String>>,
}

/// Handle to the running worker. Dropping it stops the worker and every
/// in-flight job.
pub struct CompileWorker {
    sender: mpsc::UnboundedSender<Job>,
    task: JoinHandle<()>,
}

impl CompileWorker {
    /// Must be called inside a tokio runtime
    pub fn spawn(endpoint: Arc<dyn TranspileEndpoint>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(endpoint, receiver));
        debug!("compile worker started");
        Self { sender, task }
    }

    pub fn submit(&self, request: CompileRequest) -> CompileResult<Reply> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Job { request, reply })
            .map_err(|_| CompileError::WorkerUnavailable)?;
        Ok(receiver)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn terminate(self) {
        drop(self);
    }
}

impl Drop for CompileWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(endpoint: Arc<dyn TranspileEndpoint>, mut receiver: mpsc::UnboundedReceiver<Job>) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            job = receiver.recv() => match job {
                Some(job) => {
                    in_flight.spawn(handle(endpoint.clone(), job));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    while in_flight.join_next().await.is_some() {}
    debug!("compile worker stopped");
}

async fn handle(endpoint: Arc<dyn TranspileEndpoint>, job: Job) {
    let result = endpoint.compile(job.request).await;
    if let Err(err) = &result {
        warn!(error = %err, "compile job failed");
    }
    // The caller may have stopped waiting
    let _ = job.reply.send(result);
}
