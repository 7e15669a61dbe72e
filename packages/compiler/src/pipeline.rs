//! # Compile Pipeline
//!
//! ```text
//! compile(source) ──► MemoryCache ──hit──► Compiled(code)
//!                          │ miss
//!                          ▼
//!                    in-flight map ──same source pending──► await that reply
//!                          │ none
//!                          ▼
//!                    CompileWorker ──► TranspileEndpoint (persistent cache → transpile)
//!                          │
//!                          ▼
//!            store in MemoryCache, then compare sequence numbers:
//!            latest request → Compiled(code), older → Superseded
//! ```
//!
//! The worker is spawned on first use and reused for every request.
//! `dispose()` stops it; `reset()` also empties the memory cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use jsxlab_parser::KnownImports;
use tracing::{debug, error, instrument};

use crate::cache::MemoryCache;
use crate::endpoint::TranspileEndpoint;
use crate::error::{CompileError, CompileResult};
use crate::protocol::CompileRequest;
use crate::worker::{CompileWorker, Reply};

/// Reply to a dispatched request, awaitable by every caller compiling the same source
type InFlight = Shared<BoxFuture<'static, CompileResult<String>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    Compiled(String),
    /// A newer request was issued before this one finished
    Superseded,
}

impl CompileOutcome {
    pub fn code(&self) -> Option<&str> {
        match self {
            CompileOutcome::Compiled(code) => Some(code),
            CompileOutcome::Superseded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub cache_hits: usize,
    pub endpoint_calls: usize,
    pub cached_entries: usize,
    pub latest_sequence: u64,
}

pub struct CompilePipeline {
    endpoint: Arc<dyn TranspileEndpoint>,
    imports: KnownImports,
    cache_key: Option<String>,
    cache: MemoryCache,
    worker: Mutex<Option<CompileWorker>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
    sequence: AtomicU64,
    cache_hits: AtomicUsize,
    endpoint_calls: AtomicUsize,
}

impl CompilePipeline {
    pub fn new(endpoint: Arc<dyn TranspileEndpoint>) -> Self {
        Self {
            endpoint,
            imports: KnownImports::default(),
            cache_key: None,
            cache: MemoryCache::new(),
            worker: Mutex::new(None),
            in_flight: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            cache_hits: AtomicUsize::new(0),
            endpoint_calls: AtomicUsize::new(0),
        }
    }

    /// Known imports sent along with every request
    pub fn with_imports(mut self, imports: KnownImports) -> Self {
        self.imports = imports;
        self
    }

    /// Fixed persistent-cache slot sent along with every request
    pub fn with_cache_key(mut self, cache_key: Option<String>) -> Self {
        self.cache_key = cache_key;
        self
    }

    /// Share an existing memory cache
    pub fn with_cache(mut self, cache: MemoryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    /// Compile `source`. Only the most recently issued request gets its
    /// result; earlier ones still in flight resolve to `Superseded`.
    #[instrument(skip_all, fields(len = source.len()))]
    pub async fn compile(&self, source: &str) -> CompileResult<CompileOutcome> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(code) = self.cache.get(source) {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            debug!(sequence, "memory cache hit");
            return Ok(CompileOutcome::Compiled(code));
        }

        let pending = self.join_or_dispatch(source)?;
        let result = pending.clone().await;

        if let Ok(code) = &result {
            self.cache.insert(source, code.clone());
        }
        self.finish(source, &pending);
        if matches!(result, Err(CompileError::WorkerUnavailable)) {
            return Err(CompileError::WorkerUnavailable);
        }

        if !self.is_latest(sequence) {
            debug!(sequence, latest = self.latest_sequence(), "discarding superseded result");
            return Ok(CompileOutcome::Superseded);
        }

        match result {
            Ok(code) => Ok(CompileOutcome::Compiled(code)),
            Err(err) => {
                error!(sequence, error = %err, "compile failed");
                Err(err)
            }
        }
    }

    /// Await the pending reply for `source`, or dispatch a new request
    fn join_or_dispatch(&self, source: &str) -> CompileResult<InFlight> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = in_flight.get(source) {
            debug!("joining in-flight compile");
            return Ok(pending.clone());
        }

        let reply = self.dispatch(source)?;
        self.endpoint_calls.fetch_add(1, Ordering::SeqCst);
        let pending = async move { reply.await.unwrap_or(Err(CompileError::WorkerUnavailable)) }
            .boxed()
            .shared();
        in_flight.insert(source.to_string(), pending.clone());
        Ok(pending)
    }

    fn finish(&self, source: &str, pending: &InFlight) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(source).is_some_and(|entry| entry.ptr_eq(pending)) {
            in_flight.remove(source);
        }
    }

    fn dispatch(&self, source: &str) -> CompileResult<Reply> {
        let request = CompileRequest::new(source)
            .with_imports(self.imports.clone())
            .with_cache_key(self.cache_key.clone());

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let running = worker.as_ref().map(CompileWorker::is_running).unwrap_or(false);
        if !running {
            *worker = Some(CompileWorker::spawn(self.endpoint.clone()));
        }
        worker
            .as_ref()
            .ok_or(CompileError::WorkerUnavailable)?
            .submit(request)
    }

    pub fn is_latest(&self, sequence: u64) -> bool {
        self.latest_sequence() == sequence
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn has_worker(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop the worker. The next compile spawns a fresh one.
    pub fn dispose(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.terminate();
            debug!("compile worker disposed");
        }
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Stop the worker, empty the memory cache and zero the counters
    pub fn reset(&self) {
        self.dispose();
        self.cache.clear();
        self.cache_hits.store(0, Ordering::SeqCst);
        self.endpoint_calls.store(0, Ordering::SeqCst);
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            endpoint_calls: self.endpoint_calls.load(Ordering::SeqCst),
            cached_entries: self.cache.len(),
            latest_sequence: self.latest_sequence(),
        }
    }
}

impl Drop for CompilePipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
