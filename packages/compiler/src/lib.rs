//! Compilation pipeline: generated markup source → compiled code.
//!
//! ```text
//! CompilePipeline ──► CompileWorker ──► TranspileEndpoint
//!   (memory cache,     (tokio task,       LocalEndpoint: PersistentCache + transpile
//!    sequence ids)      mpsc / oneshot)   HttpEndpoint:  POST /api/compile
//! ```
//!
//! Compiled code is the JSON form of a [`Program`]; the renderer interprets it.

mod cache;
mod endpoint;
mod error;
mod pipeline;
mod protocol;
pub mod server;
mod transpile;
mod worker;

pub use cache::{content_key, CacheEntry, MemoryCache, PersistentCache, DEFAULT_TTL_HOURS};
pub use endpoint::{HttpEndpoint, LocalEndpoint, TranspileEndpoint};
pub use error::{CompileError, CompileResult};
pub use pipeline::{CompileOutcome, CompilePipeline, PipelineStats};
pub use protocol::{CompileRequest, CompileResponse};
pub use server::{router, serve, COMPILE_ROUTE};
pub use transpile::{
    compile_source, lower_props, lower_text, transpile, Instruction, Local, Program, Prop,
    PROGRAM_VERSION,
};
pub use worker::CompileWorker;
