//! Transpile endpoints: the thing the worker calls for each compile request.

use futures::future::BoxFuture;
use tracing::{debug, info, instrument};

use crate::cache::PersistentCache;
use crate::error::{CompileError, CompileResult};
use crate::protocol::{CompileRequest, CompileResponse};
use crate::server::COMPILE_ROUTE;
use crate::transpile::compile_source;

pub trait TranspileEndpoint: Send + Sync {
    /// Compiled code for `request`, or the reason it could not be produced
    fn compile(&self, request: CompileRequest) -> BoxFuture<'_, CompileResult<String>>;
}

/// Transpiles in process behind a persistent cache
#[derive(Debug, Clone, Default)]
pub struct LocalEndpoint {
    cache: PersistentCache,
}

impl LocalEndpoint {
    pub fn new(cache: PersistentCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &PersistentCache {
        &self.cache
    }

    /// Synchronous path: cache lookup, then transpile and store on a miss
    #[instrument(skip_all, fields(key = tracing::field::Empty))]
    pub fn compile_now(&self, request: &CompileRequest) -> CompileResult<String> {
        let key = request.persistent_key();
        tracing::Span::current().record("key", key.as_str());

        if let Some(code) = self.cache.get(&key) {
            debug!("persistent cache hit");
            return Ok(code);
        }

        let code = compile_source(&request.source_text, &request.imports)?;
        self.cache.insert(&key, code.clone())?;
        info!(bytes = code.len(), "compiled and cached");
        Ok(code)
    }
}

impl TranspileEndpoint for LocalEndpoint {
    fn compile(&self, request: CompileRequest) -> BoxFuture<'_, CompileResult<String>> {
        let endpoint = self.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || endpoint.compile_now(&request))
                .await
                .map_err(|err| CompileError::Transform(format!("transpile task failed: {}", err)))?
        })
    }
}

/// Remote endpoint reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3030`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), COMPILE_ROUTE),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: CompileRequest) -> CompileResult<String> {
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body: CompileResponse = response.json().await?;

        match body {
            CompileResponse::Compiled { compiled_code } if status.is_success() => Ok(compiled_code),
            CompileResponse::Compiled { .. } => Err(CompileError::Endpoint {
                status: status.as_u16(),
                message: "unexpected compiled payload".to_string(),
            }),
            CompileResponse::Failed { error } => Err(CompileError::Endpoint {
                status: status.as_u16(),
                message: error,
            }),
        }
    }
}

impl TranspileEndpoint for HttpEndpoint {
    fn compile(&self, request: CompileRequest) -> BoxFuture<'_, CompileResult<String>> {
        Box::pin(self.post(request))
    }
}
