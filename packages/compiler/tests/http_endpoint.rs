//! Compile endpoint served over HTTP and reached through the HTTP client

use std::sync::Arc;

use jsxlab_compiler::{
    serve, CompileError, CompileOutcome, CompilePipeline, CompileRequest, HttpEndpoint,
    LocalEndpoint, PersistentCache, Program, TranspileEndpoint,
};
use jsxlab_parser::{ImportSpec, KnownImports};
use tokio::net::TcpListener;

async fn start_server(cache: PersistentCache) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = Arc::new(LocalEndpoint::new(cache));
    tokio::spawn(serve(listener, endpoint));
    format!("http://{}", addr)
}

#[tokio::test]
async fn compiles_over_http() {
    let base = start_server(PersistentCache::new()).await;
    let endpoint = HttpEndpoint::new(&base);

    let imports = KnownImports::new().with("Button", ImportSpec::named("@/components/ui/button"));
    let request = CompileRequest::new("<div><Button variant=\"primary\">Buy</Button></div>")
        .with_imports(imports);

    let code = endpoint.compile(request).await.unwrap();
    let program = Program::from_code(&code).unwrap();
    assert_eq!(program.components, vec!["Button"]);
}

#[tokio::test]
async fn failure_status_maps_to_endpoint_error() {
    let base = start_server(PersistentCache::new()).await;
    let endpoint = HttpEndpoint::new(&base);

    let err = endpoint
        .compile(CompileRequest::new("<div><span></div>"))
        .await
        .unwrap_err();
    match err {
        CompileError::Endpoint { status, message } => {
            assert_eq!(status, 500);
            assert!(message.starts_with("Transform failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn pipeline_over_http_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PersistentCache::new().with_dir(dir.path()).unwrap();
    let base = start_server(cache).await;

    let pipeline = CompilePipeline::new(Arc::new(HttpEndpoint::new(&base)))
        .with_cache_key(Some("landing-hero".to_string()));
    let outcome = pipeline.compile("<h1>Hello</h1>").await.unwrap();
    assert!(matches!(outcome, CompileOutcome::Compiled(_)));

    let reloaded = PersistentCache::new().with_dir(dir.path()).unwrap();
    assert_eq!(reloaded.get("landing-hero").as_deref(), outcome.code());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = HttpEndpoint::new(&format!("http://{}", addr));
    let err = endpoint.compile(CompileRequest::new("<p />")).await.unwrap_err();
    assert!(matches!(err, CompileError::Network(_)));
}
