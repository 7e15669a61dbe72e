use super::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jsxlab_compiler::{LocalEndpoint, COMPILE_ROUTE};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Serve the in-process compile endpoint over HTTP
pub async fn serve(args: ServeArgs, ctx: &Context) -> Result<()> {
    let mut server = ctx.config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let addr = server.addr()?;
    let endpoint = LocalEndpoint::new(ctx.config.persistent_cache(&ctx.cwd)?);
    let listener = TcpListener::bind(addr).await?;

    println!(
        "🚀 {} on http://{}{}",
        "Compile endpoint".green().bold(),
        listener.local_addr()?,
        COMPILE_ROUTE
    );

    jsxlab_compiler::serve(listener, Arc::new(endpoint)).await?;
    Ok(())
}
