pub mod compile;
pub mod generate;
pub mod init;
pub mod parse;
pub mod render;
pub mod serve;

pub use compile::{compile, CompileArgs};
pub use generate::{generate, GenerateArgs};
pub use init::{init, InitArgs};
pub use parse::{parse, ParseArgs};
pub use render::{render, RenderArgs};
pub use serve::{serve, ServeArgs};

use crate::config::Config;
use anyhow::{Context as _, Result};
use colored::Colorize;
use jsxlab_compiler::{CompilePipeline, HttpEndpoint, LocalEndpoint, TranspileEndpoint};
use jsxlab_parser::{format_error, ParseError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Working directory plus the loaded config, shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub cwd: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    pub fn read_source(&self, path: &Path) -> Result<(PathBuf, String)> {
        let path = self.resolve(path);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Ok((path, source))
    }

    /// In-process endpoint, or the configured remote one
    pub fn endpoint(&self) -> Result<Arc<dyn TranspileEndpoint>> {
        Ok(match &self.config.endpoint {
            Some(url) => {
                tracing::debug!(%url, "using remote compile endpoint");
                Arc::new(HttpEndpoint::new(url))
            }
            None => Arc::new(LocalEndpoint::new(self.config.persistent_cache(&self.cwd)?)),
        })
    }

    pub fn pipeline(&self) -> Result<CompilePipeline> {
        Ok(CompilePipeline::new(self.endpoint()?)
            .with_imports(self.config.known_imports.clone())
            .with_cache_key(self.config.cache_key.clone()))
    }
}

/// `hero-banner.jsx` → `HeroBanner`
pub fn component_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        "Component".to_string()
    } else {
        name
    }
}

/// Print an annotated parse error to stderr
pub fn report_parse_error(path: &Path, source: &str, err: &ParseError) {
    eprintln!("{}", format_error(source, &path.display().to_string(), err));
    eprintln!("  {} {}", "✗".red(), path.display());
}

pub fn is_source_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("jsx") | Some("tsx")
    )
}
