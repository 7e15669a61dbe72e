use anyhow::Context;
use jsxlab_codegen::GenerateOptions;
use jsxlab_compiler::{PersistentCache, DEFAULT_TTL_HOURS};
use jsxlab_parser::KnownImports;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "jsxlab.config.json";

/// `jsxlab.config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Tag name → package it is imported from
    #[serde(default)]
    pub known_imports: KnownImports,

    /// Fixed persistent-cache slot shared by every compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,

    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,

    /// Write-through directory for the persistent cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,

    /// Remote compile endpoint; compiles in process when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_indent")]
    pub indent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_cache_ttl_hours() -> i64 {
    DEFAULT_TTL_HOURS
}

fn default_indent() -> String {
    "  ".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid server address {}:{}", self.host, self.port))
    }
}

impl Config {
    /// Load `path`, or `jsxlab.config.json` in `cwd`. A missing default
    /// file yields the default config; a missing explicit one is an error.
    pub fn load(cwd: &Path, path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => cwd.join(path),
            None => {
                let default_path = cwd.join(DEFAULT_CONFIG_NAME);
                if !default_path.exists() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("cannot read {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", config_path.display()))
    }

    pub fn cache_dir(&self, cwd: &Path) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| cwd.join(dir))
    }

    pub fn persistent_cache(&self, cwd: &Path) -> anyhow::Result<PersistentCache> {
        let cache = PersistentCache::with_ttl(chrono::Duration::hours(self.cache_ttl_hours));
        Ok(match self.cache_dir(cwd) {
            Some(dir) => cache.with_dir(dir)?,
            None => cache,
        })
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            indent: self.indent.clone(),
            ..GenerateOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            known_imports: KnownImports::default(),
            cache_key: None,
            cache_ttl_hours: default_cache_ttl_hours(),
            cache_dir: None,
            endpoint: None,
            server: ServerConfig::default(),
            indent: default_indent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlab_parser::ImportType;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "knownImports": {
                "Button": { "packageName": "@/components/ui/button" },
                "Icons": { "packageName": "lucide-react", "importType": "namespace" }
            },
            "cacheKey": "landing-hero",
            "cacheTtlHours": 6,
            "cacheDir": ".jsxlab-cache",
            "server": { "port": 8080 },
            "indent": "    "
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.known_imports.len(), 2);
        assert_eq!(
            config.known_imports.get("Icons").unwrap().import_type,
            ImportType::Namespace
        );
        assert_eq!(config.cache_key.as_deref(), Some("landing-hero"));
        assert_eq!(config.cache_ttl_hours, 6);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.generate_options().indent, "    ");
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.known_imports.is_empty());
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.server.addr().unwrap().to_string(), "127.0.0.1:3030");
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path(), None).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "cacheKey": "hero" }"#).unwrap();
        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.cache_key.as_deref(), Some("hero"));

        assert!(Config::load(dir.path(), Some(Path::new("missing.json"))).is_err());
    }

    #[test]
    fn test_persistent_cache_uses_ttl_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            cache_ttl_hours: 2,
            cache_dir: Some("cache".to_string()),
            ..Config::default()
        };

        let cache = config.persistent_cache(dir.path()).unwrap();
        assert_eq!(cache.ttl(), chrono::Duration::hours(2));
        assert!(dir.path().join("cache").is_dir());
    }
}
