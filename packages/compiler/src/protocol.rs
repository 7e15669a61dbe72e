//! Wire format shared by the worker, the HTTP endpoint and its client.

use jsxlab_parser::KnownImports;
use serde::{Deserialize, Serialize};

use crate::cache::content_key;

/// `{sourceText, imports, cacheKey?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub source_text: String,

    #[serde(default)]
    pub imports: KnownImports,

    /// Fixed logical slot for the persistent cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl CompileRequest {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            imports: KnownImports::default(),
            cache_key: None,
        }
    }

    pub fn with_imports(mut self, imports: KnownImports) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_cache_key(mut self, cache_key: Option<String>) -> Self {
        self.cache_key = cache_key;
        self
    }

    /// Key used for the persistent cache
    pub fn persistent_key(&self) -> String {
        self.cache_key
            .clone()
            .unwrap_or_else(|| content_key(&self.source_text))
    }
}

/// `{compiledCode}` on success, `{error}` on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompileResponse {
    Compiled {
        #[serde(rename = "compiledCode")]
        compiled_code: String,
    },
    Failed {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case() {
        let request: CompileRequest = serde_json::from_value(json!({
            "sourceText": "<div />",
            "imports": { "Button": { "packageName": "@/ui/button" } },
            "cacheKey": "hero"
        }))
        .unwrap();

        assert_eq!(request.source_text, "<div />");
        assert!(request.imports.contains("Button"));
        assert_eq!(request.persistent_key(), "hero");
    }

    #[test]
    fn request_without_cache_key_hashes_source() {
        let request: CompileRequest =
            serde_json::from_value(json!({ "sourceText": "<div />" })).unwrap();
        assert_eq!(request.persistent_key(), content_key("<div />"));
        assert!(request.imports.is_empty());
    }

    #[test]
    fn response_shapes() {
        let ok = CompileResponse::Compiled {
            compiled_code: "{}".to_string(),
        };
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "compiledCode": "{}" }));

        let failed: CompileResponse =
            serde_json::from_value(json!({ "error": "Invalid syntax" })).unwrap();
        assert_eq!(
            failed,
            CompileResponse::Failed {
                error: "Invalid syntax".to_string()
            }
        );
    }
}
