//! Known-imports table: which capitalized tags are external components and
//! how to import them. Supplied by the host application.

use crate::ast::{ComponentInfo, ImportType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpec {
    pub package_name: String,
    /// Exported name when it differs from the tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,
    #[serde(default = "default_import_type")]
    pub import_type: ImportType,
}

fn default_import_type() -> ImportType {
    ImportType::Named
}

impl ImportSpec {
    pub fn named(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            import_name: None,
            import_type: ImportType::Named,
        }
    }

    pub fn default_export(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            import_name: None,
            import_type: ImportType::Default,
        }
    }

    pub fn namespace(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            import_name: None,
            import_type: ImportType::Namespace,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownImports {
    entries: BTreeMap<String, ImportSpec>,
}

impl KnownImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: impl Into<String>, spec: ImportSpec) -> Self {
        self.insert(tag, spec);
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, spec: ImportSpec) {
        self.entries.insert(tag.into(), spec);
    }

    /// Look a tag up. `Card.Header` resolves through its namespace `Card`.
    pub fn get(&self, tag: &str) -> Option<&ImportSpec> {
        self.entries
            .get(tag)
            .or_else(|| self.entries.get(namespace_of(tag)))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn component_info(&self, tag: &str) -> Option<ComponentInfo> {
        self.get(tag).map(|spec| ComponentInfo {
            is_component: true,
            package_name: Some(spec.package_name.clone()),
            import_name: Some(
                spec.import_name
                    .clone()
                    .unwrap_or_else(|| namespace_of(tag).to_string()),
            ),
            import_type: Some(spec.import_type),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportSpec)> {
        self.entries.iter().map(|(tag, spec)| (tag.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Import statement for a tag, e.g. `import { Button } from "@/ui/button";`
    pub fn import_statement(&self, tag: &str) -> Option<String> {
        let spec = self.get(tag)?;
        let local = namespace_of(tag);
        let exported = spec.import_name.as_deref().unwrap_or(local);

        let statement = match spec.import_type {
            ImportType::Default => format!("import {} from \"{}\";", local, spec.package_name),
            ImportType::Namespace => {
                format!("import * as {} from \"{}\";", local, spec.package_name)
            }
            ImportType::Named if exported == local => {
                format!("import {{ {} }} from \"{}\";", local, spec.package_name)
            }
            ImportType::Named => format!(
                "import {{ {} as {} }} from \"{}\";",
                exported, local, spec.package_name
            ),
        };
        Some(statement)
    }
}

fn namespace_of(tag: &str) -> &str {
    tag.split('.').next().unwrap_or(tag)
}

/// Capitalized identifiers name components, lowercase ones name markup tags
pub fn is_component_tag(tag: &str) -> bool {
    tag.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_through_namespace() {
        let imports = KnownImports::new().with("Card", ImportSpec::namespace("@/ui/card"));

        assert!(imports.contains("Card"));
        assert!(imports.contains("Card.Header"));
        assert!(!imports.contains("Button"));
    }

    #[test]
    fn test_component_info() {
        let imports = KnownImports::new().with("Button", ImportSpec::named("@/ui/button"));
        let info = imports.component_info("Button").unwrap();

        assert!(info.is_component);
        assert_eq!(info.package_name.as_deref(), Some("@/ui/button"));
        assert_eq!(info.import_name.as_deref(), Some("Button"));
        assert_eq!(info.import_type, Some(ImportType::Named));
    }

    #[test]
    fn test_import_statements() {
        let imports = KnownImports::new()
            .with("Button", ImportSpec::named("@/ui/button"))
            .with("Hero", ImportSpec::default_export("@/sections/hero"))
            .with("Icons", ImportSpec::namespace("lucide-react"));

        assert_eq!(
            imports.import_statement("Button").unwrap(),
            "import { Button } from \"@/ui/button\";"
        );
        assert_eq!(
            imports.import_statement("Hero").unwrap(),
            "import Hero from \"@/sections/hero\";"
        );
        assert_eq!(
            imports.import_statement("Icons").unwrap(),
            "import * as Icons from \"lucide-react\";"
        );
    }

    #[test]
    fn test_deserialize_table() {
        let json = r#"{
            "Button": { "packageName": "@/ui/button" },
            "Hero": { "packageName": "@/sections/hero", "importType": "default" }
        }"#;
        let imports: KnownImports = serde_json::from_str(json).unwrap();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports.get("Hero").unwrap().import_type, ImportType::Default);
    }
}
