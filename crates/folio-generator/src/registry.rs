//! Element type to template mapping.

use std::collections::BTreeMap;

/// Maps content node types to template references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, String>,
}

impl TemplateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the template for a node type.
    pub fn register(&mut self, node_type: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(node_type.into(), template.into());
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, node_type: impl Into<String>, template: impl Into<String>) -> Self {
        self.register(node_type, template);
        self
    }

    /// Template reference for a node type.
    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<&str> {
        self.templates.get(node_type).map(String::as_str)
    }

    /// Registered node types, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateRegistry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (node_type, template) in iter {
            registry.register(node_type, template);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_replace() {
        let mut registry = TemplateRegistry::new().with("section", "section.html");
        assert_eq!(registry.get("section"), Some("section.html"));

        registry.register("section", "sections/default.html");
        assert_eq!(registry.get("section"), Some("sections/default.html"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("table"), None);
    }

    #[test]
    fn test_from_iter() {
        let registry: TemplateRegistry =
            [("api-path", "api/path.html"), ("api-info", "api/info.html")].into_iter().collect();
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["api-info", "api-path"]);
    }
}
