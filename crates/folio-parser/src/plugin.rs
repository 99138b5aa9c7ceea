//! Plugin hooks.
//!
//! A [`Plugin`] intercepts a document at four points. Every hook takes its
//! value by ownership and returns a new or amended value, so plugins compose
//! as a plain left-to-right fold in registration order.

use std::path::Path;
use std::sync::Arc;

use folio_core::ParsedContent;

use crate::error::{BoxError, Hook, PluginError};

/// Document pipeline interceptor.
///
/// All hooks default to passing their input through unchanged.
pub trait Plugin: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str;

    /// Transform raw source text before parsing.
    fn before_parse(&self, source: String, _path: Option<&Path>) -> Result<String, BoxError> {
        Ok(source)
    }

    /// Transform parser output.
    fn after_parse(
        &self,
        content: ParsedContent,
        _path: Option<&Path>,
    ) -> Result<ParsedContent, BoxError> {
        Ok(content)
    }

    /// Transform content right before component generation.
    fn before_generate(
        &self,
        content: ParsedContent,
        _path: Option<&Path>,
    ) -> Result<ParsedContent, BoxError> {
        Ok(content)
    }

    /// Transform the assembled page markup.
    fn after_generate(&self, markup: String, _path: Option<&Path>) -> Result<String, BoxError> {
        Ok(markup)
    }
}

/// Ordered list of plugins applied hook by hook.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin; hooks run in insertion order.
    pub fn push(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn before_parse(&self, source: String, path: Option<&Path>) -> Result<String, PluginError> {
        self.plugins.iter().try_fold(source, |acc, plugin| {
            plugin
                .before_parse(acc, path)
                .map_err(|e| PluginError::new(plugin.name(), Hook::BeforeParse, e))
        })
    }

    pub fn after_parse(
        &self,
        content: ParsedContent,
        path: Option<&Path>,
    ) -> Result<ParsedContent, PluginError> {
        self.plugins.iter().try_fold(content, |acc, plugin| {
            plugin
                .after_parse(acc, path)
                .map_err(|e| PluginError::new(plugin.name(), Hook::AfterParse, e))
        })
    }

    pub fn before_generate(
        &self,
        content: ParsedContent,
        path: Option<&Path>,
    ) -> Result<ParsedContent, PluginError> {
        self.plugins.iter().try_fold(content, |acc, plugin| {
            plugin
                .before_generate(acc, path)
                .map_err(|e| PluginError::new(plugin.name(), Hook::BeforeGenerate, e))
        })
    }

    pub fn after_generate(&self, markup: String, path: Option<&Path>) -> Result<String, PluginError> {
        self.plugins.iter().try_fold(markup, |acc, plugin| {
            plugin
                .after_generate(acc, path)
                .map_err(|e| PluginError::new(plugin.name(), Hook::AfterGenerate, e))
        })
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Suffix(&'static str);

    impl Plugin for Suffix {
        fn name(&self) -> &str {
            self.0
        }

        fn before_parse(&self, source: String, _path: Option<&Path>) -> Result<String, BoxError> {
            Ok(format!("{source}{}", self.0))
        }

        fn after_generate(&self, markup: String, _path: Option<&Path>) -> Result<String, BoxError> {
            Ok(format!("{markup}<{}>", self.0))
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn after_parse(
            &self,
            _content: ParsedContent,
            _path: Option<&Path>,
        ) -> Result<ParsedContent, BoxError> {
            Err("refused".into())
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let mut chain = PluginChain::new();
        chain.push(Arc::new(Suffix("a")));
        chain.push(Arc::new(Suffix("b")));

        assert_eq!(chain.before_parse("x".to_owned(), None).unwrap(), "xab");
        assert_eq!(chain.after_generate("m".to_owned(), None).unwrap(), "m<a><b>");
        assert_eq!(chain.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_default_hooks_pass_through() {
        let mut chain = PluginChain::new();
        chain.push(Arc::new(Suffix("a")));
        let content = ParsedContent::new("T");

        assert_eq!(chain.after_parse(content.clone(), None).unwrap(), content);
        assert_eq!(chain.before_generate(content.clone(), None).unwrap(), content);
    }

    #[test]
    fn test_failure_names_plugin_and_hook() {
        let mut chain = PluginChain::new();
        chain.push(Arc::new(Suffix("a")));
        chain.push(Arc::new(Failing));

        let err = chain.after_parse(ParsedContent::new("T"), None).unwrap_err();
        assert_eq!(err.plugin, "failing");
        assert_eq!(err.hook, Hook::AfterParse);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = PluginChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.before_parse("src".to_owned(), None).unwrap(), "src");
    }
}
