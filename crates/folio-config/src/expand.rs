//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.
//!
//! Bare `$VAR` is left alone so literal dollars in URLs survive.

use crate::ConfigError;

/// Variable that was referenced but is not set.
struct Unset(String);

/// Expand environment references in `value`.
///
/// `field` names the config key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, Unset> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| Unset(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional string in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_mut() {
        *v = expand_env(v, field)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_value_and_default() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_DOCS_ROOT", "/srv/docs");
            std::env::remove_var("FOLIO_TEST_UNSET_OUT");
        }
        assert_eq!(
            expand_env("${FOLIO_TEST_DOCS_ROOT}/guides", "docs.source_dir").unwrap(),
            "/srv/docs/guides"
        );
        assert_eq!(
            expand_env("${FOLIO_TEST_UNSET_OUT:-dist}", "docs.output_dir").unwrap(),
            "dist"
        );
        unsafe {
            std::env::remove_var("FOLIO_TEST_DOCS_ROOT");
        }
    }

    #[test]
    fn test_missing_variable_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_MISSING_DIR");
        }
        let err = expand_env("${FOLIO_TEST_MISSING_DIR}", "templates.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("FOLIO_TEST_MISSING_DIR"), "{message}");
        assert!(message.contains("templates.dir"), "{message}");
    }

    #[test]
    fn test_literals_are_unchanged() {
        assert_eq!(expand_env("docs", "f").unwrap(), "docs");
        assert_eq!(expand_env("$HOME/docs", "f").unwrap(), "$HOME/docs");
        assert_eq!(
            expand_env("https://example.com/$path", "f").unwrap(),
            "https://example.com/$path"
        );
    }

    #[test]
    fn test_expand_opt() {
        let mut none = None;
        expand_opt(&mut none, "styling.file").unwrap();
        assert_eq!(none, None);

        let mut some = Some("${FOLIO_TEST_OPT_UNSET:-styles.toml}".to_owned());
        expand_opt(&mut some, "styling.file").unwrap();
        assert_eq!(some.as_deref(), Some("styles.toml"));
    }
}
