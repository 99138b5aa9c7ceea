//! Styling configuration.
//!
//! Maps placeholder class names to concrete design-system classes per
//! element type. Loaded from TOML:
//!
//! ```toml
//! [types.section]
//! class_mapping = { base = "prose", "variant:wide" = "max-w-none" }
//! component_list = ["Section"]
//!
//! [page]
//! container_class = "page"
//! imports = ["import Layout from './Layout.svelte';"]
//! import_format = "import {component} from './components/{component}.svelte';"
//! ```
//!
//! Missing types or keys resolve to empty strings, never errors.

use std::collections::BTreeMap;
use std::path::Path;

use folio_core::{FileSystemError, FsOperation};
use serde::{Deserialize, Serialize};

/// Placeholder in `import_format` replaced with each component name.
pub const COMPONENT_PLACEHOLDER: &str = "{component}";
const DEFAULT_IMPORT_FORMAT: &str = "import {component};";

/// Error loading a styling file.
#[derive(Debug, thiserror::Error)]
pub enum StylingError {
    #[error(transparent)]
    Io(#[from] FileSystemError),
    #[error("Invalid styling file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Styling for one element type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStyling {
    /// Placeholder name (`base`, `variant:primary`...) to class string.
    #[serde(default, rename = "classMapping", alias = "class_mapping")]
    pub class_mapping: BTreeMap<String, String>,
    /// Design-system components the rendered markup depends on.
    #[serde(default, rename = "componentList", alias = "component_list")]
    pub component_list: Vec<String>,
}

/// Page-level styling used by page assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStyling {
    #[serde(default, rename = "containerClass", alias = "container_class")]
    pub container_class: String,
    /// Import lines emitted verbatim before component imports.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Format of one component import line; `{component}` is replaced.
    #[serde(
        default,
        rename = "importFormat",
        alias = "import_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub import_format: Option<String>,
}

impl PageStyling {
    /// Import line for a component.
    #[must_use]
    pub fn import_line(&self, component: &str) -> String {
        self.import_format
            .as_deref()
            .unwrap_or(DEFAULT_IMPORT_FORMAT)
            .replace(COMPONENT_PLACEHOLDER, component)
    }
}

/// Styling for all element types plus page assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylingConfig {
    #[serde(default)]
    pub types: BTreeMap<String, TypeStyling>,
    #[serde(default)]
    pub page: PageStyling,
}

impl StylingConfig {
    /// Parse styling from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load styling from a TOML file.
    pub fn load(path: &Path) -> Result<Self, StylingError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FileSystemError::new(FsOperation::Read, path, e))?;
        Self::from_toml_str(&content).map_err(|source| StylingError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Styling for an element type, if configured.
    #[must_use]
    pub fn config_for_type(&self, node_type: &str) -> Option<&TypeStyling> {
        self.types.get(node_type)
    }

    /// Class string for a type and placeholder key (empty when absent).
    #[must_use]
    pub fn class_for(&self, node_type: &str, key: &str) -> &str {
        self.config_for_type(node_type)
            .and_then(|t| t.class_mapping.get(key))
            .map_or("", String::as_str)
    }

    /// Design-system components declared for a type.
    #[must_use]
    pub fn components_for(&self, node_type: &str) -> &[String] {
        self.config_for_type(node_type)
            .map_or(&[], |t| t.component_list.as_slice())
    }

    /// Resolve the class list of a component.
    ///
    /// Tokens are concatenated in the fixed order base, variant, size,
    /// color, state, custom. Empty tokens are skipped.
    #[must_use]
    pub fn component_classes(&self, node_type: &str, options: &ClassOptions<'_>) -> String {
        let lookup = |prefix: &str, value: Option<&str>| {
            value.map_or("", |v| self.class_for(node_type, &format!("{prefix}:{v}")))
        };

        let tokens = [
            self.class_for(node_type, "base"),
            lookup("variant", options.variant),
            lookup("size", options.size),
            lookup("color", options.color),
            lookup("state", options.state),
            options.class.unwrap_or_default(),
        ];
        tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Modifiers passed to [`StylingConfig::component_classes`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassOptions<'a> {
    pub variant: Option<&'a str>,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
    pub state: Option<&'a str>,
    /// Custom class appended last.
    pub class: Option<&'a str>,
}
