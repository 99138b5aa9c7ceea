//! Component and page generation for Folio.
//!
//! [`ComponentGenerator`] turns a [`ParsedContent`](folio_core::ParsedContent)
//! tree into markup: each node is rendered through the template registered
//! for its type in a [`TemplateRegistry`], children first, and class
//! placeholders such as `{base}` are resolved from the styling config.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use folio_generator::{ComponentGenerator, TemplateRegistry};
//! use folio_template::{JinjaEngine, StylingConfig};
//!
//! let styling = Arc::new(StylingConfig::default());
//! let engine = JinjaEngine::new("templates").with_styling(Arc::clone(&styling));
//! let templates = TemplateRegistry::new().with("section", "section.html");
//! let generator = ComponentGenerator::new(Arc::new(engine), Arc::new(templates), styling);
//! # let _ = generator;
//! ```

mod generator;
mod placeholders;
mod registry;

pub use generator::{ComponentGenerator, ComponentTemplate, GenerateError, GenerateFn, page_symbol};
pub use registry::TemplateRegistry;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_core::{ContentNode, ParsedContent};
    use folio_template::{JinjaEngine, StylingConfig, TemplateEngine, TemplateError};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(temp: &TempDir, name: &str, source: &str) {
        let path = temp.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, source).unwrap();
    }

    #[test]
    fn test_generate_page_with_jinja_templates() {
        let temp = TempDir::new().unwrap();
        write(
            &temp,
            "section.html",
            r#"<section class="{base} {missing}"><h{{ level }}>{{ title }}</h{{ level }}>{{ content }}{{ children|safe }}</section>"#,
        );
        write(
            &temp,
            "api/operation.html",
            r#"{% call component("card", variant="get") %}<code>{{ attributes.method|upper }} {{ attributes.path }}</code>{% endcall %}"#,
        );

        let styling = Arc::new(
            StylingConfig::from_toml_str(
                r#"
[types.section]
class_mapping = { base = "prose" }
component_list = ["Section"]

[types.card]
class_mapping = { base = "card", "variant:get" = "card-get" }

[page]
container_class = "docs"
"#,
            )
            .unwrap(),
        );
        let engine = JinjaEngine::new(temp.path()).with_styling(Arc::clone(&styling));
        let templates = TemplateRegistry::new()
            .with("section", "section.html")
            .with("api-operation", "api/operation.html");
        let generator =
            ComponentGenerator::new(Arc::new(engine), Arc::new(templates), styling);

        let mut doc = ParsedContent::new("Users API");
        doc.sections.push(
            ContentNode::section("Users & Groups", 2)
                .with_text("<p>")
                .with_child(
                    ContentNode::new("api-operation")
                        .with_attribute("method", "get")
                        .with_attribute("path", "{id}"),
                ),
        );

        let page = generator.generate_page(&doc).unwrap();
        assert_eq!(
            page,
            concat!(
                "import Section;\n\n",
                "<div class=\"docs\" data-page=\"UsersAPI\">\n",
                "<section class=\"prose\"><h2>Users &amp; Groups</h2>&lt;p&gt;",
                "<div class=\"card card-get\" data-component=\"card\"><code>GET {id}</code></div>",
                "</section>\n",
                "</div>\n",
            )
        );

        let stats = generator.engine().cache_stats();
        assert_eq!(stats.size, 2);
    }

    #[test]
    fn test_missing_template_file_surfaces_as_template_error() {
        let temp = TempDir::new().unwrap();
        let styling = Arc::new(StylingConfig::default());
        let engine = JinjaEngine::new(temp.path());
        let templates = TemplateRegistry::new().with("section", "section.html");
        let generator =
            ComponentGenerator::new(Arc::new(engine), Arc::new(templates), styling);

        let err = generator
            .generate_component(&ContentNode::section("A", 1))
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Template(TemplateError::NotFound { .. })
        ));
    }
}
