//! `folio nav` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use folio_config::{CliSettings, Config};
use folio_core::NavigationItem;
use folio_nav::{render_navbar, render_sidebar};
use folio_pipeline::Pipeline;

use crate::error::CliError;
use crate::output::Output;

/// Navigation output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum NavFormat {
    /// Nested markdown list.
    #[default]
    Sidebar,
    /// Top-level items only.
    Navbar,
    Json,
}

/// Arguments for the nav command.
#[derive(Args, Default)]
pub(crate) struct NavArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    format: NavFormat,
}

impl NavArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let items = Pipeline::from_config(&config)?.navigation()?;
        output.print(&render(&items, self.format)?)?;
        Ok(())
    }
}

fn render(items: &[NavigationItem], format: NavFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        NavFormat::Sidebar => render_sidebar(items),
        NavFormat::Navbar => render_navbar(items),
        NavFormat::Json => serde_json::to_string_pretty(items)? + "\n",
    })
}
