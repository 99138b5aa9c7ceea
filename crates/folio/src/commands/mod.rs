//! CLI command implementations.

mod build;
mod nav;

pub(crate) use build::BuildArgs;
pub(crate) use nav::NavArgs;
