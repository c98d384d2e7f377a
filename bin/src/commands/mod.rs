//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod info;
pub(crate) mod rules;
