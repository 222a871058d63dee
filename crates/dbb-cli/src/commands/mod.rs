//! Command implementations

pub(crate) mod apply;
pub(crate) mod common;
pub(crate) mod prompt;
pub(crate) mod status;
