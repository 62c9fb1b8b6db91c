//! CLI command implementations

pub(crate) mod check_db;
pub(crate) mod common;
pub(crate) mod export;
pub(crate) mod ls;
pub(crate) mod validate;
pub(crate) mod versions;
