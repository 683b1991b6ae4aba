//! Warrant - attribute-based access control engine
//!
//! Role/resource/action grants with field-level attribute scopes and
//! context conditions, plus the configuration and HTTP glue around them.

pub mod authz;
pub mod errors;
pub mod settings;
pub mod web;
