#![allow(dead_code)]

pub mod builders;

pub use builders::{sample_registry, ContextBuilder};

use std::path::PathBuf;

use warrant::authz::{loader, Registry};

/// The policies shipped in the repository's `policies/` directory.
pub fn shipped_registry() -> Registry {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("policies");
    loader::load_policies(&dir).expect("Failed to load shipped policies")
}
