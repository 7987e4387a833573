//! Conversions from common Rust types into the byte strings the tree is keyed by.

pub mod vector_key;
