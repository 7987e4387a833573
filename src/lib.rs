//! An Adaptive Radix Tree: an ordered map keyed by byte strings.
//!
//! Inner nodes adapt their layout to how many children they hold (4, 16, 48 or 256) and store
//! runs of key bytes shared by their whole subtree inline, so lookups touch one node per
//! distinguishing byte instead of one per key byte.
//!
//! ```rust
//! use artree::{AdaptiveRadixTree, ArtError};
//!
//! let mut tree = AdaptiveRadixTree::<&str>::new();
//! tree.insert_k(&[10, 20, 30], "a").unwrap();
//! tree.insert_k(&[10, 20, 32], "b").unwrap();
//!
//! assert_eq!(tree.get_k(&[10, 20, 32]), Some(&"b"));
//! assert!(matches!(
//!     tree.insert_k(&[10, 20], "c"),
//!     Err(ArtError::PrefixConflict { .. })
//! ));
//!
//! let keys: Vec<&[u8]> = tree.keys().collect();
//! assert_eq!(keys, vec![&[10, 20, 30][..], &[10, 20, 32][..]]);
//! ```

pub mod error;
pub mod iter;
pub mod keys;
pub mod mapping;
mod node;
pub mod partials;
mod print;
pub mod stats;
pub mod tree;
pub mod utils;

pub use error::ArtError;
pub use keys::vector_key::VectorKey;
pub use node::{MAX_PARTIAL_LENGTH, NodeKind};
pub use stats::{TreeStats, TreeStatsTrait};
pub use tree::AdaptiveRadixTree;
