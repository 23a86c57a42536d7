//! lore - a fuzzy tag-matching engine for personal knowledge and tools.
//!
//! lore keeps small layered sets of tagged entries (knowledge snippets and
//! tool manifests) and answers free-text queries by word-bigram matching:
//! tag text counts at full weight, value text at half weight, consecutive
//! matches earn a growing run bonus, and single-typo words still match at
//! a discount.
//!
//! # Quick start
//!
//! ```
//! use lore::{Engine, Entry, Layer, ScoringConfig};
//!
//! let engine = Engine::new(ScoringConfig::default());
//! engine.build(vec![Layer::new(
//!     "global",
//!     vec![
//!         Entry::knowledge("install knowledge", "pip install lore"),
//!         Entry::knowledge("uninstall knowledge", "pip uninstall lore"),
//!     ],
//! )]);
//!
//! let results = engine.rank("how do I install knowledge?").unwrap();
//! assert_eq!(results[0].identity, "install knowledge");
//! ```

pub mod bigram;
pub mod config;
pub mod data_dir;
pub mod engine;
pub mod entry;
pub mod error;
pub mod index;
pub mod loader;
pub mod merge;
pub mod rank;
pub mod scorer;
pub mod token;

pub use config::Config;
pub use data_dir::DataDir;
pub use engine::Engine;
pub use entry::{Entry, EntryKind, Layer};
pub use error::{Error, Result};
pub use index::Index;
pub use rank::RankedEntry;
pub use scorer::ScoringConfig;
