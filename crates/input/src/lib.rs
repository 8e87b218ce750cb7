//! Input translation: raw host transitions normalized into queue events.
//!
//! # Invariants
//! - One press edge and one hold per physical down; OS auto-repeat is absorbed.
//! - Any host that can report downs, ups, and moves plugs in unchanged.

pub mod translate;

pub use translate::{InputTranslator, RawInput};

pub fn crate_info() -> &'static str {
    "footlight-input v0.1.0"
}
