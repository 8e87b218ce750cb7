//! Event queue: input-derived events with explicit persistence semantics.
//!
//! # Invariants
//! - At most one persistent event per (kind, source) pair is queued.
//! - Dispatch against a closed gate is a silent no-op, never an error.
//! - Negation matches on source identity alone; event kind is ignored.

pub mod event;
pub mod queue;

pub use event::{Comparator, EngineEvent, EventKind, EventPayload, NEGATOR_RULES, NegatorRule};
pub use queue::{CallbackId, CallbackRegistry, EventQueue};

pub fn crate_info() -> &'static str {
    "footlight-events v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("events"));
    }
}
