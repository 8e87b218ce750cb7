use footlight_common::{KeyCode, PointerButton, SurfaceSize};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The closed set of event kinds the engine understands.
///
/// Press kinds are one-shot edges; hold kinds persist in the queue until the
/// matching release negates them. The pairing is declared in
/// [`NEGATOR_RULES`], never inferred from names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    KeyPress,
    KeyHold,
    KeyRelease,
    PointerPress,
    PointerHold,
    PointerRelease,
    PointerMove,
    SurfaceResize,
}

impl EventKind {
    /// Whether events of this kind negate held events when dispatched.
    pub fn is_negator(self) -> bool {
        NEGATOR_RULES.iter().any(|rule| rule.release == self)
    }
}

/// Payload carried by an event, passed by reference to every callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    Key { key: KeyCode },
    Pointer { button: PointerButton, position: Vec2 },
    Cursor { position: Vec2 },
    Resize { size: SurfaceSize },
}

/// Identity of the physical source behind an event.
///
/// Hold events are matched with their negating release through this value
/// alone; the kinds of the two events play no part in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Key(KeyCode),
    Button(PointerButton),
}

/// A queued engine event.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub kind: EventKind,
    pub payload: EventPayload,
    /// Persistent events stay queued across dispatch rounds until negated.
    pub persistent: bool,
}

impl EngineEvent {
    /// One-shot edge fired on the first key press.
    pub fn key_press(key: KeyCode) -> Self {
        Self {
            kind: EventKind::KeyPress,
            payload: EventPayload::Key { key },
            persistent: false,
        }
    }

    /// Level event that re-fires every tick while the key is held.
    pub fn key_hold(key: KeyCode) -> Self {
        Self {
            kind: EventKind::KeyHold,
            payload: EventPayload::Key { key },
            persistent: true,
        }
    }

    /// Negator for the key's held state.
    pub fn key_release(key: KeyCode) -> Self {
        Self {
            kind: EventKind::KeyRelease,
            payload: EventPayload::Key { key },
            persistent: false,
        }
    }

    /// One-shot edge fired on the first press of a pointer button.
    pub fn pointer_press(button: PointerButton, position: Vec2) -> Self {
        Self {
            kind: EventKind::PointerPress,
            payload: EventPayload::Pointer { button, position },
            persistent: false,
        }
    }

    /// Level event that re-fires every tick while the button is held.
    pub fn pointer_hold(button: PointerButton, position: Vec2) -> Self {
        Self {
            kind: EventKind::PointerHold,
            payload: EventPayload::Pointer { button, position },
            persistent: true,
        }
    }

    /// Negator for the button's held state.
    pub fn pointer_release(button: PointerButton, position: Vec2) -> Self {
        Self {
            kind: EventKind::PointerRelease,
            payload: EventPayload::Pointer { button, position },
            persistent: false,
        }
    }

    pub fn pointer_move(position: Vec2) -> Self {
        Self {
            kind: EventKind::PointerMove,
            payload: EventPayload::Cursor { position },
            persistent: false,
        }
    }

    pub fn surface_resize(size: SurfaceSize) -> Self {
        Self {
            kind: EventKind::SurfaceResize,
            payload: EventPayload::Resize { size },
            persistent: false,
        }
    }

    /// The source identity used for duplicate suppression and negation.
    /// `None` for events not tied to a physical source (cursor motion,
    /// resize).
    pub fn comparator(&self) -> Option<Comparator> {
        match self.payload {
            EventPayload::Key { key } => Some(Comparator::Key(key)),
            EventPayload::Pointer { button, .. } => Some(Comparator::Button(button)),
            EventPayload::Cursor { .. } | EventPayload::Resize { .. } => None,
        }
    }
}

/// One press/hold/release triple for an input class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegatorRule {
    pub press: EventKind,
    pub hold: EventKind,
    pub release: EventKind,
}

/// Negation rules for every input class that produces held state.
pub const NEGATOR_RULES: [NegatorRule; 2] = [
    NegatorRule {
        press: EventKind::KeyPress,
        hold: EventKind::KeyHold,
        release: EventKind::KeyRelease,
    },
    NegatorRule {
        press: EventKind::PointerPress,
        hold: EventKind::PointerHold,
        release: EventKind::PointerRelease,
    },
];
