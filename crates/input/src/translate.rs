use footlight_common::{KeyCode, PointerButton, SurfaceSize};
use footlight_events::EngineEvent;
use glam::Vec2;
use std::collections::BTreeSet;

/// A device-level transition as a host window reports it.
///
/// Hosts forward these verbatim; the translator decides what reaches the
/// queue. OS key auto-repeat in particular must not be filtered host-side,
/// the translator already ignores downs for keys it knows are held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    PointerDown { button: PointerButton, position: Vec2 },
    PointerUp { button: PointerButton, position: Vec2 },
    PointerMoved(Vec2),
    Resized(SurfaceSize),
}

/// Stateful raw-to-event translator.
///
/// Tracks which keys and buttons are currently down so that a press emits
/// exactly one edge event plus one persistent hold, no matter how many
/// repeated downs the host delivers before the matching up.
#[derive(Debug, Default)]
pub struct InputTranslator {
    held_keys: BTreeSet<KeyCode>,
    held_buttons: BTreeSet<PointerButton>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one transition into zero or more queue events, in the order
    /// they should be dispatched.
    pub fn translate(&mut self, raw: RawInput) -> Vec<EngineEvent> {
        match raw {
            RawInput::KeyDown(key) => {
                if !self.held_keys.insert(key) {
                    return Vec::new();
                }
                vec![EngineEvent::key_press(key), EngineEvent::key_hold(key)]
            }
            RawInput::KeyUp(key) => {
                self.held_keys.remove(&key);
                vec![EngineEvent::key_release(key)]
            }
            RawInput::PointerDown { button, position } => {
                if !self.held_buttons.insert(button) {
                    return Vec::new();
                }
                vec![
                    EngineEvent::pointer_press(button, position),
                    EngineEvent::pointer_hold(button, position),
                ]
            }
            RawInput::PointerUp { button, position } => {
                self.held_buttons.remove(&button);
                vec![EngineEvent::pointer_release(button, position)]
            }
            RawInput::PointerMoved(position) => {
                vec![EngineEvent::pointer_move(position)]
            }
            RawInput::Resized(size) => {
                tracing::debug!(width = size.width, height = size.height, "surface resized");
                vec![EngineEvent::surface_resize(size)]
            }
        }
    }

    /// Forget all held state. Used when the engine detaches from a host, so
    /// a key held across detach/reattach registers as a fresh press.
    pub fn reset(&mut self) {
        self.held_keys.clear();
        self.held_buttons.clear();
    }

    pub fn held_key_count(&self) -> usize {
        self.held_keys.len()
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footlight_events::EventKind;

    const KEY_W: KeyCode = KeyCode(87);

    fn kinds(events: &[EngineEvent]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn key_down_emits_press_and_hold() {
        let mut translator = InputTranslator::new();
        let events = translator.translate(RawInput::KeyDown(KEY_W));
        assert_eq!(kinds(&events), vec![EventKind::KeyPress, EventKind::KeyHold]);
        assert!(!events[0].persistent);
        assert!(events[1].persistent);
    }

    #[test]
    fn repeated_key_down_is_silent_until_released() {
        let mut translator = InputTranslator::new();
        translator.translate(RawInput::KeyDown(KEY_W));
        assert!(translator.translate(RawInput::KeyDown(KEY_W)).is_empty());
        assert!(translator.translate(RawInput::KeyDown(KEY_W)).is_empty());

        translator.translate(RawInput::KeyUp(KEY_W));
        assert_eq!(translator.translate(RawInput::KeyDown(KEY_W)).len(), 2);
    }

    #[test]
    fn key_up_emits_release_only() {
        let mut translator = InputTranslator::new();
        translator.translate(RawInput::KeyDown(KEY_W));
        let events = translator.translate(RawInput::KeyUp(KEY_W));
        assert_eq!(kinds(&events), vec![EventKind::KeyRelease]);
        assert!(!translator.is_key_held(KEY_W));
    }

    #[test]
    fn pointer_follows_the_same_triple() {
        let mut translator = InputTranslator::new();
        let down = RawInput::PointerDown {
            button: PointerButton::Primary,
            position: Vec2::new(4.0, 8.0),
        };
        let events = translator.translate(down);
        assert_eq!(
            kinds(&events),
            vec![EventKind::PointerPress, EventKind::PointerHold]
        );
        assert!(translator.translate(down).is_empty());

        let events = translator.translate(RawInput::PointerUp {
            button: PointerButton::Primary,
            position: Vec2::new(4.0, 8.0),
        });
        assert_eq!(kinds(&events), vec![EventKind::PointerRelease]);
    }

    #[test]
    fn distinct_buttons_do_not_shadow_each_other() {
        let mut translator = InputTranslator::new();
        translator.translate(RawInput::PointerDown {
            button: PointerButton::Primary,
            position: Vec2::ZERO,
        });
        let events = translator.translate(RawInput::PointerDown {
            button: PointerButton::Secondary,
            position: Vec2::ZERO,
        });
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn movement_and_resize_are_plain_edges() {
        let mut translator = InputTranslator::new();
        let moved = translator.translate(RawInput::PointerMoved(Vec2::new(1.0, 2.0)));
        assert_eq!(kinds(&moved), vec![EventKind::PointerMove]);
        assert!(!moved[0].persistent);

        let resized = translator.translate(RawInput::Resized(SurfaceSize::new(800, 600)));
        assert_eq!(kinds(&resized), vec![EventKind::SurfaceResize]);
    }

    #[test]
    fn reset_forgets_held_keys() {
        let mut translator = InputTranslator::new();
        translator.translate(RawInput::KeyDown(KEY_W));
        assert_eq!(translator.held_key_count(), 1);

        translator.reset();
        assert_eq!(translator.held_key_count(), 0);
        assert_eq!(translator.translate(RawInput::KeyDown(KEY_W)).len(), 2);
    }
}
