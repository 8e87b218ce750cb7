use crate::event::{EngineEvent, EventKind, EventPayload};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Handle returned by callback registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub Uuid);

impl CallbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

type EventCallback = Box<dyn FnMut(&EventPayload)>;

/// Ordered callback lists per event kind.
///
/// Closures are not comparable, so removal is by the handle returned at
/// registration. Unregistering an absent handle is a silent no-op.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: BTreeMap<EventKind, Vec<(CallbackId, EventCallback)>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind. Callbacks for a kind run in
    /// registration order.
    pub fn register<F>(&mut self, kind: EventKind, callback: F) -> CallbackId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        let id = CallbackId::new();
        self.callbacks
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback. Returns whether anything was
    /// removed.
    pub fn unregister(&mut self, kind: EventKind, id: CallbackId) -> bool {
        let Some(list) = self.callbacks.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(cid, _)| *cid != id);
        list.len() != before
    }

    /// Number of callbacks registered for the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.callbacks.get(&kind).map_or(0, Vec::len)
    }

    pub(crate) fn invoke(&mut self, kind: EventKind, payload: &EventPayload) {
        if let Some(list) = self.callbacks.get_mut(&kind) {
            for (_, callback) in list.iter_mut() {
                callback(payload);
            }
        }
    }
}

/// Buffered engine events with persistence and negation semantics.
///
/// # Invariants
/// - At most one persistent event per (kind, comparator) pair is queued.
/// - Dispatch while the queue is not accepting mutates nothing.
/// - Non-persistent events are removed after one dispatch round; persistent
///   events survive until a release with an equal comparator arrives.
pub struct EventQueue {
    events: Vec<EngineEvent>,
    accepting: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            accepting: true,
        }
    }

    /// Gate dispatch. The engine closes the gate while paused so no input
    /// mutates queue state behind a paused simulation.
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Queue an event.
    ///
    /// Returns `false` without mutating when the gate is closed or when an
    /// event of the same kind and comparator is already queued. A release
    /// event first removes every queued persistent event with an equal
    /// comparator (kind is ignored on that match), then queues itself for one
    /// dispatch round.
    pub fn dispatch(&mut self, event: EngineEvent) -> bool {
        if !self.accepting {
            return false;
        }
        if let Some(cmp) = event.comparator() {
            let duplicate = self
                .events
                .iter()
                .any(|e| e.kind == event.kind && e.comparator() == Some(cmp));
            if duplicate {
                tracing::trace!(kind = ?event.kind, "duplicate event suppressed");
                return false;
            }
            if event.kind.is_negator() {
                let before = self.events.len();
                self.events
                    .retain(|e| !(e.persistent && e.comparator() == Some(cmp)));
                let removed = before - self.events.len();
                if removed > 0 {
                    tracing::debug!(kind = ?event.kind, removed, "negated held events");
                }
            }
        }
        self.events.push(event);
        true
    }

    /// Run one dispatch round: invoke every callback registered for each
    /// queued event's kind, then drop the non-persistent events.
    pub fn dispatch_queue(&mut self, registry: &mut CallbackRegistry) {
        for event in &self.events {
            registry.invoke(event.kind, &event.payload);
        }
        self.events.retain(|e| e.persistent);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queued events of one kind, in dispatch order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Drop everything, held state included. Used when input detaches.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footlight_common::{KeyCode, PointerButton};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY_E: KeyCode = KeyCode(69);
    const KEY_Q: KeyCode = KeyCode(81);

    #[test]
    fn dispatch_queues_event() {
        let mut q = EventQueue::new();
        assert!(q.dispatch(EngineEvent::key_press(KEY_E)));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn closed_gate_rejects_without_mutation() {
        let mut q = EventQueue::new();
        q.set_accepting(false);
        assert!(!q.dispatch(EngineEvent::key_press(KEY_E)));
        assert!(q.is_empty());
        q.set_accepting(true);
        assert!(q.dispatch(EngineEvent::key_press(KEY_E)));
    }

    #[test]
    fn duplicate_hold_is_suppressed() {
        let mut q = EventQueue::new();
        assert!(q.dispatch(EngineEvent::key_hold(KEY_E)));
        assert!(!q.dispatch(EngineEvent::key_hold(KEY_E)));
        assert_eq!(q.of_kind(EventKind::KeyHold).count(), 1);
    }

    #[test]
    fn release_negates_matching_hold_only() {
        let mut q = EventQueue::new();
        q.dispatch(EngineEvent::key_hold(KEY_E));
        q.dispatch(EngineEvent::key_hold(KEY_Q));
        assert!(q.dispatch(EngineEvent::key_release(KEY_E)));

        let held: Vec<_> = q.of_kind(EventKind::KeyHold).collect();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].comparator(), EngineEvent::key_hold(KEY_Q).comparator());
    }

    #[test]
    fn release_match_ignores_kind() {
        // The hold and the release have different kinds; the removal matches
        // on source identity alone.
        let mut q = EventQueue::new();
        q.dispatch(EngineEvent::pointer_hold(PointerButton::Primary, Vec2::ZERO));
        q.dispatch(EngineEvent::pointer_release(
            PointerButton::Primary,
            Vec2::new(5.0, 5.0),
        ));
        assert_eq!(q.of_kind(EventKind::PointerHold).count(), 0);
        assert_eq!(q.of_kind(EventKind::PointerRelease).count(), 1);
    }

    #[test]
    fn release_does_not_touch_other_buttons() {
        let mut q = EventQueue::new();
        q.dispatch(EngineEvent::pointer_hold(PointerButton::Primary, Vec2::ZERO));
        q.dispatch(EngineEvent::pointer_hold(PointerButton::Secondary, Vec2::ZERO));
        q.dispatch(EngineEvent::pointer_release(PointerButton::Primary, Vec2::ZERO));
        assert_eq!(q.of_kind(EventKind::PointerHold).count(), 1);
    }

    #[test]
    fn dispatch_round_keeps_persistent_events() {
        let mut q = EventQueue::new();
        let mut reg = CallbackRegistry::new();
        q.dispatch(EngineEvent::key_press(KEY_E));
        q.dispatch(EngineEvent::key_hold(KEY_E));

        q.dispatch_queue(&mut reg);
        assert_eq!(q.len(), 1);
        assert_eq!(q.of_kind(EventKind::KeyHold).count(), 1);

        // The hold keeps re-firing on every round until negated.
        q.dispatch_queue(&mut reg);
        assert_eq!(q.of_kind(EventKind::KeyHold).count(), 1);
    }

    #[test]
    fn callbacks_fire_per_round_with_payload() {
        let mut q = EventQueue::new();
        let mut reg = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        reg.register(EventKind::KeyHold, move |payload| {
            if let EventPayload::Key { key } = payload {
                sink.borrow_mut().push(*key);
            }
        });

        q.dispatch(EngineEvent::key_hold(KEY_E));
        q.dispatch_queue(&mut reg);
        q.dispatch_queue(&mut reg);
        assert_eq!(*seen.borrow(), vec![KEY_E, KEY_E]);
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let mut q = EventQueue::new();
        let mut reg = CallbackRegistry::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in [1, 2, 3] {
            let sink = order.clone();
            reg.register(EventKind::KeyPress, move |_| sink.borrow_mut().push(tag));
        }
        q.dispatch(EngineEvent::key_press(KEY_E));
        q.dispatch_queue(&mut reg);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn unregister_stops_invocation() {
        let mut q = EventQueue::new();
        let mut reg = CallbackRegistry::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = count.clone();
        let id = reg.register(EventKind::KeyPress, move |_| *sink.borrow_mut() += 1);

        q.dispatch(EngineEvent::key_press(KEY_E));
        q.dispatch_queue(&mut reg);
        assert_eq!(*count.borrow(), 1);

        assert!(reg.unregister(EventKind::KeyPress, id));
        assert!(!reg.unregister(EventKind::KeyPress, id));

        q.dispatch(EngineEvent::key_press(KEY_E));
        q.dispatch_queue(&mut reg);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unregister_wrong_kind_is_noop() {
        let mut reg = CallbackRegistry::new();
        let id = reg.register(EventKind::KeyPress, |_| {});
        assert!(!reg.unregister(EventKind::KeyRelease, id));
        assert_eq!(reg.count(EventKind::KeyPress), 1);
    }

    #[test]
    fn clear_drops_held_state() {
        let mut q = EventQueue::new();
        q.dispatch(EngineEvent::key_hold(KEY_E));
        q.dispatch(EngineEvent::pointer_move(Vec2::ZERO));
        q.clear();
        assert!(q.is_empty());
    }
}
