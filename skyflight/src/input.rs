//! Input events delivered by the host and the registry of listeners the host
//! dispatches them to.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Positive values zoom out.
    Wheel(f64),
    /// The window lost focus; every held key counts as released.
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Keyboard,
    Pointer,
}

impl ListenerKind {
    pub fn accepts(&self, event: &InputEvent) -> bool {
        match self {
            ListenerKind::Keyboard => matches!(
                event,
                InputEvent::KeyDown(_) | InputEvent::KeyUp(_) | InputEvent::FocusLost
            ),
            ListenerKind::Pointer => matches!(
                event,
                InputEvent::PointerDown { .. }
                    | InputEvent::PointerMove { .. }
                    | InputEvent::PointerUp
                    | InputEvent::Wheel(_)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Host-owned record of who is listening for input.
#[derive(Debug, Default)]
pub struct InputListeners {
    next_id: u64,
    listeners: BTreeMap<ListenerId, ListenerKind>,
}

impl InputListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, kind);
        id
    }

    /// Returns false if the listener was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Whether any registered listener wants `event`.
    pub fn wants(&self, event: &InputEvent) -> bool {
        self.listeners.values().any(|kind| kind.accepts(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_remove() {
        let mut listeners = InputListeners::new();
        let keyboard = listeners.register(ListenerKind::Keyboard);
        let pointer = listeners.register(ListenerKind::Pointer);
        assert_ne!(keyboard, pointer);
        assert_eq!(listeners.len(), 2);

        assert!(listeners.wants(&InputEvent::KeyDown("w".into())));
        assert!(listeners.wants(&InputEvent::Wheel(1.0)));

        assert!(listeners.remove(keyboard));
        assert!(!listeners.remove(keyboard));
        assert!(!listeners.wants(&InputEvent::KeyUp("w".into())));
        assert!(listeners.is_registered(pointer));
    }
}
