//! Broadcast hooks.
//!
//! A [`Signal`] is a list of registered callbacks. Emission walks the list in
//! registration order and calls every listener exactly once. Listeners get a
//! shared reference to the payload, so they can never mutate the emitter
//! while it is emitting; anything that must mutate should read a queue after
//! the tick instead.

use std::fmt;

/// Token returned by [`Signal::connect`], used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

pub struct Signal<T> {
    listeners: Vec<(ConnectionId, Listener<T>)>,
    next_id: u64,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn connect(&mut self, listener: impl FnMut(&T) + 'static) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not connected.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_each_listener_called_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::new();
        for tag in ["a", "b"] {
            let seen = seen.clone();
            signal.connect(move |v: &u32| seen.borrow_mut().push((tag, *v)));
        }

        signal.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_disconnect() {
        let count = Rc::new(RefCell::new(0));
        let mut signal = Signal::new();
        let c = count.clone();
        let id = signal.connect(move |_: &()| *c.borrow_mut() += 1);

        signal.emit(&());
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(&());
        assert_eq!(*count.borrow(), 1);
        assert!(signal.is_empty());
    }
}
