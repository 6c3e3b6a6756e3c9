//! Event bus.
//!
//! Handlers are stored per event name and invoked synchronously, in
//! registration order, on the thread that fires. One-shot handlers are
//! removed after their first call.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::event::{DeckEvent, EventName};

/// Handle returned by registration, used to remove a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId(pub u64);

impl HandlerId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Boxed event handler.
pub type Handler = Box<dyn FnMut(&DeckEvent)>;

struct Registration {
    id: HandlerId,
    once: bool,
    handler: Handler,
}

/// Named publish/subscribe without wildcards or bubbling.
#[derive(Default)]
pub struct EventBus {
    handlers: FxHashMap<EventName, Vec<Registration>>,
    next_id: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every firing of `name`.
    pub fn on(&mut self, name: EventName, handler: impl FnMut(&DeckEvent) + 'static) -> HandlerId {
        self.register(name, false, Box::new(handler))
    }

    /// Register `handler` for the next firing of `name` only.
    pub fn once(
        &mut self,
        name: EventName,
        handler: impl FnMut(&DeckEvent) + 'static,
    ) -> HandlerId {
        self.register(name, true, Box::new(handler))
    }

    fn register(&mut self, name: EventName, once: bool, handler: Handler) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers
            .entry(name)
            .or_default()
            .push(Registration { id, once, handler });
        id
    }

    /// Remove one handler. Returns `false` if it was not registered.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        self.handlers.retain(|_, list| {
            let before = list.len();
            list.retain(|reg| reg.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Invoke every handler of `event.name`. Returns how many ran.
    pub fn fire(&mut self, event: &DeckEvent) -> usize {
        let Some(list) = self.handlers.get_mut(&event.name) else {
            tracing::trace!(event = %event.name, "no handlers");
            return 0;
        };

        for reg in list.iter_mut() {
            (reg.handler)(event);
        }
        let invoked = list.len();

        list.retain(|reg| !reg.once);
        if list.is_empty() {
            self.handlers.remove(&event.name);
        }

        tracing::trace!(event = %event.name, invoked, "fired");
        invoked
    }

    /// Drop every handler of `name`.
    pub fn remove_all_handlers(&mut self, name: &EventName) {
        self.handlers.remove(name);
    }

    /// Drop every handler of every event.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    #[must_use]
    pub fn handler_count(&self, name: &EventName) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(String, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.to_string(), list.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
