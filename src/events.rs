//! Publish / subscribe bus for lifecycle notifications
//!
//! The bus is an explicit object handed to whoever needs it (usually behind an
//! `Rc`), not a global table. Events carry no payload.
//!
//! ```ignore
//! let events = Rc::new(EventBus::new());
//! let id = events.on(Event::Tick, || log!("tick"));
//! events.emit(&Event::Tick);
//! events.off(id);
//! ```
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// Events known to the bus
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// emitted once when the application starts
    Init,
    /// emitted by the game loop once per frame that runs simulation + render
    Tick,
    /// application defined event
    Named(String),
}

/// Handle returned by [`EventBus::on`], pass it to [`EventBus::off`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    live: RefCell<HashSet<SubscriptionId>>,
    callbacks: RefCell<HashMap<Event, Vec<(SubscriptionId, Callback)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Register `callback` to run on every `emit(event)`
    pub fn on(&self, event: Event, callback: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.live.borrow_mut().insert(id);
        self.callbacks
            .borrow_mut()
            .entry(event)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription, returns false if it was already gone
    pub fn off(&self, id: SubscriptionId) -> bool {
        if !self.live.borrow_mut().remove(&id) {
            return false;
        }
        // a subscription being emitted right now is not in the map, emit()
        // drops it once it sees the id is no longer live
        for subscribers in self.callbacks.borrow_mut().values_mut() {
            subscribers.retain(|(sub, _)| *sub != id);
        }
        true
    }

    /// Run every callback registered for `event`, in subscription order
    /// - callbacks may call on()/off() on this bus, subscriptions added while
    /// emitting first fire on the next emit
    pub fn emit(&self, event: &Event) {
        // take the list out so callbacks can borrow the bus again
        let mut running = match self.callbacks.borrow_mut().get_mut(event) {
            Some(subscribers) => std::mem::take(subscribers),
            None => return,
        };

        for (id, callback) in running.iter_mut() {
            if self.live.borrow().contains(id) {
                callback();
            }
        }

        let live = self.live.borrow();
        running.retain(|(id, _)| live.contains(id));
        let mut callbacks = self.callbacks.borrow_mut();
        let subscribers = callbacks.entry(event.clone()).or_default();
        running.append(subscribers);
        *subscribers = running;
    }

    pub fn subscriber_count(&self, event: &Event) -> usize {
        self.callbacks
            .borrow()
            .get(event)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }
}
