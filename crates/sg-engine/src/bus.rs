//! Publish/subscribe hub.
//!
//! Handlers run synchronously, in subscription order, on the publishing
//! thread. The bus is single-threaded: clones share one subscriber list
//! through `Rc`.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use sg_ir::{Event, EventKind};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct Subscribers {
    list: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

/// Shared event bus handle.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<Subscribers>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `kind`.
    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.list.borrow_mut().push(Subscription {
            id,
            kind,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = self.inner.list.borrow_mut();
        let before = list.len();
        list.retain(|s| s.id != id);
        list.len() != before
    }

    /// Deliver `event` to its subscribers and return how many ran.
    ///
    /// The subscriber list is snapshotted first, so handlers may publish or
    /// subscribe themselves; late subscribers miss the event in flight.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .list
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.handler.clone())
            .collect();

        log::trace!(target: "bus", "{} -> {} handlers", kind.name(), handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Subscribe to `kinds` and collect every matching event, in order.
    pub fn record(&self, kinds: &[EventKind]) -> Rc<RefCell<Vec<Event>>> {
        let log: Rc<RefCell<Vec<Event>>> = Rc::default();
        for &kind in kinds {
            let sink = log.clone();
            self.subscribe(kind, move |e| sink.borrow_mut().push(*e));
        }
        log
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.inner.list.borrow().len())
            .finish()
    }
}
