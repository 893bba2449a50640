use crate::Event;
use arcstr::ArcStr;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        SubscriptionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A callback invoked for each matching event. Handlers are `Fn`, not
/// `FnMut`: a feature-set handler closes over whatever it needs via
/// `Arc`/channels, matching the teacher's preference for plain closures
/// over a heavier actor abstraction at this layer.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

impl<F: Fn(&Event) + Send + Sync> EventHandler for F {
    fn handle(&self, event: &Event) {
        self(event)
    }
}

struct Subscription {
    id: SubscriptionId,
    handler: Arc<dyn EventHandler>,
    background: bool,
}

/// A single-process pub/sub bus (`spec.md` §4.4).
///
/// Delivery for a given `event_type` happens in subscription order.
/// Handlers run synchronously on the emitting task unless they were
/// registered with [`EventBus::subscribe_background`], in which case
/// delivery is spawned onto the tokio runtime so the emitter is not
/// blocked by a slow handler. The bus itself is safe to call from any
/// number of concurrent tasks: all mutation goes through a single
/// `parking_lot::RwLock`, grounded on the teacher's use of `parking_lot`
/// for every shared-state structure that isn't on the hot dataflow path.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RwLock<FxHashMap<ArcStr, Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { subscriptions: RwLock::new(FxHashMap::default()) }
    }

    pub fn subscribe(
        &self,
        event_type: impl Into<ArcStr>,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        self.subscribe_inner(event_type, handler, false)
    }

    pub fn subscribe_background(
        &self,
        event_type: impl Into<ArcStr>,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        self.subscribe_inner(event_type, handler, true)
    }

    fn subscribe_inner(
        &self,
        event_type: impl Into<ArcStr>,
        handler: Arc<dyn EventHandler>,
        background: bool,
    ) -> SubscriptionId {
        let id = SubscriptionId::next();
        let mut subs = self.subscriptions.write();
        subs.entry(event_type.into()).or_default().push(Subscription { id, handler, background });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        for list in subs.values_mut() {
            list.retain(|s| s.id != id);
        }
    }

    /// Deliver `event` to every subscriber of `event.event_type`, in
    /// subscription order.
    pub fn emit(&self, event: Event) {
        let handlers: Vec<(Arc<dyn EventHandler>, bool)> = {
            let subs = self.subscriptions.read();
            match subs.get(event.event_type.as_str()) {
                Some(list) => list.iter().map(|s| (s.handler.clone(), s.background)).collect(),
                None => return,
            }
        };
        for (handler, background) in handlers {
            if background {
                let event = event.clone();
                tokio::spawn(async move {
                    handler.handle(&event);
                });
            } else {
                handler.handle(&event);
            }
        }
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscriptions.read().get(event_type).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn delivers_in_subscription_order() {
        let bus = EventBus::new();
        let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3u32 {
            let order = order.clone();
            bus.subscribe("thing.happened", Arc::new(move |_: &Event| order.lock().push(i)));
        }
        bus.emit(Event::new("thing.happened"));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn unrelated_event_types_do_not_cross_deliver() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let hits2 = hits.clone();
        bus.subscribe("a", Arc::new(move |_: &Event| *hits2.lock() += 1));
        bus.emit(Event::new("b"));
        assert_eq!(*hits.lock(), 0);
    }
}
