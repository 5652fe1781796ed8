//! Listener registry for session notifications.

use std::sync::Arc;

use crate::domain::events::SessionEvent;

/// Receives every event the engine publishes.
///
/// Called outside the engine's state lock, in the order events were
/// recorded.
pub trait SessionListener: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &SessionEvent);
}

impl<F> SessionListener for F
where
    F: Fn(&SessionEvent) + Send + Sync,
{
    fn on_event(&self, event: &SessionEvent) {
        self(event);
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn SessionListener>)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, listener: Arc<dyn SessionListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn SessionListener>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}
