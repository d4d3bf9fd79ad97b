//! Replaceable per-table listener sets.

use tabledom::Document;
use tabledom::ListenerId;
use tabledom::Listeners;

/// The listeners one engine holds for one table.
///
/// Re-binding always tears the old set down before attaching the new one,
/// so a table never holds two live copies of the same listener.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    active: Vec<ListenerId>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Detach every listener. Returns how many were removed.
    pub fn teardown<H: Clone>(&mut self, listeners: &mut Listeners<H>) -> usize {
        let removed = self
            .active
            .drain(..)
            .filter(|id| listeners.detach(*id))
            .count();
        if removed > 0 {
            log::debug!("Detached {removed} listeners");
        }
        removed
    }

    /// Tear down, then attach whatever `bind` returns.
    pub fn rebind<H: Clone>(
        &mut self,
        listeners: &mut Listeners<H>,
        bind: impl FnOnce(&mut Listeners<H>) -> Vec<ListenerId>,
    ) {
        self.teardown(listeners);
        self.active = bind(listeners);
    }

    /// `true` if any listener's element was replaced or removed.
    pub fn is_stale<H: Clone>(&self, listeners: &Listeners<H>, document: &Document) -> bool {
        self.active.iter().any(|id| !listeners.is_live(*id, document))
    }
}
