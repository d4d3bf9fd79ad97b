use crate::document::Document;
use crate::event::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Listener<H> {
    id: ListenerId,
    target: String,
    generation: u64,
    kind: EventKind,
    handler: H,
}

/// Event listeners bound to a specific generation of an element.
///
/// A listener stays attached only to the element instance it was bound
/// to: once that element is replaced, the listener stops matching and can
/// be pruned. Events bubble from the target up through its ancestors.
#[derive(Debug, Clone)]
pub struct Listeners<H> {
    next_id: u64,
    entries: Vec<Listener<H>>,
}

impl<H> Default for Listeners<H> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<H: Clone> Listeners<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to the current generation of `target`.
    ///
    /// Returns `None` if the target is not in the document.
    pub fn attach(
        &mut self,
        document: &Document,
        target: &str,
        kind: EventKind,
        handler: H,
    ) -> Option<ListenerId> {
        let generation = document.generation(target)?;
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Listener {
            id,
            target: target.to_string(),
            generation,
            kind,
            handler,
        });
        Some(id)
    }

    pub fn detach(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the listener exists and its element instance is still in the document.
    pub fn is_live(&self, id: ListenerId, document: &Document) -> bool {
        self.entries
            .iter()
            .find(|l| l.id == id)
            .is_some_and(|l| document.generation(&l.target) == Some(l.generation))
    }

    /// Handlers that fire for `event`, innermost element first.
    pub fn dispatch(&self, document: &Document, event: &Event) -> Vec<H> {
        let Some(path) = document.ancestors(event.target()) else {
            log::debug!("Event target {} not in document", event.target());
            return Vec::new();
        };
        let kind = event.kind();

        let mut fired = Vec::new();
        for (element_id, generation) in &path {
            for listener in &self.entries {
                if listener.kind == kind
                    && &listener.target == element_id
                    && listener.generation == *generation
                {
                    fired.push(listener.handler.clone());
                }
            }
        }
        fired
    }

    /// Drop listeners whose element instance is gone. Returns how many.
    pub fn prune(&mut self, document: &Document) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|l| document.generation(&l.target) == Some(l.generation));
        before - self.entries.len()
    }
}
