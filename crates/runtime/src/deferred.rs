use foundation::time::Millis;

/// Identifier of a task queued in [`DeferredQueue`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeferredId(pub u64);

#[derive(Debug)]
struct Item<T> {
    id: DeferredId,
    due: Millis,
    payload: T,
}

/// Deterministic timer queue driven by host-supplied timestamps.
///
/// Ordering contract:
/// - Due items are released in `(due, id)` order, so equal deadlines fire in
///   insertion order.
/// - Cancelling an item does not perturb the order of the remaining ones.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    next_id: u64,
    items: Vec<Item<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Millis, payload: T) -> DeferredId {
        let id = DeferredId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push(Item { id, due, payload });
        id
    }

    /// Removes a pending item. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: DeferredId) -> Option<T> {
        let pos = self.items.iter().position(|it| it.id == id)?;
        Some(self.items.remove(pos).payload)
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn is_pending(&self, id: DeferredId) -> bool {
        self.items.iter().any(|it| it.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Earliest deadline, for hosts that arm a single native timer.
    pub fn next_due(&self) -> Option<Millis> {
        self.items.iter().map(|it| it.due).min()
    }

    /// Removes and returns every item due at or before `now`.
    pub fn take_due(&mut self, now: Millis) -> Vec<(DeferredId, T)> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.items.drain(..).partition(|it| it.due <= now);
        self.items = pending;
        due.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));
        due.into_iter().map(|it| (it.id, it.payload)).collect()
    }
}
