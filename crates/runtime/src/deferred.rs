/// Handle returned by [`DeferredQueue::schedule`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TaskId,
    due_ms: f64,
    action: T,
}

/// Fixed-delay deferred actions, released in a deterministic order.
///
/// The queue holds no clock: hosts pass their own notion of "now" in
/// milliseconds, so the same schedule replays identically in tests.
///
/// Ordering contract:
/// - `take_due` yields actions ordered by `(due_ms, insertion order)`.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: u32, action: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            id,
            due_ms: now_ms + f64::from(delay_ms),
            action,
        });
        id
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Removes `id` and returns its action whatever its due time. Hosts whose
    /// own timer already waited out the delay use this instead of `take_due`.
    pub fn take(&mut self, id: TaskId) -> Option<T> {
        let pos = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(pos).action)
    }

    /// Drops everything still pending (page teardown).
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time among pending actions.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| p.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Removes and returns every action due at or before `now_ms`.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then_with(|| a.id.cmp(&b.id)));
        due.into_iter().map(|p| p.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredQueue;

    #[test]
    fn nothing_is_due_before_the_delay() {
        let mut q = DeferredQueue::new();
        q.schedule(100.0, 1000, "hide");
        assert!(q.take_due(1099.0).is_empty());
        assert_eq!(q.take_due(1100.0), vec!["hide"]);
        assert!(q.is_empty());
    }

    #[test]
    fn releases_in_due_then_insertion_order() {
        let mut q = DeferredQueue::new();
        q.schedule(0.0, 50, "b");
        q.schedule(0.0, 10, "a");
        q.schedule(0.0, 50, "c");
        assert_eq!(q.next_due_ms(), Some(10.0));
        assert_eq!(q.take_due(60.0), vec!["a", "b", "c"]);
    }

    #[test]
    fn take_ignores_the_due_time() {
        let mut q = DeferredQueue::new();
        let id = q.schedule(0.0, 1000, "reveal");
        assert!(q.take_due(999.0).is_empty());
        assert_eq!(q.take(id), Some("reveal"));
        assert_eq!(q.take(id), None);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut q = DeferredQueue::new();
        let id = q.schedule(0.0, 10, 1);
        q.schedule(0.0, 10, 2);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.take_due(10.0), vec![2]);

        q.schedule(0.0, 10, 3);
        q.cancel_all();
        assert!(q.take_due(100.0).is_empty());
    }
}
