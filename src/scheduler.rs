use std::collections::VecDeque;

pub struct Task<T> {
    pub id: u64,
    /// Tick at which the task was queued.
    pub tick: u64,
    pub kind: T,
}

/// FIFO of deferred work drained a fixed slice per tick.
pub struct TaskQueue<T> {
    pending: VecDeque<Task<T>>,
    slice: usize,
    pub now: u64,
    next_id: u64,
}

impl<T> TaskQueue<T> {
    pub fn new(slice: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            slice: slice.max(1),
            now: 0,
            next_id: 1,
        }
    }

    #[inline]
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn push(&mut self, kind: T) -> u64 {
        let id = self.alloc_id();
        self.pending.push_back(Task {
            id,
            tick: self.now,
            kind,
        });
        id
    }

    /// Removes up to one slice of tasks and advances the tick counter.
    pub fn take_slice(&mut self) -> Vec<Task<T>> {
        let n = self.slice.min(self.pending.len());
        let out = self.pending.drain(..n).collect();
        self.now += 1;
        out
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.pending.retain(|t| keep(&t.kind));
    }

    pub fn slice(&self) -> usize {
        self.slice
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_slices_in_order() {
        let mut q = TaskQueue::new(2);
        for i in 0..5 {
            q.push(i);
        }
        let a: Vec<_> = q.take_slice().into_iter().map(|t| t.kind).collect();
        let b: Vec<_> = q.take_slice().into_iter().map(|t| t.kind).collect();
        let c: Vec<_> = q.take_slice().into_iter().map(|t| t.kind).collect();
        assert_eq!((a, b, c), (vec![0, 1], vec![2, 3], vec![4]));
        assert!(q.is_empty());
        assert_eq!(q.now, 3);
        assert!(q.take_slice().is_empty());
    }

    #[test]
    fn tasks_remember_their_tick() {
        let mut q = TaskQueue::new(1);
        let first = q.push("a");
        q.take_slice();
        let second = q.push("b");
        assert!(second > first);
        let t = q.take_slice().pop().unwrap();
        assert_eq!((t.id, t.tick, t.kind), (second, 1, "b"));
    }

    #[test]
    fn zero_slice_still_progresses() {
        let mut q = TaskQueue::new(0);
        q.push(());
        q.retain(|_| true);
        assert_eq!(q.slice(), 1);
        assert_eq!(q.take_slice().len(), 1);
    }
}
