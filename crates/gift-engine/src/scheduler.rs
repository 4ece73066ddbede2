//! Deterministic delayed-task queue driven by an explicit clock.
//!
//! Nothing here sleeps. The owner asks for [`TaskQueue::next_deadline`], waits
//! however it likes, then drains due tasks with [`TaskQueue::pop_due`]. A
//! cancelled task is removed from the queue, so it can never be returned even
//! if its deadline has already passed.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};

/// Opaque handle returned by [`TaskQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
pub struct TaskQueue<T> {
    next_id: u64,
    tasks: BTreeMap<(DateTime<Utc>, u64), T>,
    deadlines: HashMap<u64, DateTime<Utc>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            tasks: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to become due at `now + delay`.
    pub fn schedule(&mut self, now: DateTime<Utc>, delay: TimeDelta, payload: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;

        let due_at = now + delay;
        self.tasks.insert((due_at, id), payload);
        self.deadlines.insert(id, due_at);
        TaskHandle(id)
    }

    /// Cancel a task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let Some(due_at) = self.deadlines.remove(&handle.0) else {
            return false;
        };
        self.tasks.remove(&(due_at, handle.0)).is_some()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    pub fn due_at(&self, handle: TaskHandle) -> Option<DateTime<Utc>> {
        self.deadlines.get(&handle.0).copied()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.tasks.keys().next().map(|(due_at, _)| *due_at)
    }

    /// Remove and return every task due at or before `now`, earliest first.
    /// Tasks sharing a deadline come out in scheduling order.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<(TaskHandle, T)> {
        let mut due = Vec::new();
        while let Some(entry) = self.tasks.first_entry() {
            let (due_at, id) = *entry.key();
            if due_at > now {
                break;
            }
            let payload = entry.remove();
            self.deadlines.remove(&id);
            due.push((TaskHandle(id), payload));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
