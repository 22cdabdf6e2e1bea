//! The per-worker priority queue.
//!
//! A singly linked list of [`QueuedTask`] nodes protected by a
//! [`SharedLock`], ordered so that for every adjacent pair `(a, b)` either
//! `a.priority > b.priority`, or they're equal and `a` was enqueued first
//! (FIFO within a priority band) — with the exception that `Idle` nodes
//! always land after every non-idle node, in FIFO order among themselves.
//!
//! A linear scan is an acceptable insertion/find cost here: queue depth is
//! bounded by one worker's pending-task count, expected to stay small for
//! the interactive-orchestration workload this crate targets, not bulk
//! data processing. A heap would complicate the FIFO-within-priority
//! invariant for no benefit at this scale.

use crate::sync::SharedLock;
use crate::task::{QueuedTask, TaskId, TaskPriority};

struct Node {
    next: Option<Box<Node>>,
    task: QueuedTask,
}

struct Inner {
    head: Option<Box<Node>>,
    size: usize,
}

pub struct TaskQueue {
    inner: SharedLock<Inner>,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue {
            inner: SharedLock::new(Inner { head: None, size: 0 }),
        }
    }

    /// Observed under the shared lock; may be stale the instant after
    /// return.
    pub fn empty(&self) -> bool {
        self.inner.lock_shared().size == 0
    }

    /// Observed under the shared lock; may be stale the instant after
    /// return.
    pub fn size(&self) -> usize {
        self.inner.lock_shared().size
    }

    /// Inserts `task` preserving the priority + FIFO-within-priority order,
    /// with `Idle` tasks always appended at the tail. Only the linkage
    /// happens under the exclusive lock; the node itself is allocated
    /// beforehand.
    pub fn enqueue(&self, task: QueuedTask) {
        let priority = task.priority;
        let mut new_node = Box::new(Node { next: None, task });

        let mut inner = self.inner.lock();

        if priority == TaskPriority::Idle {
            // Idle tasks never jump ahead of anything, even other idle
            // tasks queued earlier: always append at the tail.
            Self::push_tail(&mut inner.head, new_node);
            inner.size += 1;
            return;
        }

        match &inner.head {
            None => {
                inner.head = Some(new_node);
            }
            Some(head) if head.task.priority < priority => {
                new_node.next = inner.head.take();
                inner.head = Some(new_node);
            }
            Some(_) => {
                // Walk from the head's successor; splice before the first
                // node whose priority is strictly lower than the new task's.
                let mut cursor = &mut inner.head.as_mut().unwrap().next;
                while let Some(node) = cursor {
                    if node.task.priority < priority {
                        break;
                    }
                    cursor = &mut node.next;
                }
                new_node.next = cursor.take();
                *cursor = Some(new_node);
            }
        }

        inner.size += 1;
    }

    fn push_tail(head: &mut Option<Box<Node>>, node: Box<Node>) {
        match head {
            None => *head = Some(node),
            Some(head_node) => {
                let mut cursor = head_node;
                while cursor.next.is_some() {
                    cursor = cursor.next.as_mut().unwrap();
                }
                cursor.next = Some(node);
            }
        }
    }

    /// Pops the head, returning a sentinel task (see
    /// [`QueuedTask::sentinel`]) if the queue was empty. Exclusive lock for
    /// the duration.
    pub fn steal(&self) -> QueuedTask {
        let mut inner = self.inner.lock();
        match inner.head.take() {
            None => QueuedTask::sentinel(),
            Some(mut node) => {
                inner.head = node.next.take();
                inner.size -= 1;
                node.task
            }
        }
    }

    /// Applies `f` to the queued task with the given id, under the shared
    /// lock, if it is still resident in the queue. The closure receives a
    /// reference valid only for its own duration — no reference escapes,
    /// matching the shared-resource wrapper's contract.
    pub fn with_task<F, R>(&self, id: TaskId, f: F) -> Option<R>
    where
        F: FnOnce(&QueuedTask) -> R,
    {
        let inner = self.inner.lock_shared();
        let mut cursor = inner.head.as_deref();
        while let Some(node) = cursor {
            if node.task.id == id {
                return Some(f(&node.task));
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Drops every node under the exclusive lock. Per the crate's chosen
    /// contract (see `DESIGN.md`), cleared tasks simply vanish: a handle
    /// that later looks them up observes `TaskState::None`, not
    /// `Canceled`.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.head = None;
        inner.size = 0;
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::{QueuedTask, TaskId};

    unsafe fn noop(_: *mut u8) {}

    fn task(id: u64, priority: TaskPriority) -> QueuedTask {
        QueuedTask::new(TaskId(id), noop, std::ptr::null_mut(), priority)
    }

    fn order(queue: &TaskQueue) -> Vec<u64> {
        let mut ids = Vec::new();
        loop {
            let t = queue.steal();
            if t.is_sentinel() {
                break;
            }
            ids.push(t.id.0);
        }
        ids
    }

    #[test]
    fn empty_queue_first_insert_is_head_and_tail() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Normal));
        assert_eq!(queue.size(), 1);
        assert_eq!(order(&queue), vec![1]);
    }

    #[test]
    fn fifo_within_priority() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Normal));
        queue.enqueue(task(2, TaskPriority::Normal));
        queue.enqueue(task(3, TaskPriority::Normal));
        assert_eq!(order(&queue), vec![1, 2, 3]);
    }

    #[test]
    fn idle_never_jumps_ahead_of_idle() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Idle));
        queue.enqueue(task(2, TaskPriority::Idle));
        assert_eq!(order(&queue), vec![1, 2]);
    }

    #[test]
    fn real_time_becomes_head_over_idle() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Idle));
        queue.enqueue(task(2, TaskPriority::RealTime));
        assert_eq!(order(&queue), vec![2, 1]);
    }

    #[test]
    fn priority_inversion_scenario() {
        // normal, idle, real_time, above_normal, normal (spec.md scenario 2)
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Normal));
        queue.enqueue(task(2, TaskPriority::Idle));
        queue.enqueue(task(3, TaskPriority::RealTime));
        queue.enqueue(task(4, TaskPriority::AboveNormal));
        queue.enqueue(task(5, TaskPriority::Normal));

        assert_eq!(order(&queue), vec![3, 4, 1, 5, 2]);
    }

    #[test]
    fn find_locates_resident_task() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Normal));
        let found = queue.with_task(TaskId(1), |t| t.priority);
        assert_eq!(found, Some(TaskPriority::Normal));
        assert_eq!(queue.with_task(TaskId(2), |t| t.priority), None);
    }

    #[test]
    fn clear_drops_all_nodes() {
        let queue = TaskQueue::new();
        queue.enqueue(task(1, TaskPriority::Normal));
        queue.enqueue(task(2, TaskPriority::Idle));
        queue.clear();
        assert!(queue.empty());
        assert_eq!(queue.with_task(TaskId(1), |_| ()), None);
    }
}
