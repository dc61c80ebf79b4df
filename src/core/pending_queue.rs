//! Multi-producer FIFO of accepted tasks.
//!
//! Backed by an unbounded `crossbeam_channel`: any number of producers hold
//! the sender side concurrently, and the single active worker pops from the
//! receiver without blocking.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use super::work_item::QueuedTask;

/// Pending tasks in insertion order.
///
/// The queue owns both channel halves, so it can never observe a
/// disconnected channel while it is alive.
pub(crate) struct PendingQueue {
    tx: Sender<QueuedTask>,
    rx: Receiver<QueuedTask>,
}

impl PendingQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Append a task to the tail.
    pub fn push(&self, task: QueuedTask) {
        // Both halves live in `self`, so the channel cannot be disconnected.
        if let Err(err) = self.tx.send(task) {
            unreachable!("pending queue disconnected while owned: task {}", err.0.id);
        }
    }

    /// Remove the head task, or `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<QueuedTask> {
        match self.rx.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn task(id: u64) -> QueuedTask {
        QueuedTask {
            id,
            job: Box::new(|| Ok(())),
        }
    }

    #[test]
    fn test_fifo_order() {
        let q = PendingQueue::new();
        for id in 0..5 {
            q.push(task(id));
        }
        assert_eq!(q.len(), 5);

        let popped: Vec<u64> = std::iter::from_fn(|| q.try_pop().map(|t| t.id)).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_empty_queue() {
        let q = PendingQueue::new();
        assert!(q.try_pop().is_none());
        assert_eq!(q.len(), 0);
        assert!(q.is_empty());
    }

    #[test]
    fn test_concurrent_producers_keep_per_producer_order() {
        const PRODUCERS: u64 = 8;
        const PER_PRODUCER: u64 = 500;

        let q = Arc::new(PendingQueue::new());
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        q.push(task(p * PER_PRODUCER + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut last_seen = vec![None::<u64>; PRODUCERS as usize];
        let mut total = 0;
        while let Some(t) = q.try_pop() {
            let producer = (t.id / PER_PRODUCER) as usize;
            if let Some(prev) = last_seen[producer] {
                assert!(t.id > prev, "producer {producer} reordered: {prev} then {}", t.id);
            }
            last_seen[producer] = Some(t.id);
            total += 1;
        }
        assert_eq!(total, PRODUCERS * PER_PRODUCER);
    }
}
