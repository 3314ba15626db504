//! Request queue of pending orders.
//!
//! A binary min-heap ordered by (priority, arrival time, insertion order),
//! with a side index from order id to heap slot so that any order can be
//! pulled out when it is bundled into a flight.

use std::collections::HashMap;

use crate::error::{DispatchError, Result};
use crate::models::{Order, OrderId, Priority};

#[derive(Debug, Clone)]
struct QueuedOrder {
    order: Order,
    seq: u64,
}

impl QueuedOrder {
    fn key(&self) -> (u8, u32, u64) {
        (self.order.priority.rank(), self.order.time, self.seq)
    }
}

/// Count of pending orders per priority class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub emergency: usize,
    pub resupply: usize,
}

/// Priority queue of orders waiting for a flight.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    heap: Vec<QueuedOrder>,
    positions: HashMap<OrderId, usize>,
    next_seq: u64,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.positions.contains_key(&id)
    }

    /// The order that would be dequeued next.
    pub fn peek(&self) -> Option<&Order> {
        self.heap.first().map(|entry| &entry.order)
    }

    /// Insert an order. Fails if an order with the same id is already queued.
    pub fn enqueue(&mut self, order: Order) -> Result<()> {
        if self.contains(order.id) {
            return Err(DispatchError::DuplicateOrder { order_id: order.id });
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let idx = self.heap.len();
        self.positions.insert(order.id, idx);
        self.heap.push(QueuedOrder { order, seq });
        self.sift_up(idx);
        Ok(())
    }

    /// Remove and return the highest-priority order.
    pub fn dequeue_highest(&mut self) -> Option<Order> {
        if self.heap.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Remove a specific order wherever it sits in the heap.
    pub fn remove_by_id(&mut self, id: OrderId) -> Option<Order> {
        let idx = *self.positions.get(&id)?;
        Some(self.remove_at(idx))
    }

    /// Ordered copy of the pending orders, highest priority first.
    pub fn snapshot(&self) -> Vec<Order> {
        let mut entries: Vec<&QueuedOrder> = self.heap.iter().collect();
        entries.sort_by_key(|entry| entry.key());
        entries.into_iter().map(|entry| entry.order.clone()).collect()
    }

    pub fn pending_counts(&self) -> PendingCounts {
        self.heap
            .iter()
            .fold(PendingCounts::default(), |mut counts, entry| {
                match entry.order.priority {
                    Priority::Emergency => counts.emergency += 1,
                    Priority::Resupply => counts.resupply += 1,
                }
                counts
            })
    }

    fn remove_at(&mut self, idx: usize) -> Order {
        let removed = self.heap.swap_remove(idx);
        self.positions.remove(&removed.order.id);

        // The former last element now sits at `idx` and may belong above or below it.
        if idx < self.heap.len() {
            self.positions.insert(self.heap[idx].order.id, idx);
            let idx = self.sift_up(idx);
            self.sift_down(idx);
        }

        removed.order
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        self.heap[a].key() < self.heap[b].key()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].order.id, a);
        self.positions.insert(self.heap[b].order.id, b);
    }

    fn sift_up(&mut self, mut idx: usize) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.precedes(idx, parent) {
                break;
            }
            self.swap(idx, parent);
            idx = parent;
        }
        idx
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut best = idx;

            if left < len && self.precedes(left, best) {
                best = left;
            }
            if right < len && self.precedes(right, best) {
                best = right;
            }
            if best == idx {
                break;
            }
            self.swap(idx, best);
            idx = best;
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        for idx in 1..self.heap.len() {
            let parent = (idx - 1) / 2;
            assert!(
                !self.precedes(idx, parent),
                "heap order violated at slot {idx}"
            );
        }
        assert_eq!(self.positions.len(), self.heap.len());
        for (id, &idx) in &self.positions {
            assert_eq!(self.heap[idx].order.id, *id, "stale index for {id}");
        }
    }
}
