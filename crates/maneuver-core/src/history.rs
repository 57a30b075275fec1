//! Fixed-capacity history ring: the oldest sample is evicted on overflow.

use std::collections::VecDeque;

/// Bounded, ordered history of per-frame samples (oldest first).
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Replace the most recent sample. No-op on an empty history.
    pub fn replace_last(&mut self, item: T) {
        if let Some(last) = self.items.back_mut() {
            *last = item;
        }
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The most recent `n` samples (or fewer), oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }
}

impl<T: Copy> History<T> {
    /// Copy of the most recent `n` samples (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> Vec<T> {
        self.tail(n).copied().collect()
    }
}
