//! Bounded, oldest-first history

use std::collections::VecDeque;

/// Keeps the most recent `limit` items; pushing past the bound drops the oldest.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    limit: usize,
}

impl<T> History<T> {
    /// A limit of zero keeps nothing.
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.limit == 0 {
            return;
        }
        while self.items.len() >= self.limit {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_limit_keeps_all() {
        let mut history = History::new(5);
        history.push(1);
        history.push(2);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = History::new(3);
        for i in 1..=5 {
            history.push(i);
            assert!(history.len() <= 3);
        }
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.limit(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_new_is_empty() {
        let history: History<String> = History::new(10);
        assert!(history.is_empty());
        assert_eq!(history.limit(), 10);
    }
}
