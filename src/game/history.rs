use std::collections::VecDeque;

/// Number of crash points kept by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Bounded record of settled crash points, most recent first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    entries: VecDeque<f64>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a crash point, evicting the oldest entries beyond capacity
    pub fn record(&mut self, crash_point: f64) {
        self.entries.push_front(crash_point);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<f64> {
        self.entries.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<f64> {
        self.entries.front().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
