//! Demand multiplexer
//!
//! Collapses registry churn into a deduplicated, sorted key set. The first
//! change after a quiet window is emitted right away; changes arriving while a
//! window is open are collected and emitted together when the window closes.
//! Windows are fixed: later changes never extend them.
//!
//! The multiplexer is a pure state machine driven by the engine loop with an
//! explicit clock, so it can be tested without a runtime.

use std::time::Duration;
use tokio::time::Instant;

/// Deduplicated, sorted set of demanded keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandSet<K> {
    keys: Vec<K>,
}

impl<K> Default for DemandSet<K> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<K: Ord> DemandSet<K> {
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();
        Self { keys }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.binary_search(key).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }
}

impl<K: Ord> FromIterator<K> for DemandSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

/// First-then-debounce multiplexer over successive registry snapshots
#[derive(Debug)]
pub struct DemandMultiplexer<K> {
    window: Duration,
    current: DemandSet<K>,
    pending: Option<DemandSet<K>>,
    window_end: Option<Instant>,
}

impl<K: Ord + Clone> DemandMultiplexer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            current: DemandSet::default(),
            pending: None,
            window_end: None,
        }
    }

    /// Last emitted demand
    pub fn current(&self) -> &DemandSet<K> {
        &self.current
    }

    /// Feed the latest registered keys (with repeats); returns a new demand
    /// set if it must be applied now
    pub fn offer(&mut self, keys: impl IntoIterator<Item = K>, now: Instant) -> Option<DemandSet<K>> {
        let next = DemandSet::from_keys(keys);

        if let Some(end) = self.window_end {
            if now < end {
                self.pending = Some(next);
                return None;
            }
        }

        self.pending = None;
        self.window_end = None;
        self.emit(next, now)
    }

    /// When the engine must call [`flush`](Self::flush), if anything is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.window_end)
    }

    /// Emit the collected change once the window has closed
    pub fn flush(&mut self, now: Instant) -> Option<DemandSet<K>> {
        match self.window_end {
            Some(end) if now >= end => {}
            _ => return None,
        }
        self.window_end = None;
        let next = self.pending.take()?;
        self.emit(next, now)
    }

    fn emit(&mut self, next: DemandSet<K>, now: Instant) -> Option<DemandSet<K>> {
        if next == self.current {
            return None;
        }
        self.current = next.clone();
        self.window_end = Some(now + self.window);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    fn ms(start: Instant, offset: u64) -> Instant {
        start + Duration::from_millis(offset)
    }

    #[test]
    fn test_demand_set_sorts_and_dedupes() {
        let set = DemandSet::from_keys(vec!["b", "a", "b", "c", "a"]);
        assert_eq!(set.as_slice(), &["a", "b", "c"]);
        assert!(set.contains(&"c"));
        assert!(!set.contains(&"d"));
    }

    #[test]
    fn test_first_change_emits_immediately() {
        let start = Instant::now();
        let mut mux = DemandMultiplexer::new(WINDOW);

        let emitted = mux.offer(vec![2, 1, 2], start).unwrap();
        assert_eq!(emitted.as_slice(), &[1, 2]);
        assert_eq!(mux.deadline(), None);

        // Same set again is not a change
        assert_eq!(mux.offer(vec![1, 2], ms(start, 500)), None);
    }

    #[test]
    fn test_changes_inside_window_are_collected() {
        let start = Instant::now();
        let mut mux = DemandMultiplexer::new(WINDOW);
        mux.offer(vec![1], start);

        assert_eq!(mux.offer(vec![1, 2], ms(start, 10)), None);
        assert_eq!(mux.offer(vec![1, 2, 3], ms(start, 90)), None);
        // Window is fixed at the first emission, not extended by later changes
        assert_eq!(mux.deadline(), Some(ms(start, 100)));

        assert_eq!(mux.flush(ms(start, 99)), None);
        let emitted = mux.flush(ms(start, 100)).unwrap();
        assert_eq!(emitted.as_slice(), &[1, 2, 3]);

        // Trailing emission opens a new window
        assert_eq!(mux.offer(vec![1], ms(start, 150)), None);
        assert_eq!(mux.deadline(), Some(ms(start, 200)));
    }

    #[test]
    fn test_register_then_unregister_inside_window_is_silent() {
        let start = Instant::now();
        let mut mux = DemandMultiplexer::new(WINDOW);
        mux.offer(vec!["dot"], start);

        assert_eq!(mux.offer(vec!["dot", "ksm"], ms(start, 20)), None);
        assert_eq!(mux.offer(vec!["dot"], ms(start, 40)), None);
        assert_eq!(mux.flush(ms(start, 100)), None);
        assert_eq!(mux.current().as_slice(), &["dot"]);

        // Quiet again: the next change is immediate
        assert!(mux.offer(Vec::<&str>::new(), ms(start, 130)).is_some());
    }
}
