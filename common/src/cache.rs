//! A **last-in, first-out** single-producer/multi-consumer cache.
//!
//! Readers of an [`AddressCache`] only ever see the most recently posted value.
//! Values posted while nobody was reading are dropped rather than queued: a
//! reader asking for the current state has no use for a backlog.
//!
//! Internally the cache keeps two physical slots and two monotonic counters.
//! Slot `0` holds the value last handed out by [`AddressCache::get`], slot `1`
//! stages the newest unread post. The difference `writes - reads` selects the
//! slot that is current.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct CacheSlot<T> {
    read_count: u64,
    write_count: u64,
    values: [Option<T>; 2],
}

impl<T> CacheSlot<T> {
    fn pending(&self) -> u64 {
        self.write_count - self.read_count
    }
}

/// Thread-safe cache returning the latest posted value.
///
/// Counters and slots live behind one lock so they can never disagree.
#[derive(Debug)]
pub struct AddressCache<T> {
    slot: Mutex<CacheSlot<T>>,
}

impl<T> Default for AddressCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AddressCache<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(CacheSlot {
                read_count: 0,
                write_count: 0,
                values: [None, None],
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheSlot<T>> {
        // A panicking reader cannot leave the counters half-updated.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `value`, replacing any value that has not been read yet.
    pub fn post(&self, value: T) {
        let mut slot = self.lock();
        let staged = slot.pending() + 1;
        let index = if staged >= 2 { 1 } else { staged as usize };
        slot.values[index] = Some(value);
        slot.write_count += 1;
    }

    /// `true` once anything has been posted and not yet consumed by [`get`](Self::get).
    pub fn is_fresh(&self) -> bool {
        let slot = self.lock();
        slot.write_count > 0 && slot.write_count != slot.read_count
    }

    /// `true` until the first [`post`](Self::post).
    pub fn is_empty(&self) -> bool {
        self.lock().write_count == 0
    }
}

impl<T: Clone> AddressCache<T> {
    /// Returns the current value without consuming it.
    pub fn peek(&self) -> Option<T> {
        let slot = self.lock();
        let index = if slot.pending() > 0 { 1 } else { 0 };
        slot.values[index].clone()
    }

    /// Returns the current value and marks every pending post as read.
    pub fn get(&self) -> Option<T> {
        let mut slot = self.lock();
        if slot.pending() > 0 {
            slot.values[0] = slot.values[1].take();
        }
        slot.read_count = slot.write_count;
        slot.values[0].clone()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    struct Frame {
        seq: u32,
    }

    #[test]
    fn empty_cache_is_neither_fresh_nor_readable() {
        let cache: AddressCache<String> = AddressCache::new();
        assert!(cache.is_empty());
        assert!(!cache.is_fresh());
        assert_eq!(cache.peek(), None);
        assert_eq!(cache.get(), None);
        assert!(!cache.is_fresh());
    }

    #[test]
    fn peek_does_not_consume() {
        let cache: AddressCache<Frame> = AddressCache::new();
        cache.post(Frame { seq: 1 });
        assert!(cache.is_fresh());
        assert!(!cache.is_empty());

        assert_eq!(cache.peek(), Some(Frame { seq: 1 }));
        assert_eq!(cache.peek(), Some(Frame { seq: 1 }));
        assert!(cache.is_fresh());
    }

    #[test]
    fn get_consumes_but_keeps_last_value() {
        let cache: AddressCache<&str> = AddressCache::new();
        cache.post("one");
        assert_eq!(cache.get(), Some("one"));
        assert!(!cache.is_fresh());

        assert_eq!(cache.get(), Some("one"));
        assert_eq!(cache.peek(), Some("one"));
        assert!(!cache.is_fresh());

        cache.post("two");
        assert!(cache.is_fresh());
        assert_eq!(cache.peek(), Some("two"));
        assert!(cache.is_fresh());
        assert_eq!(cache.get(), Some("two"));
        assert!(!cache.is_fresh());
        assert_eq!(cache.get(), Some("two"));
    }

    #[test]
    fn unread_value_is_superseded_by_newer_post() {
        let cache: AddressCache<u32> = AddressCache::new();
        cache.post(2);
        assert_eq!(cache.get(), Some(2));

        cache.post(3);
        cache.post(4);
        assert_eq!(cache.peek(), Some(4));
        assert_eq!(cache.get(), Some(4));
        assert!(!cache.is_fresh());
    }

    #[test]
    fn repeated_posts_before_first_read_keep_only_newest() {
        let cache: AddressCache<u32> = AddressCache::new();
        for value in 0..1_000 {
            cache.post(value);
        }
        assert!(cache.is_fresh());
        assert_eq!(cache.get(), Some(999));
        assert_eq!(cache.lock().values.len(), 2);
    }

    #[test]
    fn concurrent_readers_never_observe_stale_posts() {
        let cache: Arc<AddressCache<u32>> = Arc::new(AddressCache::new());
        let producer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for value in 1..=10_000 {
                    cache.post(value);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let mut last_seen = 0;
                    for _ in 0..10_000 {
                        if let Some(value) = cache.get() {
                            assert!(value >= last_seen, "went back from {last_seen} to {value}");
                            last_seen = value;
                        }
                    }
                })
            })
            .collect();

        producer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(cache.get(), Some(10_000));
        assert!(!cache.is_fresh());
    }
}
