//! A keyed buffer of pre-generated content.
//!
//! Each key owns its own queue behind its own lock. A refill holds that
//! lock for the duration of the generative call, so concurrent requests
//! for the same key wait for one refill instead of issuing several, and
//! requests for other keys are not blocked.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

type Queue<T> = Arc<Mutex<VecDeque<T>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pre-generated items, queued per key.
#[derive(Debug)]
pub struct ContentBuffer<K, T> {
    queues: Mutex<HashMap<K, Queue<T>>>,
}

impl<K, T> Default for ContentBuffer<K, T> {
    fn default() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, T> ContentBuffer<K, T> {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, key: &K) -> Queue<T> {
        lock(&self.queues).entry(key.clone()).or_default().clone()
    }

    /// Items waiting under `key`.
    pub fn len(&self, key: &K) -> usize {
        lock(&self.queue(key)).len()
    }

    /// Whether nothing is waiting under `key`.
    pub fn is_empty(&self, key: &K) -> bool {
        self.len(key) == 0
    }

    /// Append items under `key`.
    pub fn push_batch(&self, key: &K, items: impl IntoIterator<Item = T>) {
        lock(&self.queue(key)).extend(items);
    }

    /// Take the next item under `key`, if any.
    pub fn pop(&self, key: &K) -> Option<T> {
        lock(&self.queue(key)).pop_front()
    }

    /// Take the next item under `key` that satisfies `accept`, refilling
    /// the queue once with `refill` if nothing acceptable is waiting.
    ///
    /// Rejected items are discarded. The refill runs while the key's lock is
    /// held. On refill failure the error is returned and the queue is left
    /// empty.
    pub fn pop_or_refill<E>(
        &self,
        key: &K,
        mut accept: impl FnMut(&T) -> bool,
        refill: impl FnOnce() -> Result<Vec<T>, E>,
    ) -> Result<Option<T>, E> {
        let queue = self.queue(key);
        let mut items = lock(&queue);
        if let Some(item) = take_accepted(&mut items, &mut accept) {
            return Ok(Some(item));
        }
        items.extend(refill()?);
        Ok(take_accepted(&mut items, &mut accept))
    }
}

fn take_accepted<T>(items: &mut VecDeque<T>, accept: &mut impl FnMut(&T) -> bool) -> Option<T> {
    while let Some(item) = items.pop_front() {
        if accept(&item) {
            return Some(item);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn pops_in_order_per_key() {
        let buffer = ContentBuffer::new();
        buffer.push_batch(&"a", [1, 2]);
        buffer.push_batch(&"b", [9]);
        assert_eq!(buffer.pop(&"a"), Some(1));
        assert_eq!(buffer.pop(&"b"), Some(9));
        assert_eq!(buffer.len(&"a"), 1);
        assert!(buffer.is_empty(&"b"));
    }

    #[test]
    fn refill_only_when_nothing_acceptable() {
        let buffer = ContentBuffer::new();
        buffer.push_batch(&"k", [1, 2, 3]);
        let got = buffer
            .pop_or_refill(&"k", |n| *n != 1, || Ok::<_, ()>(vec![]))
            .unwrap();
        assert_eq!(got, Some(2));
        let got = buffer
            .pop_or_refill(&"k", |n| *n > 5, || Ok::<_, ()>(vec![4, 7, 8]))
            .unwrap();
        assert_eq!(got, Some(7));
        assert_eq!(buffer.pop(&"k"), Some(8));
    }

    #[test]
    fn refill_error_propagates() {
        let buffer: ContentBuffer<&str, u32> = ContentBuffer::new();
        let result = buffer.pop_or_refill(&"k", |_| true, || Err("down"));
        assert_eq!(result, Err("down"));
    }

    #[test]
    fn concurrent_pops_share_one_refill() {
        let buffer = Arc::new(ContentBuffer::<&str, u32>::new());
        let refills = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                let refills = Arc::clone(&refills);
                thread::spawn(move || {
                    buffer
                        .pop_or_refill(
                            &"hard",
                            |_| true,
                            || {
                                refills.fetch_add(1, Ordering::SeqCst);
                                Ok::<_, ()>((0..20).collect())
                            },
                        )
                        .unwrap()
                })
            })
            .collect();
        let mut got: Vec<u32> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        got.sort_unstable();
        got.dedup();
        assert_eq!(got.len(), 8);
        assert_eq!(refills.load(Ordering::SeqCst), 1);
        assert_eq!(buffer.len(&"hard"), 12);
    }
}
