//! Freshness buffer
//!
//! Single-slot hand-off between one acquisition loop and the compositor.
//! A value sitting in the slot is never displaced: publishing into a full
//! slot drops the new value.

use async_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

/// Create a capacity-1 freshness buffer
pub fn freshness_buffer<T>() -> (FreshnessSender<T>, FreshnessReceiver<T>) {
    let (tx, rx) = bounded(1);
    (FreshnessSender { tx }, FreshnessReceiver { rx })
}

/// Producer half, owned by the acquisition loop
#[derive(Debug)]
pub struct FreshnessSender<T> {
    tx: Sender<T>,
}

impl<T> FreshnessSender<T> {
    /// Publish without blocking
    ///
    /// Returns `false` and drops `value` when the slot is occupied or the
    /// consumer is gone.
    pub fn try_publish(&self, value: T) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    /// The consumer half was dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the compositor
#[derive(Debug)]
pub struct FreshnessReceiver<T> {
    rx: Receiver<T>,
}

impl<T> FreshnessReceiver<T> {
    /// Take the pending value without blocking, emptying the slot
    pub fn try_take(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Take up to `max_takes` values and keep only the last one
    ///
    /// Never blocks and never spins past the cap, whatever the producer rate.
    pub fn drain_latest(&self, max_takes: usize) -> Option<T> {
        let mut latest = None;
        for _ in 0..max_takes {
            match self.try_take() {
                Some(value) => latest = Some(value),
                None => break,
            }
        }
        latest
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_publish_into_empty() {
        let (tx, rx) = freshness_buffer();
        assert!(tx.try_publish(1));
        assert!(tx.is_full());
        assert_eq!(rx.try_take(), Some(1));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_full_slot_keeps_oldest() {
        let (tx, rx) = freshness_buffer();
        assert!(tx.try_publish(1));
        assert!(!tx.try_publish(2));
        assert!(!tx.try_publish(3));
        assert_eq!(rx.try_take(), Some(1));
        assert_eq!(rx.try_take(), None);
    }

    #[test]
    fn test_take_empty() {
        let (_tx, rx) = freshness_buffer::<u32>();
        assert_eq!(rx.try_take(), None);
        assert_eq!(rx.drain_latest(4), None);
    }

    #[test]
    fn test_publish_after_consumer_dropped() {
        let (tx, rx) = freshness_buffer();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.try_publish(5));
    }

    #[test]
    fn test_drain_respects_cap() {
        let (tx, rx) = freshness_buffer();
        tx.try_publish(10);
        assert_eq!(rx.drain_latest(0), None);
        assert_eq!(rx.drain_latest(3), Some(10));
    }

    /// Random publish/take sequences checked against a one-slot model
    #[test]
    fn test_random_sequences_match_model() {
        let mut rng = rand::rng();

        for _ in 0..200 {
            let (tx, rx) = freshness_buffer();
            let mut model: Option<u32> = None;

            for step in 0..64u32 {
                if rng.random_bool(0.5) {
                    let accepted = tx.try_publish(step);
                    assert_eq!(accepted, model.is_none());
                    if accepted {
                        model = Some(step);
                    }
                } else {
                    assert_eq!(rx.try_take(), model.take());
                }
            }
        }
    }
}
