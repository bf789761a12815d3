//! Shared tick fan-out that synchronizes sampling across collectors.
//!
//! One producer publishes periodic ticks; each collector holds its own
//! `TickReceiver` and blocks on it between sampling cycles. Every
//! subscriber has a single buffered tick slot: if a subscriber is still
//! busy with the previous cycle when the next tick fires, that tick is
//! coalesced (dropped for that subscriber only). The publisher is never
//! back-pressured.
//!
//! Dropping the `Ticker` disconnects all subscribers; a blocked `recv`
//! returns `None` and the collection loop exits cleanly. This is the
//! shutdown path.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use tracing::debug;

/// Tick publisher. One per process, shared across all collectors.
#[derive(Debug, Default)]
pub struct Ticker {
    subscribers: Vec<SyncSender<()>>,
}

impl Ticker {
    /// Creates a ticker with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    ///
    /// Must be called before the sampling loop that drives `tick` starts;
    /// subscribers added later simply miss earlier ticks.
    pub fn subscribe(&mut self) -> TickReceiver {
        let (tx, rx) = sync_channel(1);
        self.subscribers.push(tx);
        TickReceiver { rx }
    }

    /// Publishes one tick to every live subscriber.
    ///
    /// Returns the number of subscribers that actually received it.
    /// Subscribers whose slot is still full miss this tick; subscribers
    /// that went away are forgotten.
    pub fn tick(&mut self) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|tx| match tx.try_send(()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(())) => {
                debug!("subscriber busy, tick coalesced");
                true
            }
            Err(TrySendError::Disconnected(())) => false,
        });
        delivered
    }

    /// Number of live subscribers as of the last tick.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// A collector's end of the trigger signal.
#[derive(Debug)]
pub struct TickReceiver {
    rx: Receiver<()>,
}

impl TickReceiver {
    /// Blocks until the next tick, or returns `None` once the ticker has
    /// been dropped.
    pub fn recv(&self) -> Option<()> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reaches_all_subscribers() {
        let mut ticker = Ticker::new();
        let a = ticker.subscribe();
        let b = ticker.subscribe();

        assert_eq!(ticker.tick(), 2);
        assert_eq!(a.recv(), Some(()));
        assert_eq!(b.recv(), Some(()));
    }

    #[test]
    fn slow_subscriber_coalesces_ticks() {
        let mut ticker = Ticker::new();
        let rx = ticker.subscribe();

        // Slot holds one tick; the second is dropped for this subscriber.
        assert_eq!(ticker.tick(), 1);
        assert_eq!(ticker.tick(), 0);

        assert_eq!(rx.recv(), Some(()));
        // After draining, delivery resumes.
        assert_eq!(ticker.tick(), 1);
        assert_eq!(rx.recv(), Some(()));
    }

    #[test]
    fn dropped_ticker_disconnects_receiver() {
        let mut ticker = Ticker::new();
        let rx = ticker.subscribe();
        ticker.tick();
        drop(ticker);

        // Buffered tick is still delivered, then the channel reports closed.
        assert_eq!(rx.recv(), Some(()));
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn dropped_receiver_is_forgotten() {
        let mut ticker = Ticker::new();
        let rx = ticker.subscribe();
        drop(rx);

        assert_eq!(ticker.tick(), 0);
        assert_eq!(ticker.subscriber_count(), 0);
    }
}
