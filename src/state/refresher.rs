use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::state::messages::NetworkRequest;

const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic live-score poll, every 30 seconds while games are running.
/// Only sends PollLive; the full schedule is loaded separately.
pub struct LivePoller {
    network_requests: mpsc::Sender<NetworkRequest>,
    stop: watch::Receiver<bool>,
}

/// Owning handle for a running poller. Stopping consumes the handle and
/// waits for the loop to wind down, so at most one poller exists.
pub struct LivePollerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LivePollerHandle {
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

impl LivePoller {
    pub fn spawn(network_requests: mpsc::Sender<NetworkRequest>) -> LivePollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let poller = Self {
            network_requests,
            stop: stop_rx,
        };
        LivePollerHandle {
            stop: stop_tx,
            task: tokio::spawn(poller.run()),
        }
    }

    async fn run(mut self) {
        let mut poll_interval = interval(POLL_INTERVAL);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        poll_interval.tick().await;

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {}
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        return;
                    }
                    continue;
                }
            }

            // Re-check at the iteration boundary: a stop that raced the
            // tick must not start another cycle.
            if *self.stop.borrow() {
                return;
            }

            if self
                .network_requests
                .send(NetworkRequest::PollLive)
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polls_on_the_interval_until_stopped() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = LivePoller::spawn(tx);

        tokio::time::advance(POLL_INTERVAL).await;
        assert!(matches!(rx.recv().await, Some(NetworkRequest::PollLive)));

        handle.stop().await;
        tokio::time::advance(POLL_INTERVAL * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn poller_exits_when_the_worker_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        let handle = LivePoller::spawn(tx);
        drop(rx);

        tokio::time::advance(POLL_INTERVAL).await;
        // The send fails against the closed channel and the task ends
        // without needing the stop signal.
        let _ = handle.task.await;
    }
}
