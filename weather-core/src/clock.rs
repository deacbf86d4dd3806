use std::time::Duration;

use chrono::Utc;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::present::{PLACEHOLDER, local_time};

pub const TICK: Duration = Duration::from_secs(1);

/// Publishes the local time of a location on a fixed interval.
///
/// The background task is aborted when the ticker is dropped.
#[derive(Debug)]
pub struct ClockTicker {
    handle: JoinHandle<()>,
    rx: watch::Receiver<String>,
}

impl ClockTicker {
    pub fn spawn(offset_secs: i32, period: Duration) -> Self {
        let (tx, rx) = watch::channel(PLACEHOLDER.to_string());

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(local_time(offset_secs, Utc::now())).is_err() {
                    break;
                }
            }
        });

        Self { handle, rx }
    }

    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    /// Wait for the next tick. `None` once the ticker has stopped.
    pub async fn changed(&mut self) -> Option<String> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looks_like_hh_mm(s: &str) -> bool {
        s.len() == 5 && s.as_bytes()[2] == b':' && s.chars().filter(char::is_ascii_digit).count() == 4
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate() {
        let mut ticker = ClockTicker::spawn(3600, TICK);
        assert_eq!(ticker.current(), "--");

        let first = ticker.changed().await.expect("ticker running");
        assert!(looks_like_hh_mm(&first), "{first}");
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_ticking_on_interval() {
        let mut ticker = ClockTicker::spawn(0, TICK);
        ticker.changed().await.expect("first tick");

        let before = tokio::time::Instant::now();
        ticker.changed().await.expect("second tick");
        assert!(before.elapsed() >= TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_publishing_once_dropped() {
        let ticker = ClockTicker::spawn(0, TICK);
        let mut rx = ticker.subscribe();
        drop(ticker);

        assert!(rx.changed().await.is_err());
    }
}
