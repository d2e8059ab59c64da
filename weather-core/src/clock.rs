//! Ticking wall clock shown in the dashboard header.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

/// Background task refreshing a formatted time once per second.
///
/// The task is aborted when the clock is dropped.
#[derive(Debug)]
pub struct Clock {
    tz: Tz,
    rx: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl Clock {
    /// Start ticking. Must be called from within a tokio runtime.
    pub fn start(tz: Tz) -> Self {
        let (tx, rx) = watch::channel(format_clock(Utc::now(), tz));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(format_clock(Utc::now(), tz)).is_err() {
                    break;
                }
            }
        });

        Self { tz, rx, task }
    }

    pub fn now(&self) -> String {
        self.rx.borrow().clone()
    }

    /// Zone abbreviation for the current instant, e.g. "IST".
    pub fn zone_label(&self) -> String {
        Utc::now().with_timezone(&self.tz).format("%Z").to_string()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 12-hour time with seconds, e.g. "03:07:09 PM".
pub fn format_clock(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_requested_zone() {
        let noon_utc = DateTime::<Utc>::from_timestamp(1_714_564_800, 0).unwrap(); // 2024-05-01 12:00 UTC

        assert_eq!(format_clock(noon_utc, chrono_tz::Asia::Kolkata), "05:30:00 PM");
        assert_eq!(format_clock(noon_utc, chrono_tz::UTC), "12:00:00 PM");
    }

    #[tokio::test]
    async fn dropping_clock_stops_the_timer() {
        let clock = Clock::start(chrono_tz::Asia::Kolkata);
        let mut rx = clock.subscribe();
        assert!(clock.now().ends_with("AM") || clock.now().ends_with("PM"));
        assert_eq!(clock.zone_label(), "IST");

        drop(clock);

        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "clock task kept running after drop");
    }
}
