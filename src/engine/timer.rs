use crate::engine::CancelToken;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Measures how long the current question has been on screen.
#[derive(Debug, Default)]
pub struct QuestionTimer {
    started_at: Option<Instant>,
}

impl QuestionTimer {
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stops the timer and returns the elapsed seconds, 0 if it was never started.
    pub fn stop(&mut self) -> f64 {
        self.started_at
            .take()
            .map_or(0.0, |started| started.elapsed().as_secs_f64())
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |started| started.elapsed())
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}

/// Calls `on_tick` with the elapsed time every `period` until `cancel` fires.
pub fn spawn_ticker<F, Fut>(period: Duration, cancel: CancelToken, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut(Duration) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticks.tick().await;
        let mut count: u32 = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("Ticker stopped after {} ticks", count);
                    break;
                }
                _ = ticks.tick() => {
                    count += 1;
                    on_tick(period * count).await;
                }
            }
        }
    })
}
