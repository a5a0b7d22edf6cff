use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::display::map_properties;
use crate::error::{FetchError, PresentError};
use crate::state::AppState;
use crate::types::{DisplayModel, RemoteProperties};

/// Where readings come from
pub trait ReadingSource: Send + Sync + 'static {
    fn fetch(
        &self,
        base_url: &str,
    ) -> impl Future<Output = Result<RemoteProperties, FetchError>> + Send;
}

/// Where display models go
pub trait DisplaySink: Send + Sync + 'static {
    fn present(&self, model: DisplayModel) -> impl Future<Output = Result<(), PresentError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Presented,
    /// Server answered without a scaled reading; display left as is.
    NoReading,
    FetchFailed,
    PresentFailed,
    /// The previous cycle was still running.
    Skipped,
}

/// Fetch → map → present pipeline driven by a fixed interval.
pub struct Refresher<S, P> {
    state: Arc<AppState>,
    source: S,
    sink: P,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a cycle ends, including on panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ReadingSource, P: DisplaySink> Refresher<S, P> {
    pub fn new(state: Arc<AppState>, source: S, sink: P) -> Self {
        Self {
            state,
            source,
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run a single refresh cycle unless one is already running.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("previous refresh still running, skipping tick");
            return CycleOutcome::Skipped;
        }
        let _guard = InFlight(&self.in_flight);

        let base_url = self.state.nightscout_url().await;
        let props = match self.source.fetch(&base_url).await {
            Ok(props) => props,
            Err(e) => {
                tracing::warn!(url = %base_url, error = %e, "failed to fetch glucose");
                return CycleOutcome::FetchFailed;
            }
        };

        let Some(model) = map_properties(&props) else {
            tracing::debug!("no scaled glucose reading, keeping previous display");
            return CycleOutcome::NoReading;
        };

        tracing::debug!(
            glucose = %model.glucose_value,
            delta = %model.delta_display,
            direction = %model.direction_code,
            "presenting reading"
        );
        match self.sink.present(model).await {
            Ok(()) => CycleOutcome::Presented,
            Err(e) => {
                tracing::warn!(error = %e, "failed to update tray");
                CycleOutcome::PresentFailed
            }
        }
    }

    /// One cycle right away, then one every `period` until the process exits.
    /// Each cycle runs as its own task so a slow fetch never delays the next tick.
    pub async fn run(self: Arc<Self>, period: Duration) {
        tracing::info!(period_ms = period.as_millis() as u64, "starting glucose refresh");
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.run_cycle().await;
            });
        }
    }
}
