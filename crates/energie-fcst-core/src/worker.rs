//! Background execution of forecast requests.
//!
//! Each request runs on its own thread so the caller can stay responsive
//! and give up after a deadline. A worker that misses its deadline keeps
//! running until it finishes, but its result is dropped.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::repository::SeriesRepository;
use crate::request::{run_request, ForecastRequest, ForecastResponse};

/// Pending result of a request started with [`spawn_forecast`].
#[derive(Debug)]
pub struct ForecastHandle {
    request: ForecastRequest,
    receiver: Receiver<Result<ForecastResponse>>,
}

/// Start `request` on a background thread.
pub fn spawn_forecast(
    repo: Arc<SeriesRepository>,
    engine: ForecastEngine,
    request: ForecastRequest,
) -> ForecastHandle {
    let (sender, receiver) = mpsc::channel();
    let job = request.clone();

    thread::spawn(move || {
        let outcome = run_request(&repo, &engine, &job);
        // The handle may already be gone after a timeout
        let _ = sender.send(outcome);
    });

    ForecastHandle { request, receiver }
}

impl ForecastHandle {
    pub fn request(&self) -> &ForecastRequest {
        &self.request
    }

    /// Wait at most `timeout` for the response.
    pub fn wait(self, timeout: Duration) -> Result<ForecastResponse> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    region = %self.request.region,
                    timeout_ms = timeout.as_millis() as u64,
                    "Forecast timed out; discarding worker"
                );
                Err(ForecastError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ForecastError::WorkerLost),
        }
    }

    /// Block until the response is available.
    pub fn join(self) -> Result<ForecastResponse> {
        self.receiver
            .recv()
            .map_err(|_| ForecastError::WorkerLost)?
    }
}
