//! Sensor-side worker loop
//!
//! The worker owns the sensor sessions. Each descriptor it receives names
//! one session by handle; the read runs synchronously and only `Ok`
//! readings travel back to the requester.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use super::descriptor::{Operation, SessionHandle};
use super::queue::WorkerLink;
use crate::config::PacingConfig;
use crate::sensor::{InitError, SensorResult, StatusCode};
use crate::traits::SensorSession;

/// Maximum sessions one worker holds
pub const MAX_SESSIONS: usize = 2;

/// A sensor session as seen by the worker
///
/// A session whose init failed stays attached so its handle keeps
/// answering, always with the init failure status.
#[derive(Debug)]
pub enum Session<S> {
    Ready(S),
    Failed(InitError),
}

impl<S> From<Result<S, InitError>> for Session<S> {
    fn from(init: Result<S, InitError>) -> Self {
        match init {
            Ok(sensor) => Session::Ready(sensor),
            Err(e) => Session::Failed(e),
        }
    }
}

/// What happened to one descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkOutcome {
    /// Reading forwarded to the requester
    Delivered(SensorResult),
    /// Read failed; nothing was forwarded
    Dropped(StatusCode),
}

/// Worker error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerError {
    /// All session slots are taken
    SessionsFull,
}

/// Executes descriptors against the sessions it owns
pub struct Worker<'a, M: RawMutex, S> {
    link: WorkerLink<'a, M>,
    sessions: Vec<Session<S>, MAX_SESSIONS>,
    pacing: PacingConfig,
}

impl<'a, M: RawMutex, S: SensorSession> Worker<'a, M, S> {
    /// Create a worker with no sessions
    pub fn new(link: WorkerLink<'a, M>, pacing: PacingConfig) -> Self {
        Self {
            link,
            sessions: Vec::new(),
            pacing,
        }
    }

    /// Take ownership of a session and return its handle
    pub fn attach(&mut self, session: Session<S>) -> Result<SessionHandle, WorkerError> {
        let index = self.sessions.len() as u8;
        self.sessions
            .push(session)
            .map_err(|_| WorkerError::SessionsFull)?;
        Ok(SessionHandle::new(index))
    }

    /// Number of attached sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Run one operation right away
    pub fn execute(&mut self, operation: Operation) -> SensorResult {
        match operation {
            Operation::ReadSensor(handle) => match self.sessions.get_mut(handle.index() as usize) {
                Some(Session::Ready(sensor)) => sensor.read_measurement(),
                Some(Session::Failed(e)) => SensorResult::failed(e.status()),
                None => SensorResult::failed(StatusCode::InitInvalidType),
            },
        }
    }

    /// Serve one descriptor
    ///
    /// Settles, waits for a descriptor, gives the conversion time to finish,
    /// then reads. An `Ok` reading is forwarded (waiting while the result
    /// queue is full) and followed by another settle; any other status is
    /// dropped. `MeasurementNotReady` additionally backs off.
    pub async fn serve_one<D: DelayNs>(&mut self, delay: &mut D) -> WorkOutcome {
        delay.delay_ms(self.pacing.post_read_settle_delay_ms).await;

        let descriptor = self.link.receive().await;

        delay.delay_ms(self.pacing.conversion_wait_ms).await;

        let result = self.execute(descriptor.operation);

        match result.status {
            StatusCode::Ok => {
                self.link.deliver(result).await;
                delay.delay_ms(self.pacing.post_read_settle_delay_ms).await;
                WorkOutcome::Delivered(result)
            }
            StatusCode::MeasurementNotReady => {
                delay.delay_ms(self.pacing.not_ready_backoff_ms).await;
                WorkOutcome::Dropped(result.status)
            }
            status => WorkOutcome::Dropped(status),
        }
    }
}
