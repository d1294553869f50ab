//! Cross-core dispatch
//!
//! The display core sends [`WorkDescriptor`]s to the sensor core and polls
//! for [`SensorResult`](crate::sensor::SensorResult)s coming back. The two
//! bounded queues are the only state the cores share.

pub mod descriptor;
pub mod queue;
pub mod worker;

pub use descriptor::{Operation, SessionHandle, WorkDescriptor};
pub use queue::{Dispatcher, Requester, WorkerLink, QUEUE_DEPTH};
pub use worker::{Session, WorkOutcome, Worker, WorkerError, MAX_SESSIONS};
