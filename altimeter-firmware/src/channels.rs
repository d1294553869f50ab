//! Cross-core queues
//!
//! The dispatcher is the only state shared between the cores. It lives in
//! a static cell and is split once at boot: the requester stays on core 0,
//! the worker link moves to core 1.

use altimeter_core::dispatch::Dispatcher;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;

/// Mutex kind for queues shared across cores
///
/// The RP2040 critical section is a hardware spinlock, so it is safe
/// between the two cores.
pub type CoreMutex = CriticalSectionRawMutex;

/// Command and result queues
pub static DISPATCHER: StaticCell<Dispatcher<CoreMutex>> = StaticCell::new();
