//! Bounded command and result queues
//!
//! Both directions hold at most `QUEUE_DEPTH` items. Senders suspend while a
//! queue is full; nothing is ever dropped or reported as overflow.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use super::descriptor::WorkDescriptor;
use crate::sensor::SensorResult;

/// Capacity of each queue
pub const QUEUE_DEPTH: usize = 2;

/// Owner of the two queues
///
/// `split` hands out exactly one endpoint per side, so each queue has a
/// single producer and a single consumer. With `CriticalSectionRawMutex`
/// the endpoints may live on different cores.
pub struct Dispatcher<M: RawMutex> {
    commands: Channel<M, WorkDescriptor, QUEUE_DEPTH>,
    results: Channel<M, SensorResult, QUEUE_DEPTH>,
}

impl<M: RawMutex> Default for Dispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Dispatcher<M> {
    /// Create a dispatcher with both queues empty
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            results: Channel::new(),
        }
    }

    /// Split into the requester and worker endpoints
    pub fn split(&mut self) -> (Requester<'_, M>, WorkerLink<'_, M>) {
        let this: &Self = self;
        (
            Requester {
                commands: this.commands.sender(),
                results: this.results.receiver(),
            },
            WorkerLink {
                commands: this.commands.receiver(),
                results: this.results.sender(),
            },
        )
    }
}

/// Display-side endpoint: sends work, collects results
pub struct Requester<'a, M: RawMutex> {
    commands: Sender<'a, M, WorkDescriptor, QUEUE_DEPTH>,
    results: Receiver<'a, M, SensorResult, QUEUE_DEPTH>,
}

impl<'a, M: RawMutex> Requester<'a, M> {
    /// Queue a descriptor, waiting while the command queue is full
    pub async fn request(&self, descriptor: WorkDescriptor) {
        self.commands.send(descriptor).await;
    }

    /// Take the oldest result, if one is waiting
    pub fn poll_result(&self) -> Option<SensorResult> {
        self.results.try_receive().ok()
    }
}

/// Sensor-side endpoint: receives work, returns results
pub struct WorkerLink<'a, M: RawMutex> {
    commands: Receiver<'a, M, WorkDescriptor, QUEUE_DEPTH>,
    results: Sender<'a, M, SensorResult, QUEUE_DEPTH>,
}

impl<'a, M: RawMutex> WorkerLink<'a, M> {
    /// Wait for the next descriptor
    pub async fn receive(&self) -> WorkDescriptor {
        self.commands.receive().await
    }

    /// Return a result, waiting while the result queue is full
    pub async fn deliver(&self, result: SensorResult) {
        self.results.send(result).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::descriptor::SessionHandle;
    use core::pin::pin;
    use embassy_futures::{block_on, poll_once};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    fn reading(n: u8) -> SensorResult {
        SensorResult::ok(n as f32, 100_000.0, 40.0)
    }

    #[test]
    fn test_results_are_fifo() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();

        assert!(requester.poll_result().is_none());

        block_on(link.deliver(reading(1)));
        block_on(link.deliver(reading(2)));

        assert_eq!(requester.poll_result(), Some(reading(1)));
        assert_eq!(requester.poll_result(), Some(reading(2)));
        assert!(requester.poll_result().is_none());
    }

    #[test]
    fn test_third_request_waits_for_space() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let first = WorkDescriptor::read_sensor(SessionHandle::new(0));
        let second = WorkDescriptor::read_sensor(SessionHandle::new(1));
        let third = WorkDescriptor::read_sensor(SessionHandle::new(2));

        block_on(requester.request(first));
        block_on(requester.request(second));

        let mut pending = pin!(requester.request(third));
        assert!(poll_once(pending.as_mut()).is_pending());
        // Still pending, nothing was dropped or overwritten
        assert!(poll_once(pending.as_mut()).is_pending());

        assert_eq!(block_on(link.receive()), first);
        assert!(poll_once(pending.as_mut()).is_ready());

        assert_eq!(block_on(link.receive()), second);
        assert_eq!(block_on(link.receive()), third);
    }

    #[test]
    fn test_third_delivery_waits_for_space() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();

        block_on(link.deliver(reading(1)));
        block_on(link.deliver(reading(2)));

        let mut pending = pin!(link.deliver(reading(3)));
        assert!(poll_once(pending.as_mut()).is_pending());

        assert_eq!(requester.poll_result(), Some(reading(1)));
        assert!(poll_once(pending.as_mut()).is_ready());

        assert_eq!(requester.poll_result(), Some(reading(2)));
        assert_eq!(requester.poll_result(), Some(reading(3)));
    }
}
