//! Display-side loop
//!
//! Once per tick the loop either renders the oldest reading waiting in the
//! result queue, or, when none is waiting, re-issues its work request and
//! draws the fault line on top of whatever is already on screen. Either
//! way the framebuffer is then presented.

pub mod phase;

pub use phase::{Phase, PhaseEvent};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::PacingConfig;
use crate::dispatch::{Requester, WorkDescriptor};
use crate::display::{render_fault, render_lines, PanelFramebuffer, Readout, RenderRegion};
use crate::traits::DisplayTransport;

/// What one tick put on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// A fresh reading was rendered
    Rendered(Readout),
    /// No reading was available; the request was re-issued
    Faulted,
}

/// Display loop state
///
/// Owns the framebuffer and the display transport; talks to the sensor
/// core only through its [`Requester`].
pub struct DisplayLoop<'a, M: RawMutex, T: DisplayTransport> {
    requester: Requester<'a, M>,
    transport: T,
    framebuffer: PanelFramebuffer,
    region: RenderRegion,
    descriptor: WorkDescriptor,
    pacing: PacingConfig,
    phase: Phase,
}

impl<'a, M: RawMutex, T: DisplayTransport> DisplayLoop<'a, M, T> {
    /// Create a display loop
    ///
    /// `descriptor` is the request sent at startup and re-sent on every
    /// fault; `region` is the panel window presented each tick.
    pub fn new(
        requester: Requester<'a, M>,
        transport: T,
        region: RenderRegion,
        descriptor: WorkDescriptor,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            requester,
            transport,
            framebuffer: PanelFramebuffer::new(),
            region,
            descriptor,
            pacing,
            phase: Phase::Draining,
        }
    }

    /// Blank the panel and send the first request
    pub async fn start(&mut self) -> Result<(), T::Error> {
        self.framebuffer.clear();
        self.transport
            .present(self.framebuffer.as_bytes(), &self.region)
            .await?;
        self.requester.request(self.descriptor).await;
        Ok(())
    }

    /// Run one tick
    ///
    /// A transport error is returned after the loop is back in
    /// [`Phase::Draining`], so the caller can log it and keep ticking.
    pub async fn tick<D: DelayNs>(&mut self, delay: &mut D) -> Result<TickOutcome, T::Error> {
        let readout = self
            .requester
            .poll_result()
            .and_then(|result| Readout::from_result(&result))
            .and_then(|readout| Some((readout, readout.lines().ok()?)));

        let outcome = match readout {
            Some((readout, lines)) => {
                self.framebuffer.clear();
                render_lines(&mut self.framebuffer, &lines);
                self.phase = self.phase.transition(PhaseEvent::ResultRendered);
                TickOutcome::Rendered(readout)
            }
            None => {
                self.phase = self.phase.transition(PhaseEvent::QueueEmpty);
                delay.delay_ms(self.pacing.sensor_retry_delay_ms).await;
                self.requester.request(self.descriptor).await;
                render_fault(&mut self.framebuffer);
                self.phase = self.phase.transition(PhaseEvent::FaultShown);
                TickOutcome::Faulted
            }
        };

        let presented = self
            .transport
            .present(self.framebuffer.as_bytes(), &self.region)
            .await;
        self.phase = self.phase.transition(PhaseEvent::Presented);
        presented?;

        Ok(outcome)
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Framebuffer as last rendered
    pub fn framebuffer(&self) -> &PanelFramebuffer {
        &self.framebuffer
    }

    /// Descriptor this loop issues
    pub fn descriptor(&self) -> WorkDescriptor {
        self.descriptor
    }

    /// Configured tick interval in milliseconds
    pub fn poll_interval_ms(&self) -> u32 {
        self.pacing.poll_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, Session, SessionHandle, WorkOutcome, Worker};
    use crate::display::{write_string, FAULT_LINE};
    use crate::sensor::{InitError, SensorResult, StatusCode};
    use crate::traits::SensorSession;
    use core::pin::pin;
    use embassy_futures::{block_on, poll_once};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    const FRAME_LEN: usize = 1024;

    /// Transport that keeps the last frame it was given
    struct RecordingTransport {
        last_frame: [u8; FRAME_LEN],
        frames: usize,
        fail: bool,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                last_frame: [0xEE; FRAME_LEN],
                frames: 0,
                fail: false,
            }
        }
    }

    #[derive(Debug, PartialEq)]
    struct BusDown;

    impl DisplayTransport for &mut RecordingTransport {
        type Error = BusDown;

        async fn present(&mut self, buffer: &[u8], region: &RenderRegion) -> Result<(), BusDown> {
            if self.fail {
                return Err(BusDown);
            }
            assert_eq!(region.byte_length(), buffer.len());
            self.last_frame.copy_from_slice(buffer);
            self.frames += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits: heapless::Vec<u32, 8>,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            let _ = self.waits.push(ms);
        }
    }

    /// Sensor whose every read fails the same way
    struct FailingSensor(StatusCode);

    impl SensorSession for FailingSensor {
        fn start_measurement(&mut self) -> Result<u32, InitError> {
            Ok(0)
        }

        fn read_measurement(&mut self) -> SensorResult {
            SensorResult::failed(self.0)
        }
    }

    fn descriptor() -> WorkDescriptor {
        WorkDescriptor::read_sensor(SessionHandle::new(0))
    }

    fn region() -> RenderRegion {
        PanelFramebuffer::full_region().unwrap()
    }

    fn standard_frame() -> PanelFramebuffer {
        let mut fb = PanelFramebuffer::new();
        write_string(&mut fb, 0, 10, "Baro: 30.00inHg");
        write_string(&mut fb, 0, 20, "Temp: 68.00F");
        write_string(&mut fb, 0, 30, "Hum: 45.00");
        fb
    }

    #[test]
    fn test_start_blanks_panel_and_requests() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());

        block_on(display.start()).unwrap();
        drop(display);

        assert_eq!(transport.frames, 1);
        assert!(transport.last_frame.iter().all(|&b| b == 0));
        assert_eq!(block_on(link.receive()), descriptor());
    }

    #[test]
    fn test_tick_renders_waiting_result() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(link.deliver(SensorResult::ok(20.0, 101_325.0, 45.0)));
        let outcome = block_on(display.tick(&mut delay)).unwrap();

        let TickOutcome::Rendered(readout) = outcome else {
            panic!("expected a rendered reading, got {:?}", outcome);
        };
        assert_eq!(readout.temperature_f_x100, 6800);
        assert_eq!(display.phase(), Phase::Draining);
        assert_eq!(display.framebuffer(), &standard_frame());
        assert!(delay.waits.is_empty());
        drop(display);

        assert_eq!(transport.frames, 1);
        assert_eq!(&transport.last_frame[..], standard_frame().as_bytes());

        // Rendering does not issue another request
        let mut next = pin!(link.receive());
        assert!(poll_once(next.as_mut()).is_pending());
    }

    #[test]
    fn test_empty_queue_reissues_and_overlays_fault() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(link.deliver(SensorResult::ok(20.0, 101_325.0, 45.0)));
        block_on(display.tick(&mut delay)).unwrap();

        let outcome = block_on(display.tick(&mut delay)).unwrap();
        assert_eq!(outcome, TickOutcome::Faulted);
        assert_eq!(delay.waits.as_slice(), &[1000]);
        assert_eq!(block_on(link.receive()), descriptor());

        let mut expected = standard_frame();
        write_string(&mut expected, 0, 0, FAULT_LINE);
        assert_eq!(display.framebuffer(), &expected);
        drop(display);

        assert_eq!(transport.frames, 2);
        assert_eq!(&transport.last_frame[..], expected.as_bytes());
    }

    #[test]
    fn test_failed_result_takes_fault_path() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(link.deliver(SensorResult::failed(StatusCode::PressureNotReady)));
        let outcome = block_on(display.tick(&mut delay)).unwrap();

        assert_eq!(outcome, TickOutcome::Faulted);
        assert_eq!(block_on(link.receive()), descriptor());
    }

    #[test]
    fn test_non_finite_reading_takes_fault_path() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(link.deliver(SensorResult::ok(f32::NAN, 101_325.0, 45.0)));
        let outcome = block_on(display.tick(&mut delay)).unwrap();

        assert_eq!(outcome, TickOutcome::Faulted);
        let mut expected = PanelFramebuffer::new();
        write_string(&mut expected, 0, 0, FAULT_LINE);
        assert_eq!(display.framebuffer(), &expected);
    }

    #[test]
    fn test_transport_error_returns_to_draining() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        transport.fail = true;
        let mut display = DisplayLoop::new(requester, &mut transport, region(), descriptor(), PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(link.deliver(SensorResult::ok(20.0, 101_325.0, 45.0)));
        assert_eq!(block_on(display.tick(&mut delay)), Err(BusDown));
        assert_eq!(display.phase(), Phase::Draining);
    }

    #[test]
    fn test_failing_worker_keeps_display_faulting() {
        let mut dispatcher = Dispatcher::<CriticalSectionRawMutex>::new();
        let (requester, link) = dispatcher.split();
        let mut transport = RecordingTransport::new();
        let mut worker = Worker::new(link, PacingConfig::default());
        let handle = worker
            .attach(Session::Ready(FailingSensor(StatusCode::TemperatureNotReady)))
            .unwrap();
        let request = WorkDescriptor::read_sensor(handle);
        let mut display = DisplayLoop::new(requester, &mut transport, region(), request, PacingConfig::default());
        let mut delay = RecordingDelay::default();

        block_on(display.start()).unwrap();
        let first_fault = {
            block_on(worker.serve_one(&mut delay));
            block_on(display.tick(&mut delay)).unwrap();
            display.framebuffer().clone()
        };

        for _ in 0..10 {
            let outcome = block_on(worker.serve_one(&mut delay));
            assert_eq!(outcome, WorkOutcome::Dropped(StatusCode::TemperatureNotReady));

            delay.waits.clear();
            assert_eq!(block_on(display.tick(&mut delay)), Ok(TickOutcome::Faulted));
            assert_eq!(display.descriptor(), request);
            assert_eq!(display.framebuffer(), &first_fault);
        }
    }
}
