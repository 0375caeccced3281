//! Interrupt front-end for the FS20 receive path.
//!
//! The RFM12 demodulates the ASK signal onto a pin. Every level change of that
//! pin raises an external interrupt, and a compare match on the capture
//! counter raises a second one when the line has been quiet for too long. The
//! handlers in this module do the bare minimum in interrupt context: they
//! snapshot the counter and the pin level and hand an [`RxEvent`] to an
//! [`EventSink`].
//!
//! Turning edge timings into FS20/FHT/weather-sensor telegrams is the job of a
//! [`PulseDecoder`], which lives outside this crate.
//!
//! ## Delivery
//!
//! Two sinks are provided:
//!
//! - a `heapless::spsc::Producer<RxEvent, N>`: the interrupt enqueues, the
//!   mainloop drains the matching `Consumer` with [`pump`]. Nothing in the
//!   interrupt path allocates or blocks.
//! - [`Immediate`]: calls the decoder straight from the interrupt, for
//!   decoders that are interrupt-safe.
//!
//! Either way events reach the decoder in the order the hardware raised them.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use ask868::receiver::{pump, EdgeCapture, PulseDecoder, RxEvent};
//! use ask868::timer::TickCounter;
//! use heapless::spsc::Queue;
//!
//! # #[derive(Default)]
//! # struct Counter(u8);
//! # impl TickCounter for Counter {
//! #     fn now(&mut self) -> u8 { self.0 }
//! #     fn set_counter(&mut self, ticks: u8) { self.0 = ticks; }
//! #     fn set_prescaler(&mut self, _: u32) {}
//! #     fn set_free_running(&mut self) {}
//! #     fn set_compare(&mut self, _: u8) {}
//! #     fn clear_compare_flag(&mut self) {}
//! #     fn enable_compare_interrupt(&mut self, _: bool) {}
//! #     fn enable_overflow_interrupt(&mut self, _: bool) {}
//! # }
//! #[derive(Default)]
//! struct Printer;
//!
//! impl PulseDecoder for Printer {
//!     fn on_edge(&mut self, ticks: u8, rising: bool) {
//!         println!("edge at {ticks} ({rising})");
//!     }
//!     fn on_timeout(&mut self) {
//!         println!("quiet");
//!     }
//! }
//!
//! let mut queue: Queue<RxEvent, 16> = Queue::new();
//! let (producer, mut consumer) = queue.split();
//! # let input = Pin::new(&[PinTransaction::get(PinState::High)]);
//! let mut capture: EdgeCapture<Counter, Pin, _, Pin> =
//!     EdgeCapture::new(Counter(17), input, producer, None, 187);
//!
//! capture.on_edge(); // from the pin-change interrupt
//!
//! let mut decoder = Printer;
//! assert_eq!(pump(&mut consumer, &mut decoder), 1); // from the mainloop
//! # capture.input.done();
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};
use heapless::spsc::{Consumer, Producer};

use crate::timer::TickCounter;

/// A receive-side hardware event.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxEvent {
    /// The demodulated signal changed level.
    Edge {
        /// Capture counter value at the edge.
        ticks: u8,
        /// `true` for a low-to-high transition.
        rising: bool,
    },
    /// No edge arrived within the silence window.
    Timeout,
}

impl RxEvent {
    /// Hands the event to the matching decoder entry point.
    pub fn dispatch<D: PulseDecoder>(self, decoder: &mut D) {
        match self {
            RxEvent::Edge { ticks, rising } => decoder.on_edge(ticks, rising),
            RxEvent::Timeout => decoder.on_timeout(),
        }
    }
}

/// The pulse-to-telegram decoder fed by the front-end.
pub trait PulseDecoder {
    /// Called once before the receiver is switched on.
    fn init(&mut self) {}

    /// A signal edge at capture counter value `ticks`.
    fn on_edge(&mut self, ticks: u8, rising: bool);

    /// The line has been quiet past the compare value; drop any partial frame.
    fn on_timeout(&mut self);

    /// Called once per mainloop iteration.
    fn poll(&mut self) {}
}

/// Where the front-end puts events.
pub trait EventSink {
    /// Accepts one event. Returns `false` if it had to be dropped.
    fn push(&mut self, event: RxEvent) -> bool;
}

impl<const N: usize> EventSink for Producer<'_, RxEvent, N> {
    fn push(&mut self, event: RxEvent) -> bool {
        self.enqueue(event).is_ok()
    }
}

/// Delivers events straight to the wrapped decoder, in interrupt context.
#[derive(Debug, Default)]
pub struct Immediate<D: PulseDecoder>(pub D);

impl<D: PulseDecoder> EventSink for Immediate<D> {
    fn push(&mut self, event: RxEvent) -> bool {
        event.dispatch(&mut self.0);
        true
    }
}

/// Edge and timeout interrupt handlers bound to one counter, input pin and sink.
///
/// On every edge the compare register is re-armed `silence` ticks ahead of
/// the snapshot, so a compare match means "no edge for `silence` ticks". The
/// compare interrupt is disarmed after it fires and re-armed by the next edge.
///
/// ## Type Parameters
///
/// - `C`: the capture counter ([`TickCounter`])
/// - `P`: the demodulated data input pin
/// - `S`: the [`EventSink`]
/// - `LED`: optional receive status indicator, mirrors the input level
#[derive(Debug)]
pub struct EdgeCapture<C, P, S, LED>
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    /// Capture counter
    pub counter: C,
    /// Demodulated data input
    pub input: P,
    /// Event sink
    pub sink: S,
    /// Receive status indicator
    pub indicator: Option<LED>,
    silence: u8,
    overruns: u16,
}

impl<C, P, S, LED> EdgeCapture<C, P, S, LED>
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    /// Creates the front-end. `silence` is the edge-free window, in ticks,
    /// after which a timeout is reported; `TimingBase::us_to_ticks(1500)` is
    /// the usual choice. The indicator, if any, starts low.
    pub fn new(counter: C, input: P, sink: S, indicator: Option<LED>, silence: u8) -> Self {
        let mut indicator = indicator;
        if let Some(ref mut led) = indicator {
            let _ = led.set_low();
        }
        Self {
            counter,
            input,
            sink,
            indicator,
            silence,
            overruns: 0,
        }
    }

    /// Pin-change interrupt body.
    pub fn on_edge(&mut self) {
        let ticks = self.counter.now();
        let rising = self.input.is_high().unwrap_or(false);
        if let Some(ref mut led) = self.indicator {
            let _ = if rising { led.set_high() } else { led.set_low() };
        }
        self.counter.set_compare(ticks.wrapping_add(self.silence));
        // matches while disarmed have latched the flag
        self.counter.clear_compare_flag();
        self.counter.enable_compare_interrupt(true);
        self.forward(RxEvent::Edge { ticks, rising });
    }

    /// Compare-match interrupt body.
    pub fn on_timeout(&mut self) {
        self.counter.enable_compare_interrupt(false);
        self.forward(RxEvent::Timeout);
    }

    /// Number of events the sink refused since the last call; resets the count.
    pub fn take_overruns(&mut self) -> u16 {
        core::mem::take(&mut self.overruns)
    }

    /// The edge-free window in ticks.
    pub fn silence(&self) -> u8 {
        self.silence
    }

    fn forward(&mut self, event: RxEvent) {
        if !self.sink.push(event) {
            self.overruns = self.overruns.saturating_add(1);
        }
    }
}

/// Takes the next queued event, or `WouldBlock` if the queue is empty.
pub fn next_event<const N: usize>(
    consumer: &mut Consumer<'_, RxEvent, N>,
) -> nb::Result<RxEvent, Infallible> {
    consumer.dequeue().ok_or(nb::Error::WouldBlock)
}

/// Mainloop side of the queue: feeds every pending event to `decoder` in
/// arrival order, then calls [`PulseDecoder::poll`]. Returns the number of
/// events delivered.
pub fn pump<D: PulseDecoder, const N: usize>(
    consumer: &mut Consumer<'_, RxEvent, N>,
    decoder: &mut D,
) -> usize {
    let mut delivered = 0;
    while let Ok(event) = next_event(consumer) {
        event.dispatch(decoder);
        delivered += 1;
    }
    decoder.poll();
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::testing::SimCounter;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use heapless::spsc::Queue;

    #[derive(Debug, Default)]
    struct RecordingDecoder {
        events: Vec<RxEvent>,
        polls: usize,
        inits: usize,
    }

    impl PulseDecoder for RecordingDecoder {
        fn init(&mut self) {
            self.inits += 1;
        }

        fn on_edge(&mut self, ticks: u8, rising: bool) {
            self.events.push(RxEvent::Edge { ticks, rising });
        }

        fn on_timeout(&mut self) {
            self.events.push(RxEvent::Timeout);
        }

        fn poll(&mut self) {
            self.polls += 1;
        }
    }

    fn levels(states: &[PinState]) -> PinMock {
        let expectations: Vec<PinTransaction> =
            states.iter().map(|s| PinTransaction::get(*s)).collect();
        PinMock::new(&expectations)
    }

    #[test]
    fn test_edge_forwards_snapshot_and_direction() {
        let input = levels(&[PinState::High, PinState::Low]);
        let counter = SimCounter {
            count: 10,
            ..Default::default()
        };
        let mut capture: EdgeCapture<_, _, _, PinMock> =
            EdgeCapture::new(counter, input, Immediate(RecordingDecoder::default()), None, 50);

        capture.on_edge();
        capture.counter.count = 200;
        capture.on_edge();

        assert_eq!(
            capture.sink.0.events,
            [
                RxEvent::Edge {
                    ticks: 10,
                    rising: true
                },
                RxEvent::Edge {
                    ticks: 200,
                    rising: false
                },
            ]
        );
        assert_eq!(capture.counter.compare, 250);
        assert!(capture.counter.compare_irq);
        capture.input.done();
    }

    #[test]
    fn test_edge_rearms_compare_with_wrap() {
        let input = levels(&[PinState::High]);
        let counter = SimCounter {
            count: 230,
            ..Default::default()
        };
        let mut capture: EdgeCapture<_, _, _, PinMock> =
            EdgeCapture::new(counter, input, Immediate(RecordingDecoder::default()), None, 50);

        capture.on_edge();
        assert_eq!(capture.counter.compare, 24);
        capture.input.done();
    }

    #[test]
    fn test_indicator_mirrors_edge_direction() {
        let input = levels(&[PinState::High, PinState::Low]);
        let led = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut capture = EdgeCapture::new(
            SimCounter::default(),
            input,
            Immediate(RecordingDecoder::default()),
            Some(led),
            50,
        );

        capture.on_edge();
        capture.on_edge();
        capture.input.done();
        let _ = capture.indicator.as_mut().map(|led| led.done());
    }

    #[test]
    fn test_timeout_disarms_compare() {
        let mut capture: EdgeCapture<_, PinMock, _, PinMock> = EdgeCapture::new(
            SimCounter {
                compare_irq: true,
                ..Default::default()
            },
            levels(&[]),
            Immediate(RecordingDecoder::default()),
            None,
            50,
        );

        capture.on_timeout();
        assert!(!capture.counter.compare_irq);
        assert_eq!(capture.sink.0.events, [RxEvent::Timeout]);
        capture.input.done();
    }

    /// Drives a simulated capture counter tick by tick, injecting edges at
    /// the given counter values and letting compare matches fire.
    fn simulate(edges_at: &[u16], total_ticks: u16, silence: u8) -> Vec<RxEvent> {
        let states: Vec<PinState> = (0..edges_at.len())
            .map(|i| if i % 2 == 0 { PinState::High } else { PinState::Low })
            .collect();
        let mut capture: EdgeCapture<_, _, _, PinMock> = EdgeCapture::new(
            SimCounter::default(),
            levels(&states),
            Immediate(RecordingDecoder::default()),
            None,
            silence,
        );
        for t in 1..=total_ticks {
            if capture.counter.step() {
                capture.on_timeout();
            }
            if edges_at.contains(&t) {
                capture.on_edge();
            }
        }
        capture.input.done();
        capture.sink.0.events
    }

    #[test]
    fn test_no_timeout_while_edges_keep_coming() {
        // edges every 40 ticks, silence window 50 ticks
        let events = simulate(&[40, 80, 120, 160], 260, 50);
        assert_eq!(
            events,
            [
                RxEvent::Edge {
                    ticks: 40,
                    rising: true
                },
                RxEvent::Edge {
                    ticks: 80,
                    rising: false
                },
                RxEvent::Edge {
                    ticks: 120,
                    rising: true
                },
                RxEvent::Edge {
                    ticks: 160,
                    rising: false
                },
                RxEvent::Timeout,
            ]
        );
    }

    #[test]
    fn test_single_timeout_after_silence() {
        // one edge, then 600 quiet ticks (more than two counter wraps)
        let events = simulate(&[10], 610, 50);
        assert_eq!(
            events,
            [
                RxEvent::Edge {
                    ticks: 10,
                    rising: true
                },
                RxEvent::Timeout,
            ]
        );
    }

    #[test]
    fn test_edge_after_long_silence_does_not_time_out() {
        // The compare value 60 comes round again at tick 316 while the
        // interrupt is off; the edge at tick 400 must not see that match.
        let events = simulate(&[10, 400], 420, 50);
        assert_eq!(
            events,
            [
                RxEvent::Edge {
                    ticks: 10,
                    rising: true
                },
                RxEvent::Timeout,
                RxEvent::Edge {
                    ticks: 144,
                    rising: false
                },
            ]
        );
    }

    #[test]
    fn test_edge_clears_latched_compare_flag() {
        let input = levels(&[PinState::High]);
        let counter = SimCounter {
            count: 100,
            compare_pending: true,
            ..Default::default()
        };
        let mut capture: EdgeCapture<_, _, _, PinMock> =
            EdgeCapture::new(counter, input, Immediate(RecordingDecoder::default()), None, 50);

        capture.on_edge();
        assert!(!capture.counter.compare_pending);
        assert!(capture.counter.compare_irq);
        assert!(!capture.counter.step());
        capture.input.done();
    }

    #[test]
    fn test_queue_preserves_order_and_pump_polls() {
        let mut queue: Queue<RxEvent, 8> = Queue::new();
        let (producer, mut consumer) = queue.split();
        let input = levels(&[PinState::High, PinState::Low]);
        let mut capture: EdgeCapture<_, _, _, PinMock> =
            EdgeCapture::new(SimCounter::default(), input, producer, None, 50);

        capture.counter.count = 5;
        capture.on_edge();
        capture.counter.count = 70;
        capture.on_edge();
        capture.on_timeout();

        let mut decoder = RecordingDecoder::default();
        assert_eq!(pump(&mut consumer, &mut decoder), 3);
        assert_eq!(
            decoder.events,
            [
                RxEvent::Edge {
                    ticks: 5,
                    rising: true
                },
                RxEvent::Edge {
                    ticks: 70,
                    rising: false
                },
                RxEvent::Timeout,
            ]
        );
        assert_eq!(decoder.polls, 1);

        assert_eq!(pump(&mut consumer, &mut decoder), 0);
        assert_eq!(decoder.polls, 2);
        assert_eq!(decoder.inits, 0);
        assert_eq!(next_event(&mut consumer), Err(nb::Error::WouldBlock));
        capture.input.done();
    }

    #[test]
    fn test_full_queue_counts_overruns() {
        // capacity of a Queue<_, 4> is 3
        let mut queue: Queue<RxEvent, 4> = Queue::new();
        let (producer, mut consumer) = queue.split();
        let mut capture: EdgeCapture<_, PinMock, _, PinMock> =
            EdgeCapture::new(SimCounter::default(), levels(&[]), producer, None, 50);

        for _ in 0..5 {
            capture.on_timeout();
        }
        assert_eq!(capture.take_overruns(), 2);
        assert_eq!(capture.take_overruns(), 0);

        let mut decoder = RecordingDecoder::default();
        assert_eq!(pump(&mut consumer, &mut decoder), 3);
        capture.input.done();
    }
}
