use crate::receiver::{EdgeCapture, EventSink};
use crate::timer::TickCounter;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::{InputPin, OutputPin};

/// The global slot type holding the receive front-end.
pub type GlobalEdgeCapture<C, P, S, LED> = Mutex<RefCell<Option<EdgeCapture<C, P, S, LED>>>>;

/// Used to initialize the global static `EdgeCapture` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use ask868::timer::{global_edge_capture_init, GlobalEdgeCapture};
///
/// static FS20_RX: GlobalEdgeCapture<Tc2, Pd2, Producer<'static, RxEvent, 32>, Pd5> =
///     global_edge_capture_init();
/// ```
pub const fn global_edge_capture_init<C, P, S, LED>() -> GlobalEdgeCapture<C, P, S, LED>
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    Mutex::new(RefCell::new(None))
}

/// Installs a front-end into the global slot.
///
/// Call from `main()` after the capture timer has been configured and before
/// the pin-change interrupt is unmasked.
pub fn global_edge_capture_setup<C, P, S, LED>(
    global: &'static GlobalEdgeCapture<C, P, S, LED>,
    capture: EdgeCapture<C, P, S, LED>,
) where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(capture));
    });
}

/// Runs the edge handler from the pin-change interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn INT0() {
///     global_edge_interrupt(&FS20_RX);
/// }
/// ```
pub fn global_edge_interrupt<C, P, S, LED>(global: &'static GlobalEdgeCapture<C, P, S, LED>)
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    critical_section::with(|cs| {
        if let Some(capture) = global.borrow(cs).borrow_mut().as_mut() {
            capture.on_edge();
        }
    });
}

/// Runs the timeout handler from the capture timer's compare-match interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER2_COMPA() {
///     global_timeout_interrupt(&FS20_RX);
/// }
/// ```
pub fn global_timeout_interrupt<C, P, S, LED>(global: &'static GlobalEdgeCapture<C, P, S, LED>)
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    critical_section::with(|cs| {
        if let Some(capture) = global.borrow(cs).borrow_mut().as_mut() {
            capture.on_timeout();
        }
    });
}

/// Reads and clears the front-end's overrun count from the mainloop,
/// logging a warning if events were lost.
pub fn global_take_overruns<C, P, S, LED>(global: &'static GlobalEdgeCapture<C, P, S, LED>) -> u16
where
    C: TickCounter,
    P: InputPin,
    S: EventSink,
    LED: OutputPin,
{
    let overruns = critical_section::with(|cs| {
        global
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map_or(0, |capture| capture.take_overruns())
    });
    if overruns > 0 {
        warn!("fs20: {} receive events dropped", overruns);
    }
    overruns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::{Immediate, PulseDecoder};
    use crate::timer::testing::SimCounter;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[derive(Debug, Default)]
    struct Counts {
        edges: usize,
        timeouts: usize,
    }

    impl PulseDecoder for Counts {
        fn on_edge(&mut self, _ticks: u8, _rising: bool) {
            self.edges += 1;
        }

        fn on_timeout(&mut self) {
            self.timeouts += 1;
        }
    }

    static RX: GlobalEdgeCapture<SimCounter, PinMock, Immediate<Counts>, PinMock> =
        global_edge_capture_init();

    #[test]
    fn test_global_handlers() {
        // Not installed yet: both handlers are no-ops.
        global_edge_interrupt(&RX);
        global_timeout_interrupt(&RX);

        let input = PinMock::new(&[PinTransaction::get(PinState::High)]);
        global_edge_capture_setup(
            &RX,
            EdgeCapture::new(
                SimCounter::default(),
                input,
                Immediate(Counts::default()),
                None,
                50,
            ),
        );

        global_edge_interrupt(&RX);
        global_timeout_interrupt(&RX);
        assert_eq!(global_take_overruns(&RX), 0);

        critical_section::with(|cs| {
            let mut slot = RX.borrow(cs).borrow_mut();
            let capture = slot.as_mut().unwrap();
            assert_eq!(capture.sink.0.edges, 1);
            assert_eq!(capture.sink.0.timeouts, 1);
            capture.input.done();
        });
    }

    #[test]
    fn test_receiver_macros() {
        crate::init_fs20_receiver!(SimCounter, PinMock, Immediate<Counts>, PinMock);

        let input = PinMock::new(&[PinTransaction::get(PinState::Low)]);
        crate::setup_fs20_receiver!(EdgeCapture::new(
            SimCounter::default(),
            input,
            Immediate(Counts::default()),
            None,
            50,
        ));

        crate::fs20_edge_interrupt!();
        crate::fs20_timeout_interrupt!();
        crate::fs20_timeout_interrupt!();

        critical_section::with(|cs| {
            let mut slot = FS20_RX.borrow(cs).borrow_mut();
            let capture = slot.as_mut().unwrap();
            assert_eq!(capture.sink.0.edges, 1);
            assert_eq!(capture.sink.0.timeouts, 2);
            assert!(!capture.counter.compare_irq);
            capture.input.done();
        });
    }
}
