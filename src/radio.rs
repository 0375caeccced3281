//! Radio link abstraction and the RFM12 implementation.
//!
//! The frame encoder and the transmit scheduler never talk to a chip
//! directly. They go through [`RadioLink`], which offers exactly what the
//! FS20 transmit path needs:
//!
//! - a transaction bracket ([`begin_transaction`](RadioLink::begin_transaction) /
//!   [`end_transaction`](RadioLink::end_transaction)) that serialises access to the chip
//! - a raw 16-bit command transfer ([`trans`](RadioLink::trans))
//! - carrier keying for a given number of microseconds ([`key_output`](RadioLink::key_output))
//! - the receiver configuration descriptor ([`RadioModule`])
//!
//! [`Rfm12`] implements the trait for a HopeRF RFM12(B) on an
//! `embedded_hal::spi::SpiDevice`, using a `DelayNs` for the keying delays.
//!
//! ## Design Notes
//!
//! All operations take `&mut self`, so two transactions can never overlap
//! while the link is owned by the mainloop. Interrupt handlers must not hold
//! a link; see [`crate::receiver`] for what they get instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::consts::{
    RFM12_CMD_DATAFILTER, RFM12_CMD_FREQ, RFM12_CMD_PWRMGT, RFM12_CMD_RXCTRL,
    RFM12_DATAFILTER_EXTERNAL, RFM12_DEFAULT_BANDWIDTH, RFM12_DEFAULT_DRSSI, RFM12_DEFAULT_GAIN,
    RFM12_PWRMGT_EBB, RFM12_PWRMGT_ER, RFM12_PWRMGT_ES, RFM12_PWRMGT_ET, RFM12_PWRMGT_EX,
};

/// Receiver configuration last written to the chip.
///
/// Tuning operations read two of the fields and write all three back,
/// so the descriptor must only be mutated inside a transaction.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RadioModule {
    /// Receiver baseband bandwidth selector (3 bits).
    pub bandwidth: u8,
    /// LNA gain selector (2 bits).
    pub gain: u8,
    /// DRSSI threshold selector (3 bits).
    pub drssi: u8,
}

impl Default for RadioModule {
    fn default() -> Self {
        Self {
            bandwidth: RFM12_DEFAULT_BANDWIDTH,
            gain: RFM12_DEFAULT_GAIN,
            drssi: RFM12_DEFAULT_DRSSI,
        }
    }
}

/// Chip-level access used by the transmit path.
///
/// Implementations treat every operation as fire-and-forget: bus errors are
/// not reported back, they show up as wrong behaviour on air.
pub trait RadioLink {
    /// Prologue: claims the chip for one transmit or tuning operation.
    fn begin_transaction(&mut self);

    /// Epilogue: releases the chip.
    fn end_transaction(&mut self);

    /// Sends one 16-bit command word and returns the word clocked back.
    fn trans(&mut self, cmd: u16) -> u16;

    /// Keys the carrier on (`level == true`) or off, then holds that state
    /// for `duration_us` microseconds before returning.
    fn key_output(&mut self, level: bool, duration_us: u16);

    /// The receiver configuration descriptor.
    fn module(&self) -> &RadioModule;

    /// Mutable access to the receiver configuration descriptor.
    fn module_mut(&mut self) -> &mut RadioModule;

    /// Runs `f` between [`begin_transaction`](RadioLink::begin_transaction)
    /// and [`end_transaction`](RadioLink::end_transaction).
    fn transaction<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.begin_transaction();
        let result = f(self);
        self.end_transaction();
        result
    }

    /// Writes bandwidth, LNA gain and DRSSI threshold in one receiver control
    /// command and records them in the descriptor. Values are masked to the
    /// width of their register fields.
    ///
    /// Must be called inside a transaction.
    fn set_bandwidth(&mut self, bandwidth: u8, gain: u8, drssi: u8) {
        let module = RadioModule {
            bandwidth: bandwidth & 0x07,
            gain: gain & 0x03,
            drssi: drssi & 0x07,
        };
        let _ = self.trans(
            RFM12_CMD_RXCTRL
                | ((module.bandwidth as u16) << 5)
                | ((module.gain as u16) << 3)
                | module.drssi as u16,
        );
        *self.module_mut() = module;
    }

    /// Tunes the synthesizer for the 868 MHz band. `khz` is the carrier
    /// frequency in kHz (860 000 to 879 995, 5 kHz steps).
    ///
    /// Must be called inside a transaction.
    fn set_frequency_khz(&mut self, khz: u32) {
        let steps = (khz.saturating_sub(860_000) / 5) as u16 & 0x0fff;
        let _ = self.trans(RFM12_CMD_FREQ | steps);
    }

    /// Puts the chip back into ASK receive mode: receiver and baseband on,
    /// data filter switched to the external (nFFS/DATA pin) path.
    ///
    /// Opens its own transaction.
    fn activate_receiver(&mut self) {
        self.begin_transaction();
        let _ = self.trans(RFM12_CMD_PWRMGT | RFM12_PWRMGT_ER | RFM12_PWRMGT_EBB);
        let _ = self.trans(RFM12_CMD_DATAFILTER & !RFM12_DATAFILTER_EXTERNAL);
        self.end_transaction();
    }
}

/// A HopeRF RFM12(B) on an SPI bus, keyed as an ASK transmitter.
///
/// Keying switches the transmitter, synthesizer and oscillator on for a
/// carrier and leaves only the oscillator running for a gap; the hold time
/// is a blocking `delay_us`.
///
/// ## Example
///
/// ```rust
/// # use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
/// # use embedded_hal_mock::eh1::delay::NoopDelay;
/// use ask868::radio::{RadioLink, Rfm12};
///
/// # let spi = SpiMock::new(&[
/// #     SpiTransaction::transaction_start(),
/// #     SpiTransaction::transfer_in_place(vec![0x82, 0xc0], vec![0x00, 0x00]),
/// #     SpiTransaction::transaction_end(),
/// #     SpiTransaction::transaction_start(),
/// #     SpiTransaction::transfer_in_place(vec![0xc2, 0x24], vec![0x00, 0x00]),
/// #     SpiTransaction::transaction_end(),
/// # ]);
/// let mut radio = Rfm12::new(spi, NoopDelay::new());
/// radio.activate_receiver();
/// # radio.spi.done();
/// ```
#[derive(Debug)]
pub struct Rfm12<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// SPI device the chip sits on
    pub spi: SPI,
    delay: D,
    module: RadioModule,
    in_transaction: bool,
}

impl<SPI, D> Rfm12<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// Wraps an SPI device and a delay provider. The descriptor starts at the
    /// bring-up defaults; nothing is written to the chip yet.
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            module: RadioModule::default(),
            in_transaction: false,
        }
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Gives back the SPI device and the delay provider.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }
}

impl<SPI, D> RadioLink for Rfm12<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    fn begin_transaction(&mut self) {
        debug_assert!(!self.in_transaction, "rfm12 transaction already open");
        self.in_transaction = true;
    }

    fn end_transaction(&mut self) {
        debug_assert!(self.in_transaction, "rfm12 transaction not open");
        self.in_transaction = false;
    }

    fn trans(&mut self, cmd: u16) -> u16 {
        debug_assert!(self.in_transaction, "rfm12 command outside a transaction");
        let mut buf = cmd.to_be_bytes();
        match self.spi.transfer_in_place(&mut buf) {
            Ok(()) => u16::from_be_bytes(buf),
            Err(_) => {
                warn!("rfm12: spi transfer of {:#x} failed", cmd);
                0
            }
        }
    }

    fn key_output(&mut self, level: bool, duration_us: u16) {
        let cmd = if level {
            RFM12_CMD_PWRMGT | RFM12_PWRMGT_ET | RFM12_PWRMGT_ES | RFM12_PWRMGT_EX
        } else {
            RFM12_CMD_PWRMGT | RFM12_PWRMGT_EX
        };
        let _ = self.trans(cmd);
        self.delay.delay_us(duration_us as u32);
    }

    fn module(&self) -> &RadioModule {
        &self.module
    }

    fn module_mut(&mut self) -> &mut RadioModule {
        &mut self.module
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{RadioLink, RadioModule};
    use embedded_hal::delay::DelayNs;

    /// One observed call on a [`RecordingLink`].
    #[derive(PartialEq, Eq, Clone, Copy, Debug)]
    pub(crate) enum LinkEvent {
        Begin,
        End,
        Trans(u16),
        Key(bool, u16),
    }

    /// A radio link that records every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingLink {
        pub(crate) events: Vec<LinkEvent>,
        pub(crate) module: RadioModule,
    }

    impl RecordingLink {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn transactions(&self) -> usize {
            self.events
                .iter()
                .filter(|e| **e == LinkEvent::Begin)
                .count()
        }

        pub(crate) fn keys(&self) -> Vec<(bool, u16)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    LinkEvent::Key(level, us) => Some((*level, *us)),
                    _ => None,
                })
                .collect()
        }
    }

    impl RadioLink for RecordingLink {
        fn begin_transaction(&mut self) {
            self.events.push(LinkEvent::Begin);
        }

        fn end_transaction(&mut self) {
            self.events.push(LinkEvent::End);
        }

        fn trans(&mut self, cmd: u16) -> u16 {
            self.events.push(LinkEvent::Trans(cmd));
            0
        }

        fn key_output(&mut self, level: bool, duration_us: u16) {
            self.events.push(LinkEvent::Key(level, duration_us));
        }

        fn module(&self) -> &RadioModule {
            &self.module
        }

        fn module_mut(&mut self) -> &mut RadioModule {
            &mut self.module
        }
    }

    /// A delay provider that records millisecond waits and skips the rest.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDelay {
        pub(crate) ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.ms.push(ms);
        }
    }
}
