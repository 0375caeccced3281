//! FS20/FHT transmit scheduler and receiver control.
//!
//! This module provides [`Fs20Driver`], the mainloop side of the crate. It
//! owns a [`RadioLink`] and an optional transmit indicator, and offers:
//!
//! - chip bring-up for 868.3 MHz ASK reception ([`init`](Fs20Driver::init))
//! - receive path setup ([`init_receiver`](Fs20Driver::init_receiver))
//! - frame transmission with repetition ([`send`](Fs20Driver::send))
//! - receiver tuning ([`set_gain`](Fs20Driver::set_gain), [`set_drssi`](Fs20Driver::set_drssi))
//! - the text command surface ([`handle_line`](Fs20Driver::handle_line))
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! # use embedded_hal_mock::eh1::spi::Mock as SpiMock;
//! use ask868::driver::Fs20Driver;
//! use ask868::radio::Rfm12;
//!
//! # let spi = SpiMock::new(&[]);
//! # let led = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! let mut driver = Fs20Driver::new(Rfm12::new(spi, NoopDelay::new()), Some(led));
//! assert_eq!(driver.tx_good, 0);
//! # driver.link.spi.done();
//! # driver.tx_indicator.as_mut().map(|led| led.done());
//! ```
//!
//! ## Design Notes
//!
//! [`send`](Fs20Driver::send) blocks for the whole burst, roughly 3 x 60 ms.
//! The receive front-end keeps running from interrupt context while the
//! transmitter is keyed; it sees no edges because the receiver is off, and
//! [`RadioLink::activate_receiver`] switches it back on once the burst is
//! complete.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::command::Command;
use crate::consts::{
    FS20_REPEAT_COUNT, FS20_REPEAT_DELAY_MS, RFM12_AFC_AUTO_ONCE, RFM12_AFC_EN, RFM12_AFC_LIMIT_4,
    RFM12_AFC_OE, RFM12_BAND_868, RFM12_CMD_AFC, RFM12_CMD_CFG, RFM12_CMD_DUTYCYCLE,
    RFM12_CMD_FIFORESET, RFM12_CMD_LBDMCD, RFM12_CMD_STATUS, RFM12_CMD_WAKEUP,
    RFM12_DEFAULT_BANDWIDTH, RFM12_DEFAULT_DRSSI, RFM12_DEFAULT_GAIN, RFM12_FREQ_868300_KHZ,
    RFM12_POR_WAIT_CYCLES, RFM12_XTAL_135PF,
};
use crate::encoding::{Frame, Protocol, transmit_frame};
use crate::error::ParseError;
use crate::radio::{RadioLink, RadioModule};
use crate::receiver::PulseDecoder;
use crate::timer::{TickCounter, TimingBase, start_capture_timer};

/// The FS20/FHT mainloop driver.
#[derive(Debug)]
pub struct Fs20Driver<L, LED>
where
    L: RadioLink,
    LED: OutputPin,
{
    /// The radio the frames are keyed out on.
    pub link: L,
    /// Driven high while a frame is on air.
    pub tx_indicator: Option<LED>,
    /// Number of completed send bursts.
    pub tx_good: u16,
}

impl<L, LED> Fs20Driver<L, LED>
where
    L: RadioLink,
    LED: OutputPin,
{
    /// Creates a new driver and switches the transmit indicator off.
    pub fn new(link: L, mut tx_indicator: Option<LED>) -> Self {
        if let Some(led) = tx_indicator.as_mut() {
            let _ = led.set_low();
        }
        Self {
            link,
            tx_indicator,
            tx_good: 0,
        }
    }

    /// Brings the chip up for 868.3 MHz ASK reception.
    ///
    /// Waits out the power-on reset, then configures band, crystal load,
    /// AFC, carrier frequency and the default receiver bandwidth, gain and
    /// DRSSI in one transaction.
    ///
    /// # Returns
    /// The status word read back during setup.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> u16 {
        for _ in 0..RFM12_POR_WAIT_CYCLES {
            delay.delay_ms(10);
        }

        let status = self.link.transaction(|link| {
            let _ = link.trans(RFM12_CMD_LBDMCD | 0xe0);
            let _ = link.trans(RFM12_CMD_CFG | RFM12_BAND_868 | RFM12_XTAL_135PF);
            let _ = link.trans(RFM12_CMD_FIFORESET);
            let _ = link.trans(RFM12_CMD_WAKEUP);
            let _ = link.trans(RFM12_CMD_DUTYCYCLE);
            let _ = link.trans(
                RFM12_CMD_AFC | RFM12_AFC_AUTO_ONCE | RFM12_AFC_LIMIT_4 | RFM12_AFC_OE | RFM12_AFC_EN,
            );
            let status = link.trans(RFM12_CMD_STATUS);
            link.set_frequency_khz(RFM12_FREQ_868300_KHZ);
            link.set_bandwidth(
                RFM12_DEFAULT_BANDWIDTH,
                RFM12_DEFAULT_GAIN,
                RFM12_DEFAULT_DRSSI,
            );
            status
        });
        debug!("fs20: rfm12 status {:#x}", status);
        status
    }

    /// Prepares the receive path: runs the decoder's init hook, starts the
    /// capture timer and switches the receiver on.
    pub fn init_receiver<C, DEC>(&mut self, counter: &mut C, timing: &TimingBase, decoder: &mut DEC)
    where
        C: TickCounter,
        DEC: PulseDecoder,
    {
        decoder.init();
        start_capture_timer(counter, timing);
        self.link.activate_receiver();
    }

    /// Sends one frame built from the given fields.
    ///
    /// See [`send_frame`](Fs20Driver::send_frame).
    pub fn send<D: DelayNs>(
        &mut self,
        protocol: Protocol,
        house_code: u16,
        address: u8,
        command: u8,
        data: u8,
        delay: &mut D,
    ) {
        let frame = Frame::new(protocol, house_code, address, command, data);
        self.send_frame(&frame, delay);
    }

    /// Transmits `frame` three times, 10 ms apart, each repetition in its own
    /// transaction, then reactivates the receiver.
    ///
    /// Blocks until the burst is complete.
    pub fn send_frame<D: DelayNs>(&mut self, frame: &Frame, delay: &mut D) {
        for repetition in 0..FS20_REPEAT_COUNT {
            trace!("{}: repetition {}", frame.protocol.name(), repetition);
            if let Some(led) = self.tx_indicator.as_mut() {
                let _ = led.set_high();
            }
            self.link.transaction(|link| transmit_frame(link, frame));
            if let Some(led) = self.tx_indicator.as_mut() {
                let _ = led.set_low();
            }
            delay.delay_ms(FS20_REPEAT_DELAY_MS);
        }
        self.link.activate_receiver();
        self.tx_good = self.tx_good.wrapping_add(1);
        info!(
            "{}: sent house {:#x} addr {:#x} cmd {:#x} checksum {:#x}",
            frame.protocol.name(),
            frame.house_code,
            frame.address,
            frame.command,
            frame.checksum()
        );
    }

    /// Sets the LNA gain, keeping bandwidth and DRSSI.
    pub fn set_gain(&mut self, gain: u8) {
        self.link.transaction(|link| {
            let module = *link.module();
            link.set_bandwidth(module.bandwidth, gain, module.drssi);
        });
        debug!("fs20: gain {}", self.link.module().gain);
    }

    /// Sets the DRSSI threshold, keeping bandwidth and gain.
    pub fn set_drssi(&mut self, drssi: u8) {
        self.link.transaction(|link| {
            let module = *link.module();
            link.set_bandwidth(module.bandwidth, module.gain, drssi);
        });
        debug!("fs20: drssi {}", self.link.module().drssi);
    }

    /// The receiver configuration last written to the chip.
    pub fn module(&self) -> RadioModule {
        *self.link.module()
    }

    /// Runs a parsed command.
    pub fn execute<D: DelayNs>(&mut self, command: Command, delay: &mut D) {
        match command {
            Command::Send(frame) => self.send_frame(&frame, delay),
            Command::SetGain(gain) => self.set_gain(gain),
            Command::SetDrssi(drssi) => self.set_drssi(drssi),
            #[cfg(feature = "debug")]
            Command::SetDebug(flags) => crate::report::set_report_flags(flags),
        }
    }

    /// Parses and runs one command line.
    ///
    /// A line that fails to parse has no effect on the radio.
    pub fn handle_line<D: DelayNs>(&mut self, line: &str, delay: &mut D) -> Result<(), ParseError> {
        let command = Command::parse(line).inspect_err(|e| {
            warn!("fs20: rejected command: {}", e);
        })?;
        self.execute(command, delay);
        Ok(())
    }
}
