//! Receiver debug report flags.
//!
//! A single byte shared between the command path, which sets it, and the
//! pulse decoder, which may read it from interrupt context. Access goes
//! through a `critical_section` mutex. The flags start cleared at reset.

use core::cell::Cell;
use critical_section::Mutex;

/// Report telegrams from known protocols.
pub const REPORT_KNOWN: u8 = 0x01;
/// Report repeated telegrams too.
pub const REPORT_REPEATED: u8 = 0x02;
/// Report raw bit counts.
pub const REPORT_BITS: u8 = 0x04;
/// Report every edge (monitor mode).
pub const REPORT_MONITOR: u8 = 0x08;
/// Report edge timings in binary.
pub const REPORT_BINTIME: u8 = 0x10;
/// Append signal strength.
pub const REPORT_RSSI: u8 = 0x20;
/// Report FHT protocol internals.
pub const REPORT_FHTPROTO: u8 = 0x40;

static RX_REPORT: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

/// Replaces the report flags.
pub fn set_report_flags(flags: u8) {
    critical_section::with(|cs| RX_REPORT.borrow(cs).set(flags));
    debug!("fs20: report flags {:#x}", flags);
}

/// Current report flags.
pub fn report_flags() -> u8 {
    critical_section::with(|cs| RX_REPORT.borrow(cs).get())
}

/// Whether every bit of `flag` is set.
pub fn reporting(flag: u8) -> bool {
    report_flags() & flag == flag
}
