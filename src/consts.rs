//! Constants used across the FS20/FHT protocol implementation.
//!
//! This module collects the protocol-wide framing constants, the pulse
//! timing the RFM12 needs to produce FS20-compatible bit cells on air,
//! and the handful of RFM12 command words used for ASK operation.
//!
//! ## Key Concepts
//!
//! - **Checksum bases**: FS20 and FHT frames share a layout and differ only
//!   in the constant the 8-bit checksum starts from.
//! - **Fields**: a 13-bit sync word, parity-extended 9-bit bytes, and a
//!   single stop bit.
//! - **Pulse widths**: the on-air target is 600/600 µs for a `1` and
//!   400/400 µs for a `0`; the keying durations below are skewed to
//!   compensate for the RFM12 switching latency and the SPI command overhead.
//! - **Repetition**: every frame goes out three times, 10 ms apart.

/// Checksum start value for FS20 frames.
pub const FS20_CHECKSUM_BASE: u8 = 0x06;

/// Checksum start value for FHT frames.
pub const FHT_CHECKSUM_BASE: u8 = 0x0c;

/// Bit in the command byte announcing an extension (data) byte.
pub const FS20_CMD_HAS_DATA: u8 = 0x20;

/// The synchronisation word: twelve zeros followed by a one.
pub const FS20_SYNC_WORD: u16 = 0x0001;

/// Width of [`FS20_SYNC_WORD`] in bits. Sent without parity.
pub const FS20_SYNC_BITS: u8 = 13;

/// Width of a payload byte on air: eight data bits plus even parity.
pub const FS20_BYTE_BITS: u8 = 9;

/// Maximum number of fields in a frame:
/// sync, house high, house low, address, command, data, checksum, stop.
pub const FS20_MAX_FIELDS: usize = 8;

/// Maximum number of payload bytes covered by the checksum, checksum included.
pub const FS20_MAX_PAYLOAD_LEN: usize = 6;

/// Maximum number of bits in one frame.
pub const FS20_MAX_FRAME_BITS: usize =
    FS20_SYNC_BITS as usize + FS20_MAX_PAYLOAD_LEN * FS20_BYTE_BITS as usize + 1;

/// Nominal bit cell half-width for a `1` in microseconds.
pub const FS20_WIDTH_ONE_US: u16 = 600;

/// Nominal bit cell half-width for a `0` in microseconds.
pub const FS20_WIDTH_ZERO_US: u16 = 400;

/// Added to the nominal width while the carrier is keyed on.
pub const FS20_ON_SKEW_US: u16 = 150;

/// Taken from the nominal width while the carrier is keyed off.
pub const FS20_OFF_SKEW_US: u16 = 200;

/// Number of times each frame is transmitted.
pub const FS20_REPEAT_COUNT: u8 = 3;

/// Pause after each frame repetition, in milliseconds.
pub const FS20_REPEAT_DELAY_MS: u32 = 10;

/// Longest pulse the receiver must time, rounded up from the 1464 µs WS300 pulse.
pub const FS20_LONGEST_PULSE_US: u32 = 1500;

/// Upper bound (exclusive) for a pulse measured in counter ticks.
pub const FS20_MAX_OVERFLOW: u32 = 255;

/// Clock prescalers offered by the capture timer, smallest first.
pub const FS20_PRESCALERS: [u32; 6] = [1, 8, 64, 128, 256, 1024];

/// Number of 10 ms waits for the RFM12 power-on reset to settle.
pub const RFM12_POR_WAIT_CYCLES: u8 = 15;

/// Power management command.
pub const RFM12_CMD_PWRMGT: u16 = 0x8200;
/// Power management: enable receiver.
pub const RFM12_PWRMGT_ER: u16 = 0x0080;
/// Power management: enable base band block.
pub const RFM12_PWRMGT_EBB: u16 = 0x0040;
/// Power management: enable transmitter.
pub const RFM12_PWRMGT_ET: u16 = 0x0020;
/// Power management: enable synthesizer.
pub const RFM12_PWRMGT_ES: u16 = 0x0010;
/// Power management: enable crystal oscillator.
pub const RFM12_PWRMGT_EX: u16 = 0x0008;

/// Data filter command at its power-on value.
pub const RFM12_CMD_DATAFILTER: u16 = 0xc22c;
/// Data filter bit that must be cleared to route the demodulator to the nFFS/DATA pin.
pub const RFM12_DATAFILTER_EXTERNAL: u16 = 0x0008;

/// Receiver control command (bandwidth, LNA gain, DRSSI threshold).
pub const RFM12_CMD_RXCTRL: u16 = 0x9400;

/// Configuration setting command.
pub const RFM12_CMD_CFG: u16 = 0x8000;
/// Configuration: 868 MHz band.
pub const RFM12_BAND_868: u16 = 0x0020;
/// Configuration: 13.5 pF crystal load capacitance.
pub const RFM12_XTAL_135PF: u16 = 0x000a;

/// Low battery detector and clock divider command.
pub const RFM12_CMD_LBDMCD: u16 = 0xc000;
/// FIFO and reset mode command.
pub const RFM12_CMD_FIFORESET: u16 = 0xca00;
/// Wake-up timer command (disabled).
pub const RFM12_CMD_WAKEUP: u16 = 0xe000;
/// Low duty-cycle command (disabled).
pub const RFM12_CMD_DUTYCYCLE: u16 = 0xc800;
/// Status read command.
pub const RFM12_CMD_STATUS: u16 = 0x0000;
/// Frequency setting command.
pub const RFM12_CMD_FREQ: u16 = 0xa000;

/// AFC command.
pub const RFM12_CMD_AFC: u16 = 0xc400;
/// AFC: run once after each power-up.
pub const RFM12_AFC_AUTO_ONCE: u16 = 0x0040;
/// AFC: limit the offset to +3/-4 steps.
pub const RFM12_AFC_LIMIT_4: u16 = 0x0030;
/// AFC: enable the offset register.
pub const RFM12_AFC_OE: u16 = 0x0002;
/// AFC: enable the calculation.
pub const RFM12_AFC_EN: u16 = 0x0001;

/// FS20 carrier frequency in kHz.
pub const RFM12_FREQ_868300_KHZ: u32 = 868_300;

/// Receiver bandwidth setting applied at bring-up.
pub const RFM12_DEFAULT_BANDWIDTH: u8 = 4;
/// LNA gain setting applied at bring-up.
pub const RFM12_DEFAULT_GAIN: u8 = 1;
/// DRSSI threshold setting applied at bring-up.
pub const RFM12_DEFAULT_DRSSI: u8 = 2;
