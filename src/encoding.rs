//! FS20/FHT frame layout and bit-cell encoding.
//!
//! This module turns a house code / address / command / data tuple into the
//! bit stream an FS20 or FHT receiver expects, and the bit stream into the
//! on/off keying durations the RFM12 has to produce.
//!
//! ## Frame layout
//!
//! | Field        | Bits | Parity |
//! |--------------|------|--------|
//! | sync (`1`)   | 13   | no     |
//! | house high   | 9    | even   |
//! | house low    | 9    | even   |
//! | address      | 9    | even   |
//! | command      | 9    | even   |
//! | data         | 9    | even, only if `command & 0x20` |
//! | checksum     | 9    | even   |
//! | stop (`0`)   | 1    | no     |
//!
//! All fields go out MSB first. The checksum is the 8-bit wrapping sum of
//! the protocol's base constant and every payload byte before it.
//!
//! ## Functions
//!
//! - [`Frame::fields`]: the frame as a list of [`Field`]s
//! - [`Frame::bits`]: the frame as a flat bit stream
//! - [`Pulse::for_bit`]: keying durations for one bit cell
//! - [`transmit_frame`]: keys one frame out through a [`RadioLink`]

use heapless::Vec;

use crate::checksum::{checksum, hi8, lo8, parity_even_bit};
use crate::consts::{
    FHT_CHECKSUM_BASE, FS20_BYTE_BITS, FS20_CHECKSUM_BASE, FS20_CMD_HAS_DATA, FS20_MAX_FIELDS,
    FS20_MAX_PAYLOAD_LEN, FS20_OFF_SKEW_US, FS20_ON_SKEW_US, FS20_SYNC_BITS, FS20_SYNC_WORD,
    FS20_WIDTH_ONE_US, FS20_WIDTH_ZERO_US,
};
use crate::radio::RadioLink;

/// The wire format of a frame.
///
/// Both formats share the frame layout; they differ in the checksum start value.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Protocol {
    /// FS20 switches, dimmers and sensors. Checksum base `0x06`.
    Fs20,
    /// FHT heating valves and thermostats. Checksum base `0x0c`.
    Fht,
}

impl Protocol {
    /// The value the frame checksum starts from.
    pub const fn checksum_base(self) -> u8 {
        match self {
            Protocol::Fs20 => FS20_CHECKSUM_BASE,
            Protocol::Fht => FHT_CHECKSUM_BASE,
        }
    }

    /// Short lowercase name, as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Protocol::Fs20 => "fs20",
            Protocol::Fht => "fht",
        }
    }
}

/// One unit of the serialized frame: `width` bits of `value`, MSB first.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Field {
    value: u16,
    width: u8,
}

impl Field {
    /// The 13-bit sync word. No parity.
    pub const fn sync() -> Self {
        Self {
            value: FS20_SYNC_WORD,
            width: FS20_SYNC_BITS,
        }
    }

    /// A payload byte extended to 9 bits by appending its even parity bit.
    pub fn byte(byte: u8) -> Self {
        Self {
            value: ((byte as u16) << 1) | parity_even_bit(byte),
            width: FS20_BYTE_BITS,
        }
    }

    /// The single terminating `0` bit.
    pub const fn stop() -> Self {
        Self { value: 0, width: 1 }
    }

    /// The raw field value, right-aligned.
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Number of bits this field occupies on air.
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Iterates the field's bits, most significant first.
    pub fn bits(self) -> impl Iterator<Item = bool> {
        (0..self.width)
            .rev()
            .map(move |shift| self.value & (1 << shift) != 0)
    }
}

/// Keying durations for one bit cell.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Pulse {
    /// Time the carrier stays keyed on, in microseconds.
    pub on_us: u16,
    /// Time the carrier stays keyed off afterwards, in microseconds.
    pub off_us: u16,
}

impl Pulse {
    /// Returns the keying durations for `bit`.
    ///
    /// The on-air target is a symmetric 600/600 µs cell for `1` and
    /// 400/400 µs for `0`. The RFM12 turns on late and off late, and each
    /// keying command costs about 25 µs of SPI traffic, so the carrier is
    /// held on 150 µs longer and off 200 µs shorter than nominal.
    pub const fn for_bit(bit: bool) -> Self {
        let width = if bit {
            FS20_WIDTH_ONE_US
        } else {
            FS20_WIDTH_ZERO_US
        };
        Self {
            on_us: width + FS20_ON_SKEW_US,
            off_us: width - FS20_OFF_SKEW_US,
        }
    }
}

/// A single FS20 or FHT telegram.
///
/// The checksum is always derived from the other fields.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame {
    /// Wire format
    pub protocol: Protocol,
    /// 16-bit house code
    pub house_code: u16,
    /// Device address within the house code
    pub address: u8,
    /// Command byte; bit `0x20` announces a data byte
    pub command: u8,
    /// Extension byte, only sent when [`Frame::has_data`] is true
    pub data: u8,
}

impl Frame {
    /// Creates a frame. `data` is ignored on air unless `command & 0x20` is set.
    pub const fn new(
        protocol: Protocol,
        house_code: u16,
        address: u8,
        command: u8,
        data: u8,
    ) -> Self {
        Self {
            protocol,
            house_code,
            address,
            command,
            data,
        }
    }

    /// Whether the command byte announces an extension byte.
    pub const fn has_data(&self) -> bool {
        self.command & FS20_CMD_HAS_DATA != 0
    }

    /// The payload bytes in transmission order, checksum excluded.
    pub fn payload(&self) -> Vec<u8, FS20_MAX_PAYLOAD_LEN> {
        let mut payload = Vec::new();
        let _ = payload.push(hi8(self.house_code));
        let _ = payload.push(lo8(self.house_code));
        let _ = payload.push(self.address);
        let _ = payload.push(self.command);
        if self.has_data() {
            let _ = payload.push(self.data);
        }
        payload
    }

    /// The 8-bit checksum over the protocol base and the payload.
    pub fn checksum(&self) -> u8 {
        checksum(self.protocol, &self.payload())
    }

    /// The frame as the sequence of fields that go on air.
    pub fn fields(&self) -> Vec<Field, FS20_MAX_FIELDS> {
        let mut fields = Vec::new();
        let _ = fields.push(Field::sync());
        for b in self.payload() {
            let _ = fields.push(Field::byte(b));
        }
        let _ = fields.push(Field::byte(self.checksum()));
        let _ = fields.push(Field::stop());
        fields
    }

    /// The frame as a flat bit stream, first bit on air first.
    pub fn bits(&self) -> impl Iterator<Item = bool> {
        self.fields().into_iter().flat_map(Field::bits)
    }
}

/// Keys one frame out through `link`.
///
/// Every bit becomes an on-pulse followed by an off-pulse, see [`Pulse::for_bit`].
/// The caller owns the surrounding transaction.
pub fn transmit_frame<L: RadioLink>(link: &mut L, frame: &Frame) {
    for bit in frame.bits() {
        let pulse = Pulse::for_bit(bit);
        link.key_output(true, pulse.on_us);
        link.key_output(false, pulse.off_us);
    }
}
