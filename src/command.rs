//! Text command surface.
//!
//! One command per line, arguments separated by whitespace:
//!
//! | Command          | Arguments                                   | Effect |
//! |------------------|---------------------------------------------|--------|
//! | `fs20 send`      | `housecode addr command [data]` (hex)       | send one FS20 frame, three repetitions |
//! | `fht send`       | `housecode addr command [data]` (hex)       | send one FHT frame (feature `fht`) |
//! | `fs20 setgain`   | `gain` (decimal, 0-255)                     | set LNA gain |
//! | `fs20 setdrssi`  | `drssi` (decimal, 0-255)                    | set DRSSI threshold |
//! | `fs20 setdebug`  | `flags` (hex, 0-ff)                         | set receiver report flags (feature `debug`) |
//!
//! Hex arguments may carry a `0x` prefix. A send without the `data` argument
//! uses `0`; the data byte is only transmitted when `command & 0x20` is set,
//! in which case that `0` is sent and summed like a supplied value.
//!
//! Parsing is separate from execution: [`Command::parse`] never touches the
//! radio, so a rejected line has no side effect. Execution lives on
//! [`Fs20Driver::execute`](crate::driver::Fs20Driver::execute).

use core::num::IntErrorKind;

use crate::encoding::{Frame, Protocol};
use crate::error::ParseError;

/// A parsed command line.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Command {
    /// Transmit a frame.
    Send(Frame),
    /// Change the LNA gain.
    SetGain(u8),
    /// Change the DRSSI threshold.
    SetDrssi(u8),
    /// Change the receiver report flags.
    #[cfg(feature = "debug")]
    SetDebug(u8),
}

/// The command named by the first two words of a line.
#[derive(Clone, Copy)]
enum Verb {
    Send(Protocol),
    SetGain,
    SetDrssi,
    #[cfg(feature = "debug")]
    SetDebug,
}

impl Verb {
    fn lookup(family: &str, verb: &str) -> Option<Self> {
        match (family, verb) {
            ("fs20", "send") => Some(Verb::Send(Protocol::Fs20)),
            #[cfg(feature = "fht")]
            ("fht", "send") => Some(Verb::Send(Protocol::Fht)),
            ("fs20", "setgain") => Some(Verb::SetGain),
            ("fs20", "setdrssi") => Some(Verb::SetDrssi),
            #[cfg(feature = "debug")]
            ("fs20", "setdebug") => Some(Verb::SetDebug),
            _ => None,
        }
    }
}

impl Command {
    /// Parses one command line.
    ///
    /// The command name is checked before its arguments, so an unknown
    /// command is reported as such whatever follows it.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let (Some(family), Some(verb)) = (words.next(), words.next()) else {
            return Err(ParseError::UnknownCommand);
        };
        let verb = Verb::lookup(family, verb).ok_or(ParseError::UnknownCommand)?;

        let mut args: heapless::Vec<&str, 4> = heapless::Vec::new();
        let mut count = 0;
        for word in words {
            count += 1;
            let _ = args.push(word);
        }
        if count > args.capacity() {
            return Err(ParseError::ArgumentCount(count));
        }

        match verb {
            Verb::Send(protocol) => parse_send(protocol, &args),
            Verb::SetGain => Ok(Command::SetGain(parse_single(&args, 10)?)),
            Verb::SetDrssi => Ok(Command::SetDrssi(parse_single(&args, 10)?)),
            #[cfg(feature = "debug")]
            Verb::SetDebug => Ok(Command::SetDebug(parse_single(&args, 16)?)),
        }
    }
}

fn parse_send(protocol: Protocol, args: &[&str]) -> Result<Command, ParseError> {
    if args.len() != 3 && args.len() != 4 {
        return Err(ParseError::ArgumentCount(args.len()));
    }
    let house_code = parse_hex(args[0], 0xffff)? as u16;
    let address = parse_hex(args[1], 0xff)? as u8;
    let command = parse_hex(args[2], 0xff)? as u8;
    let data = match args.get(3) {
        Some(arg) => parse_hex(arg, 0xff)? as u8,
        None => 0,
    };
    Ok(Command::Send(Frame::new(
        protocol, house_code, address, command, data,
    )))
}

fn parse_single(args: &[&str], radix: u32) -> Result<u8, ParseError> {
    let [arg] = args else {
        return Err(ParseError::ArgumentCount(args.len()));
    };
    let value = if radix == 16 {
        parse_hex(arg, 0xff)?
    } else {
        parse_number(arg, radix, 0xff)?
    };
    Ok(value as u8)
}

fn parse_hex(arg: &str, max: u32) -> Result<u32, ParseError> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    parse_number(digits, 16, max)
}

fn parse_number(digits: &str, radix: u32, max: u32) -> Result<u32, ParseError> {
    if digits.starts_with(['+', '-']) {
        return Err(ParseError::InvalidNumber);
    }
    let value = u32::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ParseError::OutOfRange,
        _ => ParseError::InvalidNumber,
    })?;
    if value > max {
        return Err(ParseError::OutOfRange);
    }
    Ok(value)
}
