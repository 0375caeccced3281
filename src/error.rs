//! Error types.

use thiserror::Error;

/// Why a command line was rejected. A rejected command has no side effect.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ParseError {
    /// The line does not start with a known command.
    #[error("unknown command")]
    UnknownCommand,
    /// Too few or too many arguments.
    #[error("wrong number of arguments: got {0}")]
    ArgumentCount(usize),
    /// An argument is not a number in the expected base.
    #[error("invalid number")]
    InvalidNumber,
    /// An argument does not fit its field.
    #[error("value out of range")]
    OutOfRange,
}
