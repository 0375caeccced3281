//! # ask868
//!
//! A portable, no_std Rust driver for FS20 and FHT home-automation radio
//! telegrams on HopeRF RFM12(B) 868 MHz transceivers.
//!
//! The RFM12 is used as a plain ASK modem: frames are bit-banged by keying
//! the transmitter on and off with precise timing, and reception relies on
//! the chip's demodulated data pin, whose edges are timestamped with an 8-bit
//! hardware counter.
//!
//! This crate provides:
//! - `embedded-hal` 1.0 based SPI access to the chip ([`radio::Rfm12`])
//! - the FS20/FHT frame encoder with parity and checksum ([`encoding`])
//! - a blocking transmit scheduler with frame repetition ([`driver::Fs20Driver`])
//! - an interrupt front-end that forwards edges and timeouts to a pulse
//!   decoder through a lock-free queue ([`receiver`])
//! - compile-time timer prescaler selection ([`timer`])
//! - a small text command surface ([`command`])
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `timer-isr` (default) | Global `critical_section` slot and macros for the receive interrupts |
//! | `fht` (default)       | Enables the `fht send` command |
//! | `debug`               | Enables the `fs20 setdebug` command |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ask868::driver::Fs20Driver;
//! use ask868::encoding::Protocol;
//! use ask868::radio::Rfm12;
//! use ask868::timer::TimingBase;
//!
//! const TIMING: TimingBase = TimingBase::new(16_000_000);
//!
//! let mut driver = Fs20Driver::new(Rfm12::new(spi, delay_us), Some(tx_led));
//! driver.init(&mut delay);
//! driver.init_receiver(&mut tc2, &TIMING, &mut decoder);
//!
//! driver.send(Protocol::Fs20, 0x1234, 0x05, 0x11, 0x00, &mut delay);
//! driver.handle_line("fs20 setgain 2", &mut delay)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Keying durations are produced by blocking delays; avoid long interrupt
//!   handlers while a frame is on air.
//! - The receive front-end must be fed from the data pin's edge interrupt and
//!   the capture counter's compare interrupt, see [`timer`].
//! - Only one front-end should be installed at a time in interrupt-driven mode.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;
pub use heapless;

pub(crate) mod checksum;
pub mod command;
pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod radio;
pub mod receiver;
pub mod report;
pub mod timer;
