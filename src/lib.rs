#![no_std]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

//! ASCII-Serial-Com: a text-framed request/reply protocol for serial links
//! between a host and a resource-constrained microcontroller.
//!
//! A frame is `'>' ver app cmd data... '.' c0 c1 c2 c3 '\n'` — a leading
//! `>`, two version bytes, a one-byte command, up to [`MAX_DATA_LEN`] bytes
//! of payload, a `.`, a 4-hex-digit CRC-16/DNP of everything between `>`
//! and `.` inclusive, and a trailing `\n`. See [`frame`] for the codec and
//! [`dispatch`] for routing a decoded frame to a handler.
//!
//! This crate has no allocator dependency: [`ring::ByteRing`] is the only
//! buffering primitive, and every type that holds one is generic over a
//! `const N: usize` capacity fixed at compile time. `std` is only needed
//! for the host-side transport glue in [`io::host`] and the `asc-loopback`
//! binary, both gated behind the `std` feature.

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod crc16;
pub mod dispatch;
pub mod endpoint;
pub mod err;
pub mod frame;
pub mod hex;
pub mod io;
#[cfg(feature = "demo-register-table")]
pub mod regdemo;
pub mod registers;
pub mod ring;
pub mod stream;
pub mod timer;
pub mod volatile;

pub use config::{EndpointConfig, OverflowPolicy};
pub use dispatch::{CommandClass, CommandHandler, Dispatcher};
pub use endpoint::ProtocolEndpoint;
pub use err::{AscError, AscResult};
pub use frame::DecodedFrame;
pub use io::IsrInputRelay;
#[cfg(feature = "demo-register-table")]
pub use regdemo::DemoRegisterMap;
pub use registers::{RegWord, RegisterTable};
pub use ring::ByteRing;
pub use stream::{StreamProducer, StreamPump, StreamToggle};
pub use timer::{MillisecTimer, TimerUnit};
pub use volatile::VolatileReg;

/// Maximum payload length a single frame can carry. One byte short of the
/// gap left by the framing overhead (`>`, 2 version bytes, 1 command byte,
/// `.`, 4 CRC digits, `\n`) inside [`MAX_MESSAGE_LEN`].
pub const MAX_DATA_LEN: usize = 54;

/// Maximum length of a complete encoded frame, including all framing bytes.
pub const MAX_MESSAGE_LEN: usize = 64;
