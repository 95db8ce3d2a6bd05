//! Closed error enumeration shared by every module in this crate.
//!
//! The original C implementation uses a typed, non-local `Throw`/`Catch`
//! exception mechanism (`CException`-style). That maps directly onto
//! ordinary `Result<T, AscError>` propagation with `?`: every fallible
//! operation returns either its success value or one of these variants, and
//! the dispatcher is the single place that converts an `Err` into a
//! wire-visible error frame (see [`crate::dispatch`]).

use core::fmt;

/// Every way a core operation can fail. Mirrors `enum asc_exception` in the
/// original device firmware, minus the sentinel `NO_ERROR`/`UNKNOWN` values
/// (those never need to exist as a `Result::Err`).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AscError {
    /// Encode: payload length >= `MAX_DATA_LEN`.
    DataTooLong = 10,
    /// Could not locate the `>`/`.` bracket pair, or the computed CRC did
    /// not match the one on the wire.
    ChecksumProblem = 11,
    /// Frame had the right brackets but a malformed shape (bad CRC length,
    /// or the byte after the CRC wasn't `\n`).
    InvalidFrame = 12,
    /// No `.` found inside the framed region.
    InvalidFramePeriod = 13,
    /// A hex digit was not `[0-9A-Fa-f]`.
    NotHexChar = 19,
    /// Dispatcher had no handler bound for this command's class.
    CommandNotImplemented = 20,
    /// Register handler invoked with no state bound.
    RegBlockNull = 21,
    /// Register handler invoked with a command outside `{r, w}`.
    UnexpectedCommand = 22,
    /// Register request shorter than the 4 hex digits of a register number.
    DataTooShort = 23,
    /// Register number >= table length.
    RegnumOob = 24,
    /// Write payload too short to hold a full register value.
    RegvalLen = 25,
    /// `ByteRing::get` index >= size.
    CbOob = 50,
    /// Pop attempted on an empty `ByteRing`.
    CbPopEmpty = 51,
    /// Host-side read from the underlying transport failed.
    FileRead = 90,
    /// Host-side write to the underlying transport failed.
    FileWrite = 91,
}

impl AscError {
    /// The 2 hex-digit wire encoding used in error-frame payloads (§7.2).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AscError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::DataTooLong => "payload too long to encode",
            Self::ChecksumProblem => "could not compute or verify checksum",
            Self::InvalidFrame => "malformed frame structure",
            Self::InvalidFramePeriod => "no '.' found in frame",
            Self::NotHexChar => "non-hex character in hex field",
            Self::CommandNotImplemented => "no handler bound for command class",
            Self::RegBlockNull => "register handler invoked without state",
            Self::UnexpectedCommand => "command outside {r, w} sent to register handler",
            Self::DataTooShort => "payload too short to hold a register number",
            Self::RegnumOob => "register number out of range",
            Self::RegvalLen => "write payload too short for register width",
            Self::CbOob => "ring index out of range",
            Self::CbPopEmpty => "pop from empty ring",
            Self::FileRead => "transport read failed",
            Self::FileWrite => "transport write failed",
        };
        f.write_str(msg)
    }
}

#[cfg(not(feature = "std"))]
impl core::error::Error for AscError {}

#[cfg(feature = "std")]
impl std::error::Error for AscError {}

pub type AscResult<T> = Result<T, AscError>;

/// Converts a fallible operation's result into a wire-visible error frame
/// payload, the single conversion point called out in spec §7.2.
///
/// `cmd` and `data` are the original request's command byte and payload
/// (already truncated to at most `MAX_DATA_LEN` by the caller); the
/// returned tuple is `(error_code, cmd, data_prefix)` ready to hand to
/// [`crate::frame::encode_into`] with command `'e'`.
#[must_use]
pub fn error_frame_payload(err: AscError, cmd: u8, data: &[u8]) -> ([u8; 12], usize) {
    const MAX: usize = 12;
    let mut out = [0u8; MAX];
    let hex = crate::hex::encode_u8(err.code(), true);
    out[0] = hex[0];
    out[1] = hex[1];
    out[2] = cmd;
    let copy_len = core::cmp::min(data.len(), MAX - 3);
    out[3..3 + copy_len].copy_from_slice(&data[..copy_len]);
    (out, 3 + copy_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn code_matches_original_enum_values() {
        assert_eq!(AscError::DataTooLong.code(), 10);
        assert_eq!(AscError::CbPopEmpty.code(), 51);
        assert_eq!(AscError::FileWrite.code(), 91);
    }

    #[test]
    fn error_frame_payload_truncates_to_twelve_bytes() {
        let data = [b'x'; 54];
        let (payload, len) = error_frame_payload(AscError::RegnumOob, b'r', &data);
        assert_eq!(len, 12);
        assert_eq!(&payload[..2], b"18"); // 24 decimal == 0x18
        assert_eq!(payload[2], b'r');
        assert_eq!(&payload[3..12], &data[..9]);
    }

    #[test]
    fn error_frame_payload_short_data_not_padded_with_garbage() {
        let (payload, len) = error_frame_payload(AscError::NotHexChar, b'w', b"ab");
        assert_eq!(len, 5);
        assert_eq!(&payload[..len], b"13wab");
    }
}
