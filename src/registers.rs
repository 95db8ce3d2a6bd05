//! Register read/write handler (C6 in the design doc), bound to a
//! [`crate::dispatch::Dispatcher`] for the `r`/`w` command class.
//!
//! Grounded on `ascii_serial_com_register_pointers.c`: a table of optional
//! register slots plus a parallel table of write masks, addressed by a
//! 4-hex-digit register number at the front of the payload. Two differences
//! from the original:
//!
//! - Writes apply `new = (old & !mask) | (written & mask)` instead of
//!   overwriting the whole register — the original computed masks but never
//!   actually applied them to the write path, which is the kind of bug
//!   reimplementing in a memory-safe language gives us a chance to fix.
//! - A reply is built fresh rather than splicing hex digits into the
//!   original request buffer in place, since we no longer need to economize
//!   on a single shared C buffer.

use crate::dispatch::CommandHandler;
use crate::err::AscError;
use crate::hex;
use crate::ring::ByteRing;
use crate::volatile::VolatileReg;
use crate::{frame, MAX_DATA_LEN, MAX_MESSAGE_LEN};

/// A fixed-width register value that can be hex-encoded/decoded and
/// masked-merged. Implemented here for `u8`, `u16`, and `u32` — the three
/// widths the original firmware supported (`REGWIDTHBYTES` 1, 2, 4).
pub trait RegWord: Copy + Default {
    /// Number of hex characters in the wire encoding (2x the byte width).
    const HEX_LEN: usize;

    fn encode_hex(self, out: &mut [u8]);
    fn decode_hex(input: &[u8]) -> Result<Self, AscError>;
    fn masked_merge(old: Self, written: Self, mask: Self) -> Self;
}

impl RegWord for u8 {
    const HEX_LEN: usize = 2;
    fn encode_hex(self, out: &mut [u8]) {
        out[..2].copy_from_slice(&hex::encode_u8(self, true));
    }
    fn decode_hex(input: &[u8]) -> Result<Self, AscError> {
        hex::decode_u8(input)
    }
    fn masked_merge(old: Self, written: Self, mask: Self) -> Self {
        (old & !mask) | (written & mask)
    }
}

impl RegWord for u16 {
    const HEX_LEN: usize = 4;
    fn encode_hex(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&hex::encode_u16(self, true));
    }
    fn decode_hex(input: &[u8]) -> Result<Self, AscError> {
        hex::decode_u16(input)
    }
    fn masked_merge(old: Self, written: Self, mask: Self) -> Self {
        (old & !mask) | (written & mask)
    }
}

impl RegWord for u32 {
    const HEX_LEN: usize = 8;
    fn encode_hex(self, out: &mut [u8]) {
        out[..8].copy_from_slice(&hex::encode_u32(self, true));
    }
    fn decode_hex(input: &[u8]) -> Result<Self, AscError> {
        hex::decode_u32(input)
    }
    fn masked_merge(old: Self, written: Self, mask: Self) -> Self {
        (old & !mask) | (written & mask)
    }
}

/// `N` optional register slots plus their write masks. A `None` slot reads
/// as `T::default()` and silently discards writes, mirroring a null pointer
/// entry in the original `REGTYPE **pointers` table.
pub struct RegisterTable<'a, T: RegWord, const N: usize> {
    slots: [Option<VolatileReg<'a, T>>; N],
    write_masks: [T; N],
}

impl<'a, T: RegWord, const N: usize> RegisterTable<'a, T, N> {
    #[must_use]
    pub fn new(slots: [Option<VolatileReg<'a, T>>; N], write_masks: [T; N]) -> Self {
        Self { slots, write_masks }
    }

    /// Binds register `reg_num` to `reg`. Used to wire up a table piecemeal
    /// instead of constructing the whole array up front.
    pub fn bind(&mut self, reg_num: usize, reg: VolatileReg<'a, T>, write_mask: T) {
        self.slots[reg_num] = Some(reg);
        self.write_masks[reg_num] = write_mask;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        N
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Handles one `r` or `w` request payload and writes the reply payload
    /// into `reply_out`, returning how many bytes were written.
    ///
    /// Payload shape: `RRRR` (4 hex digit register number) for a read,
    /// `RRRR,VVVV...` for a write. Reply shape: `RRRR,VVVV...` for a read
    /// (echoing the post-read value), `RRRR` for a write (echoing the
    /// register number, matching the original's write acknowledgment).
    pub fn handle_request(
        &mut self,
        cmd: u8,
        data: &[u8],
        reply_out: &mut [u8],
    ) -> Result<usize, AscError> {
        if cmd != b'r' && cmd != b'w' {
            return Err(AscError::UnexpectedCommand);
        }
        if data.len() < 4 {
            return Err(AscError::DataTooShort);
        }
        let reg_num = hex::decode_u16(&data[0..4])? as usize;
        if reg_num >= N {
            return Err(AscError::RegnumOob);
        }

        if cmd == b'r' {
            let val = match &self.slots[reg_num] {
                Some(reg) => reg.read(),
                None => T::default(),
            };
            reply_out[0..4].copy_from_slice(&data[0..4]);
            reply_out[4] = b',';
            val.encode_hex(&mut reply_out[5..5 + T::HEX_LEN]);
            Ok(5 + T::HEX_LEN)
        } else {
            let value_start = 5;
            if data.len() < value_start + T::HEX_LEN {
                return Err(AscError::RegvalLen);
            }
            let written = T::decode_hex(&data[value_start..value_start + T::HEX_LEN])?;
            let mask = self.write_masks[reg_num];
            if let Some(reg) = &mut self.slots[reg_num] {
                let old = reg.read();
                reg.write(T::masked_merge(old, written, mask));
            }
            reply_out[0..4].copy_from_slice(&data[0..4]);
            Ok(4)
        }
    }
}

impl<'a, T: RegWord, const N: usize> CommandHandler for RegisterTable<'a, T, N> {
    fn handle(
        &mut self,
        out_buf: &mut ByteRing<MAX_MESSAGE_LEN>,
        ver: u8,
        app: u8,
        cmd: u8,
        data: &[u8],
    ) -> Result<(), AscError> {
        let mut reply = [0u8; MAX_DATA_LEN];
        let len = self.handle_request(cmd, data, &mut reply)?;
        frame::encode_into(out_buf, ver, app, cmd, &reply[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_unbound_register_returns_default() {
        let mut table: RegisterTable<u32, 4> = RegisterTable::new([None, None, None, None], [0; 4]);
        let mut reply = [0u8; 16];
        let n = table.handle_request(b'r', b"0002", &mut reply).unwrap();
        assert_eq!(&reply[..n], b"0002,00000000");
    }

    #[test]
    fn read_bound_register() {
        let mut backing: u32 = 0xDEADBEEF;
        let slots = [None, Some(VolatileReg::from_mut(&mut backing)), None, None];
        let mut table: RegisterTable<u32, 4> = RegisterTable::new(slots, [0; 4]);
        let mut reply = [0u8; 16];
        let n = table.handle_request(b'r', b"0001", &mut reply).unwrap();
        assert_eq!(&reply[..n], b"0001,DEADBEEF");
    }

    #[test]
    fn write_unbound_register_is_silently_discarded() {
        let mut table: RegisterTable<u32, 2> = RegisterTable::new([None, None], [0xFFFF_FFFF; 2]);
        let mut reply = [0u8; 16];
        let n = table.handle_request(b'w', b"0000,FFFFFFFF", &mut reply).unwrap();
        assert_eq!(&reply[..n], b"0000");
    }

    #[test]
    fn write_applies_mask_as_read_modify_write() {
        let mut backing: u8 = 0b1111_0000;
        let slots = [Some(VolatileReg::from_mut(&mut backing))];
        // Only the low nibble is writable.
        let mut table: RegisterTable<u8, 1> = RegisterTable::new(slots, [0x0F]);
        let mut reply = [0u8; 16];
        table.handle_request(b'w', b"0000,FF", &mut reply).unwrap();
        assert_eq!(backing, 0b1111_1111);
    }

    #[test]
    fn write_mask_protects_reserved_bits_even_from_all_zero_write() {
        let mut backing: u8 = 0b1111_0000;
        let slots = [Some(VolatileReg::from_mut(&mut backing))];
        let mut table: RegisterTable<u8, 1> = RegisterTable::new(slots, [0x0F]);
        let mut reply = [0u8; 16];
        table.handle_request(b'w', b"0000,00", &mut reply).unwrap();
        assert_eq!(backing, 0b1111_0000);
    }

    #[test]
    fn regnum_out_of_bounds() {
        let mut table: RegisterTable<u16, 2> = RegisterTable::new([None, None], [0; 2]);
        let mut reply = [0u8; 16];
        assert_eq!(
            table.handle_request(b'r', b"0005", &mut reply).unwrap_err(),
            AscError::RegnumOob
        );
    }

    #[test]
    fn data_too_short_for_regnum() {
        let mut table: RegisterTable<u16, 2> = RegisterTable::new([None, None], [0; 2]);
        let mut reply = [0u8; 16];
        assert_eq!(
            table.handle_request(b'r', b"01", &mut reply).unwrap_err(),
            AscError::DataTooShort
        );
    }

    #[test]
    fn write_payload_too_short_for_value_width() {
        let mut table: RegisterTable<u32, 1> = RegisterTable::new([None], [0; 1]);
        let mut reply = [0u8; 16];
        assert_eq!(
            table.handle_request(b'w', b"0000,ABCD", &mut reply).unwrap_err(),
            AscError::RegvalLen
        );
    }

    #[test]
    fn rejects_commands_outside_r_w() {
        let mut table: RegisterTable<u16, 1> = RegisterTable::new([None], [0; 1]);
        let mut reply = [0u8; 16];
        assert_eq!(
            table.handle_request(b's', b"0000", &mut reply).unwrap_err(),
            AscError::UnexpectedCommand
        );
    }

    #[test]
    fn command_handler_impl_queues_a_full_reply_frame() {
        let mut backing: u16 = 0x1234;
        let slots = [Some(VolatileReg::from_mut(&mut backing))];
        let mut table: RegisterTable<u16, 1> = RegisterTable::new(slots, [0; 1]);
        let mut out: ByteRing<MAX_MESSAGE_LEN> = ByteRing::new();
        CommandHandler::handle(&mut table, &mut out, b'0', b'0', b'r', b"0000").unwrap();
        let decoded = frame::decode_from(&mut out).unwrap().unwrap();
        assert_eq!(decoded.cmd, b'r');
        assert_eq!(decoded.data(), b"0000,1234");
    }
}
