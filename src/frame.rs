//! ASC frame pack/unpack on top of [`ByteRing`] + CRC16DNP + hex (C4 in the
//! design doc).
//!
//! A frame on the wire is `'>' ver app cmd data... '.' c0 c1 c2 c3 '\n'`. The
//! decoder is a pure function of ring contents — no state is carried between
//! calls beyond what's already sitting in `in_buf` — which is what lets it
//! recover from partial, interrupted, and garbage-prefixed input across
//! repeated calls (spec §4.4's state machine).

use crate::crc16::crc16_dnp;
use crate::err::AscError;
use crate::hex;
use crate::ring::ByteRing;
use crate::{MAX_DATA_LEN, MAX_MESSAGE_LEN};

/// One fully decoded frame: version/app bytes, command, and its payload.
#[derive(Debug, Clone, Copy)]
pub struct DecodedFrame {
    pub ver: u8,
    pub app: u8,
    pub cmd: u8,
    data: [u8; MAX_DATA_LEN],
    data_len: usize,
}

impl DecodedFrame {
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len]
    }

    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data_len
    }
}

/// Encodes a frame and pushes it onto `out`. `data.len()` must be strictly
/// less than [`MAX_DATA_LEN`].
///
/// The CRC is computed over the *last* `>`/`.` pair found in `out` after the
/// new bytes are appended, so callers may queue several short frames into
/// the same ring before draining it (spec §4.4 "Encoding").
pub fn encode_into<const N: usize>(
    out: &mut ByteRing<N>,
    ver: u8,
    app: u8,
    cmd: u8,
    data: &[u8],
) -> Result<(), AscError> {
    if data.len() >= MAX_DATA_LEN {
        return Err(AscError::DataTooLong);
    }
    out.push_back(b'>');
    out.push_back(ver);
    out.push_back(app);
    out.push_back(cmd);
    out.push_back_block(data);
    out.push_back(b'.');

    let size = out.size();
    let i_start = out.find_last(b'>');
    let i_stop = out.find_last(b'.');
    if i_start >= size || i_stop >= size || i_stop <= i_start {
        return Err(AscError::ChecksumProblem);
    }

    let mut scratch = [0u8; N];
    let len = i_stop - i_start + 1;
    for (k, slot) in scratch[..len].iter_mut().enumerate() {
        *slot = out.get(i_start + k).expect("index within ring size");
    }
    let crc = crc16_dnp(&scratch[..len]);
    let crc_hex = hex::encode_u16(crc, true);
    out.push_back_block(&crc_hex);
    out.push_back(b'\n');
    Ok(())
}

/// Attempts to extract one frame from `in_buf`. Returns `Ok(None)` if a
/// complete frame isn't available yet (non-destructive besides dropping
/// leading garbage). Returns `Err` on a structurally invalid frame, having
/// already popped one byte so the next call makes progress (spec §7.3).
pub fn decode_from<const N: usize>(
    in_buf: &mut ByteRing<N>,
) -> Result<Option<DecodedFrame>, AscError> {
    drop_until_frame_start(in_buf);
    if in_buf.is_empty() {
        return Ok(None);
    }

    let nl_idx = in_buf.find_first(b'\n');
    if nl_idx == in_buf.size() {
        // Frame incomplete; leave buffer alone for the next call.
        return Ok(None);
    }

    let period_idx = in_buf.find_first(b'.');
    if period_idx == in_buf.size() || period_idx > nl_idx {
        let _ = in_buf.pop_front();
        return Err(AscError::InvalidFramePeriod);
    }

    let crc_start = period_idx + 1;
    let crc_end = crc_start + 4;
    if crc_end > nl_idx || crc_end != nl_idx {
        let _ = in_buf.pop_front();
        return Err(AscError::InvalidFrame);
    }

    let mut framed = [0u8; MAX_MESSAGE_LEN];
    let framed_len = period_idx + 1;
    if framed_len > framed.len() {
        let _ = in_buf.pop_front();
        return Err(AscError::InvalidFrame);
    }
    for (k, slot) in framed[..framed_len].iter_mut().enumerate() {
        *slot = in_buf.get(k).expect("index within ring size");
    }
    let computed_crc = crc16_dnp(&framed[..framed_len]);

    let mut crc_chars = [0u8; 4];
    for (k, slot) in crc_chars.iter_mut().enumerate() {
        *slot = in_buf.get(crc_start + k).expect("index within ring size");
    }
    let received_crc = match hex::decode_u16(&crc_chars) {
        Ok(v) => v,
        Err(e) => {
            let _ = in_buf.pop_front();
            return Err(e);
        }
    };
    if received_crc != computed_crc {
        let _ = in_buf.pop_front();
        return Err(AscError::ChecksumProblem);
    }

    if period_idx < 4 {
        let _ = in_buf.pop_front();
        return Err(AscError::InvalidFrame);
    }
    let data_len = period_idx - 4;
    if data_len > MAX_DATA_LEN {
        let _ = in_buf.pop_front();
        return Err(AscError::InvalidFrame);
    }
    let ver = in_buf.get(1).expect("index within ring size");
    let app = in_buf.get(2).expect("index within ring size");
    let cmd = in_buf.get(3).expect("index within ring size");
    let mut data = [0u8; MAX_DATA_LEN];
    for (k, slot) in data[..data_len].iter_mut().enumerate() {
        *slot = in_buf.get(4 + k).expect("index within ring size");
    }

    for _ in 0..=nl_idx {
        let _ = in_buf.pop_front();
    }

    Ok(Some(DecodedFrame {
        ver,
        app,
        cmd,
        data,
        data_len,
    }))
}

/// Drops leading bytes that aren't `>`, then discards any interrupted prior
/// partial frame in favor of a newer `>` that arrived before the current one
/// terminated (state machine transition `COLLECT --'>'--> COLLECT`).
fn drop_until_frame_start<const N: usize>(in_buf: &mut ByteRing<N>) {
    loop {
        while let Ok(b) = in_buf.get(0) {
            if b == b'>' {
                break;
            }
            let _ = in_buf.pop_front();
        }
        if in_buf.is_empty() {
            return;
        }

        let nl_idx = in_buf.find_first(b'\n');
        let mut interrupt_at = None;
        for i in 1..in_buf.size() {
            if in_buf.get(i).expect("index within ring size") == b'>' {
                if i < nl_idx {
                    interrupt_at = Some(i);
                }
                break;
            }
        }
        match interrupt_at {
            Some(i) => {
                for _ in 0..i {
                    let _ = in_buf.pop_front();
                }
            }
            None => return,
        }
    }
}
