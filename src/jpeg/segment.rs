//! Binary marker segment writer for JPEG byte streams.
//!
//! A JPEG stream starts with the two-byte SOI marker (`FF D8`) followed by a
//! sequence of marker segments. Every segment other than SOI/EOI/RSTn carries
//! a big-endian 16-bit length that counts itself plus the payload.
//!
//! This module only ever inserts one segment directly after SOI. It never
//! looks at the segments that follow, so quantization tables, Huffman tables
//! and scan data pass through byte-for-byte.
//!
//! ```text
//! FF D8 | FF <marker> | len_hi len_lo | payload ... | <rest of original stream>
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Start-of-image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// Marker byte of a comment (COM) segment.
pub const COM_MARKER: u8 = 0xFE;

/// Largest value the 16-bit length field can hold.
pub const MAX_SEGMENT_LENGTH: usize = u16::MAX as usize;

/// Returns `true` if `data` begins with the SOI marker.
pub fn has_soi(data: &[u8]) -> bool {
    data.len() >= SOI.len() && data[..2] == SOI
}

/// Insert a `FF <marker>` segment with `payload` right after the SOI marker.
///
/// Returns `None` (and leaves the caller's buffer alone) when `data` does not
/// start with SOI or when `2 + payload.len()` does not fit the length field.
pub fn insert_segment_after_soi(data: &[u8], marker: u8, payload: &[u8]) -> Option<Bytes> {
    if !has_soi(data) {
        return None;
    }

    let segment_length = 2 + payload.len();
    if segment_length > MAX_SEGMENT_LENGTH {
        return None;
    }

    let mut out = BytesMut::with_capacity(data.len() + 2 + segment_length);
    out.put_slice(&SOI);
    out.put_u8(0xFF);
    out.put_u8(marker);
    out.put_u16(segment_length as u16);
    out.put_slice(payload);
    out.put_slice(&data[2..]);

    Some(out.freeze())
}

/// Splice a COM segment carrying `comment` into a JPEG stream.
///
/// Non-JPEG input and comments too large for one segment come back unchanged.
pub fn inject_comment(jpeg: Bytes, comment: &str) -> Bytes {
    match insert_segment_after_soi(&jpeg, COM_MARKER, comment.as_bytes()) {
        Some(spliced) => spliced,
        None => {
            tracing::debug!(
                input_len = jpeg.len(),
                comment_len = comment.len(),
                "Comment segment not injected"
            );
            jpeg
        }
    }
}

/// Payload of a COM segment sitting directly after SOI, if there is one.
pub fn leading_comment(data: &[u8]) -> Option<&[u8]> {
    if !has_soi(data) || data.len() < 6 {
        return None;
    }
    if data[2] != 0xFF || data[3] != COM_MARKER {
        return None;
    }

    let segment_length = u16::from_be_bytes([data[4], data[5]]) as usize;
    if segment_length < 2 || data.len() < 4 + segment_length {
        return None;
    }

    Some(&data[6..4 + segment_length])
}
