//! Top-level ISO BMFF box walker for MP4 and QuickTime files.
//!
//! Only the outermost boxes are visited; nested boxes stay inside their
//! parent's segment.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

use super::{NameAllocator, Segment, fourcc};

/// Upper bound on boxes walked, so pathological inputs stay cheap
pub const MAX_BOXES: usize = 20;

const BOX_HEADER_LEN: usize = 8;

/// Header length when the 32-bit size is 1 and a 64-bit size follows
const LARGE_BOX_HEADER_LEN: usize = 16;

pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let mut names = NameAllocator::default();
    let mut segments = Vec::new();
    let mut offset = 0;

    while len - offset >= BOX_HEADER_LEN {
        if segments.len() == MAX_BOXES {
            debug!(offset, "box limit reached, stopping");
            break;
        }

        let remaining = (len - offset) as u64;
        let box_type = &buffer[offset + 4..offset + BOX_HEADER_LEN];
        let size = match BigEndian::read_u32(&buffer[offset..offset + 4]) {
            1 if remaining >= LARGE_BOX_HEADER_LEN as u64 => {
                BigEndian::read_u64(&buffer[offset + BOX_HEADER_LEN..offset + LARGE_BOX_HEADER_LEN])
            }
            size => size as u64,
        };

        if size < BOX_HEADER_LEN as u64 || size > remaining {
            warn!(offset, size, remaining, "malformed or truncated box, stopping");
            break;
        }

        // size <= remaining, which fits in usize
        let end = offset + size as usize;
        let type_name = fourcc(box_type);
        debug!(offset, atom = %type_name, size, "MP4 box");
        segments.push(
            Segment::new(
                names.tagged("mp4_atom_", box_type),
                buffer,
                offset..end,
                format!("MP4 {type_name} atom"),
            )
            .with("atomType", type_name)
            .with("atomSize", size),
        );
        offset = end;
    }

    if offset < len {
        segments.push(
            Segment::new(
                "mp4_trailing_data",
                buffer,
                offset..len,
                "Bytes after the last walked MP4 atom",
            )
            .with("length", len - offset),
        );
    }

    segments
}
