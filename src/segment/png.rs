//! PNG chunk walker.
//!
//! A PNG is an 8-byte signature followed by chunks laid out as
//! `length (u32 BE) | type (4 ASCII) | data (length bytes) | CRC (u32)`.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

use super::{NameAllocator, Segment, fourcc};

pub const SIGNATURE_LEN: usize = 8;

/// Length field plus type tag
const CHUNK_PREFIX_LEN: usize = 8;

/// Prefix plus trailing CRC
const CHUNK_OVERHEAD: usize = 12;

const IEND: &[u8] = b"IEND";

pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let mut names = NameAllocator::default();
    let mut segments = vec![Segment::new(
        "png_signature",
        buffer,
        0..SIGNATURE_LEN,
        "PNG file signature",
    )];

    let mut offset = SIGNATURE_LEN.min(len);
    while len - offset >= CHUNK_PREFIX_LEN {
        let data_len = BigEndian::read_u32(&buffer[offset..offset + 4]) as usize;
        let chunk_type = &buffer[offset + 4..offset + CHUNK_PREFIX_LEN];

        let end = match data_len
            .checked_add(CHUNK_OVERHEAD)
            .and_then(|span| offset.checked_add(span))
        {
            Some(end) if end <= len => end,
            _ => {
                warn!(offset, data_len, "PNG chunk runs past end of buffer, stopping");
                break;
            }
        };

        let type_name = fourcc(chunk_type);
        debug!(offset, chunk = %type_name, data_len, "PNG chunk");
        segments.push(
            Segment::new(
                names.tagged("png_chunk_", chunk_type),
                buffer,
                offset..end,
                format!("PNG {type_name} chunk"),
            )
            .with("chunkType", type_name)
            .with("dataLength", data_len),
        );
        offset = end;

        if chunk_type == IEND {
            break;
        }
    }

    if offset < len {
        segments.push(
            Segment::new(
                "png_trailing_data",
                buffer,
                offset..len,
                "Bytes after the last well-formed PNG chunk",
            )
            .with("length", len - offset),
        );
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MetaValue;
    use crate::segment::tests::{assert_partition, names};

    fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend(kind);
        out.extend(data);
        out.extend([0xDE, 0xAD, 0xBE, 0xEF]);
        out
    }

    fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut out = b"\x89PNG\r\n\x1a\n".to_vec();
        for c in chunks {
            out.extend(c);
        }
        out
    }

    #[test]
    fn walks_chunks_until_iend() {
        let file = png(&[chunk(b"IHDR", &[0; 13]), chunk(b"IEND", &[])]);
        let segments = extract(&file);

        assert_eq!(
            names(&segments),
            ["png_signature", "png_chunk_ihdr", "png_chunk_iend"]
        );
        assert_eq!(segments[1].offset, 8);
        assert_eq!(segments[1].len(), 25);
        assert_eq!(segments[1].metadata["chunkType"], MetaValue::Text("IHDR".into()));
        assert_eq!(segments[1].metadata["dataLength"], MetaValue::Number(13));
        assert_eq!(segments[2].len(), 12);
        assert_partition(&file, &segments);
    }

    #[test]
    fn bytes_after_iend_are_not_walked() {
        let mut file = png(&[chunk(b"IHDR", &[0; 13]), chunk(b"IEND", &[])]);
        file.extend(chunk(b"tEXt", b"appended"));

        let segments = extract(&file);
        assert_eq!(segments[2].name, "png_chunk_iend");
        assert_eq!(segments[3].name, "png_trailing_data");
        assert_eq!(segments.len(), 4);
        assert_partition(&file, &segments);
    }

    #[test]
    fn repeated_chunks_stay_distinct() {
        let file = png(&[
            chunk(b"IHDR", &[0; 13]),
            chunk(b"IDAT", &[1, 2, 3]),
            chunk(b"IDAT", &[4, 5, 6]),
            chunk(b"IEND", &[]),
        ]);
        let segments = extract(&file);
        assert_eq!(
            names(&segments),
            [
                "png_signature",
                "png_chunk_ihdr",
                "png_chunk_idat",
                "png_chunk_idat_2",
                "png_chunk_iend"
            ]
        );
        assert_partition(&file, &segments);
    }

    #[test]
    fn corrupt_length_stops_the_walk() {
        let mut file = png(&[chunk(b"IHDR", &[0; 13])]);
        file.extend([0xFF, 0xFF, 0xFF, 0xF0]);
        file.extend(b"IDAT");
        file.extend([0u8; 16]);

        let segments = extract(&file);
        assert_eq!(
            names(&segments),
            ["png_signature", "png_chunk_ihdr", "png_trailing_data"]
        );
        assert_partition(&file, &segments);
    }

    #[test]
    fn truncated_signature() {
        let file = b"\x89PNG".to_vec();
        let segments = extract(&file);
        assert_eq!(names(&segments), ["png_signature"]);
        assert_partition(&file, &segments);
    }
}
