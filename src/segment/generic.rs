//! Fallback segmentation for formats without a dedicated walker.

use super::Segment;

pub const HEADER_LEN: usize = 256;
pub const FOOTER_LEN: usize = 256;
pub const CHUNK_LEN: usize = 1024;
pub const MAX_CHUNKS: usize = 10;

/// Split into a header, at most ten body chunks and a footer.
///
/// Body chunks are 1 KiB unless the middle needs more than ten of them, in
/// which case they grow so that ten chunks still cover it. The footer is
/// only emitted for buffers longer than the header and never overlaps it.
pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let header_end = HEADER_LEN.min(len);
    let footer_start = if len > HEADER_LEN {
        len.saturating_sub(FOOTER_LEN).max(header_end)
    } else {
        len
    };

    let mut segments = vec![Segment::new(
        "file_header",
        buffer,
        0..header_end,
        "File header and signature",
    )];

    let chunk_len = CHUNK_LEN.max((footer_start - header_end).div_ceil(MAX_CHUNKS));
    let mut offset = header_end;
    let mut index = 1;
    while offset < footer_start {
        let end = (offset + chunk_len).min(footer_start);
        segments.push(Segment::new(
            format!("data_chunk_{index}"),
            buffer,
            offset..end,
            format!("Data chunk {index}"),
        ));
        offset = end;
        index += 1;
    }

    if len > HEADER_LEN {
        segments.push(Segment::new(
            "file_footer",
            buffer,
            footer_start..len,
            "File footer and trailing data",
        ));
    }

    segments
}
