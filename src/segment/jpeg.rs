//! JPEG segmentation.

use byteorder::{BigEndian, ByteOrder};

use super::Segment;

/// Fixed span of the leading header segment when there is no EXIF block
pub const HEADER_LEN: usize = 20;

/// Length of the SOI and EOI markers
const MARKER_LEN: usize = 2;

const APP1: &[u8] = &[0xFF, 0xE1];

/// Split a JPEG into header, optional EXIF block, image data and footer.
///
/// With an APP1 marker straight after SOI, the header shrinks to the SOI
/// marker and the APP1 segment (marker, length field and payload) follows
/// it. Buffers too short for the fixed layout yield empty middle segments.
pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let eoi_start = len.saturating_sub(MARKER_LEN);
    let mut segments = Vec::with_capacity(4);

    let exif_length = match buffer.get(2..4) {
        Some(marker) if marker == APP1 => buffer.get(4..6).map(BigEndian::read_u16),
        _ => None,
    };

    let body_start = match exif_length {
        Some(length) => {
            segments.push(
                Segment::new("jpeg_header", buffer, 0..MARKER_LEN, "JPEG file header with SOI marker")
                    .with("marker", "SOI (Start of Image)"),
            );
            // The length field counts itself but not the marker
            let exif_end = (MARKER_LEN + length as usize + 2).clamp(MARKER_LEN, eoi_start);
            segments.push(
                Segment::new(
                    "exif_metadata",
                    buffer,
                    MARKER_LEN..exif_end,
                    "EXIF metadata containing camera settings and GPS data",
                )
                .with("type", "EXIF")
                .with("length", length as u64),
            );
            exif_end
        }
        None => {
            let header_end = HEADER_LEN.min(len);
            segments.push(
                Segment::new("jpeg_header", buffer, 0..header_end, "JPEG file header with SOI marker")
                    .with("marker", "SOI (Start of Image)"),
            );
            header_end
        }
    };

    let footer_start = eoi_start.max(body_start);
    segments.push(Segment::new(
        "image_data",
        buffer,
        body_start..footer_start,
        "Compressed image data",
    ));
    segments.push(
        Segment::new("jpeg_footer", buffer, footer_start..len, "JPEG End of Image marker")
            .with("marker", "EOI (End of Image)"),
    );

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MetaValue;
    use crate::segment::tests::{assert_partition, names};

    fn jfif(body_len: usize) -> Vec<u8> {
        let mut jpeg = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
        ];
        jpeg.extend((0..body_len).map(|i| i as u8));
        jpeg.extend([0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn minimal_jfif() {
        let jpeg = jfif(40);
        let segments = extract(&jpeg);

        assert_eq!(names(&segments), ["jpeg_header", "image_data", "jpeg_footer"]);
        assert_eq!(segments[0].len(), 20);
        assert_eq!(segments[1].offset, 20);
        assert_eq!(segments[2].data, &[0xFF, 0xD9]);
        assert_eq!(segments[2].offset, jpeg.len() - 2);
        assert_partition(&jpeg, &segments);
    }

    #[test]
    fn exif_block_is_carved_after_soi() {
        // APP1 with a 16-byte length field (marker excluded)
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10];
        jpeg.extend(b"Exif\x00\x00MM\x00\x2A\x00\x00\x00\x08");
        jpeg.extend([0xFF, 0xDB, 0x00, 0x43, 0x00, 0x01, 0x02]);
        jpeg.extend([0xFF, 0xD9]);

        let segments = extract(&jpeg);
        assert_eq!(
            names(&segments),
            ["jpeg_header", "exif_metadata", "image_data", "jpeg_footer"]
        );
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].offset, 2);
        assert_eq!(segments[1].len(), 18);
        assert_eq!(segments[1].metadata["length"], MetaValue::Number(16));
        assert_eq!(segments[2].offset, 20);
        assert_partition(&jpeg, &segments);
    }

    #[test]
    fn oversized_exif_length_is_clamped() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xD9];
        let segments = extract(&jpeg);
        assert_eq!(segments[1].end(), 8);
        assert!(segments[2].is_empty());
        assert_partition(&jpeg, &segments);
    }

    #[test]
    fn short_buffers_do_not_panic() {
        for len in 0..22 {
            let jpeg = jfif(0)[..len.min(14)].to_vec();
            let segments = extract(&jpeg);
            assert_partition(&jpeg, &segments);
        }
    }
}
