//! Best-effort PDF segmentation anchored on text markers.
//!
//! The regions found here never overlap but are not guaranteed to cover the
//! file; they locate interesting structure without being able to rebuild
//! the document on their own.

use std::ops::Range;

use super::Segment;

pub const HEADER_LEN: usize = 100;

/// Fallback distance from the end when no trailer keyword exists
const TAIL_RESERVE: usize = 100;

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Locate header, `/Info` dictionary, body and trailer.
///
/// Marker hits inside an earlier region are pushed past it. The `/Info`
/// dictionary is dropped when it lies inside the body or trailer, which is
/// where most writers put it.
pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let header_end = HEADER_LEN.min(len);
    let mut segments = vec![Segment::new(
        "pdf_header",
        buffer,
        0..header_end,
        "PDF header with version information",
    )];

    let trailer = rfind(buffer, b"trailer")
        .map(|start| start.max(header_end)..len)
        .filter(|range| !range.is_empty());

    let body = find(buffer, b"stream", 0)
        .map(|start| {
            let end = trailer
                .as_ref()
                .map_or(len.saturating_sub(TAIL_RESERVE), |trailer| trailer.start);
            start.max(header_end)..end
        })
        .filter(|range| !range.is_empty());

    let metadata = find(buffer, b"/Info", 0).and_then(|start| {
        let end = find(buffer, b">>", start)? + 2;
        Some(start.max(header_end)..end)
    });

    if let Some(range) = metadata.filter(|range| {
        !range.is_empty()
            && [&body, &trailer]
                .into_iter()
                .flatten()
                .all(|other| !overlaps(range, other))
    }) {
        segments.push(Segment::new(
            "pdf_metadata",
            buffer,
            range,
            "PDF metadata including title, author, creation date",
        ));
    }

    if let Some(range) = body {
        segments.push(Segment::new(
            "pdf_body",
            buffer,
            range,
            "PDF content streams and objects",
        ));
    }

    if let Some(range) = trailer {
        segments.push(Segment::new(
            "pdf_trailer",
            buffer,
            range,
            "PDF trailer with cross-reference table",
        ));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::tests::names;

    /// Header line padded past the fixed header span
    fn preamble() -> Vec<u8> {
        let mut doc = b"%PDF-1.4\n%".to_vec();
        doc.extend([b'x'; HEADER_LEN]);
        doc.push(b'\n');
        doc
    }

    fn doc(objects: &[u8]) -> Vec<u8> {
        let mut doc = preamble();
        doc.extend(objects);
        doc
    }

    fn assert_disjoint(buffer: &[u8], segments: &[Segment<'_>]) {
        let mut sorted: Vec<_> = segments.iter().collect();
        sorted.sort_by_key(|s| s.offset);
        for pair in sorted.windows(2) {
            assert!(
                pair[0].end() <= pair[1].offset,
                "{} overlaps {}",
                pair[0].name,
                pair[1].name
            );
        }
        for s in segments {
            assert_eq!(s.data, &buffer[s.offset..s.end()], "{} misplaced", s.name);
        }
        let total: usize = segments.iter().map(Segment::len).sum();
        assert!(total <= buffer.len());
    }

    #[test]
    fn finds_all_regions() {
        let doc = doc(b"1 0 obj\n<< /Info << /Title (Hi) >> >>\nendobj\n\
2 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n\
trailer\n<< /Root 1 0 R >>\n%%EOF\n");
        let segments = extract(&doc);
        assert_eq!(
            names(&segments),
            ["pdf_header", "pdf_metadata", "pdf_body", "pdf_trailer"]
        );
        assert!(segments[1].data.starts_with(b"/Info"));
        assert!(segments[1].data.ends_with(b">>"));
        assert!(segments[2].data.starts_with(b"stream"));
        assert!(segments[3].data.starts_with(b"trailer"));
        assert_eq!(segments[3].end(), doc.len());
        assert_disjoint(&doc, &segments);
    }

    #[test]
    fn info_in_trailer_dictionary_is_not_duplicated() {
        let mut doc = b"%PDF-1.4\n1 0 obj\n<< /Length 200 >>\nstream\n".to_vec();
        doc.extend([b'q'; 200]);
        doc.extend(b"\nendstream\nendobj\ntrailer\n<< /Root 1 0 R /Info 3 0 R >>\n%%EOF\n");

        let segments = extract(&doc);
        assert_eq!(names(&segments), ["pdf_header", "pdf_body", "pdf_trailer"]);
        // `stream` sits inside the header, so the body starts after it
        assert_eq!(segments[1].offset, HEADER_LEN);
        assert_eq!(segments[1].end(), segments[2].offset);
        assert_disjoint(&doc, &segments);
    }

    #[test]
    fn markers_inside_the_header_are_skipped() {
        let doc = b"%PDF-1.4\n<< /Info << /Title (Hi) >> >>\nstream trailer";
        let segments = extract(doc);
        assert_eq!(names(&segments), ["pdf_header"]);
        assert_eq!(segments[0].len(), doc.len());
    }

    #[test]
    fn missing_regions_are_omitted() {
        let doc = b"%PDF-1.7\nnothing else here";
        let segments = extract(doc);
        assert_eq!(names(&segments), ["pdf_header"]);
        assert_eq!(segments[0].len(), doc.len());
    }

    #[test]
    fn body_without_trailer_stops_short_of_the_end() {
        let mut doc = b"%PDF-1.5\nstream\n".to_vec();
        doc.extend([b'x'; 300]);
        let segments = extract(&doc);

        let body = segments.iter().find(|s| s.name == "pdf_body").unwrap();
        assert_eq!(body.offset, HEADER_LEN);
        assert_eq!(body.end(), doc.len() - 100);
        assert_disjoint(&doc, &segments);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let mut doc = preamble();
        doc.extend(b"\xff\xfe\xfd/Info <<>> trailer");
        let segments = extract(&doc);
        assert_eq!(names(&segments), ["pdf_header", "pdf_metadata", "pdf_trailer"]);
        assert_disjoint(&doc, &segments);
    }
}
