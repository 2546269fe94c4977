//! Manifest model and reassembly.
//!
//! A [`Manifest`] is written once per conversion and is the only input
//! needed, together with the stored payloads, to rebuild the source file.
//! Its `parts` list keeps extraction order for readers; [`reassemble`]
//! never relies on it and orders by `offset` alone.

mod reassemble;
mod structures;

pub use reassemble::{Integrity, Reassembly, SegmentLoader, reassemble};
pub use structures::*;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::Error;
    use crate::format::{Classifier, FixedClock, MetaValue};
    use crate::segment;

    fn classifier() -> Classifier<FixedClock> {
        Classifier::with_clock(FixedClock(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        ))
    }

    fn jpeg() -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0, 1];
        jpeg.extend(0u8..=200);
        jpeg.extend([0xFF, 0xD9]);
        jpeg
    }

    /// Payloads keyed by storage file, as a store would hold them
    fn payloads(buffer: &[u8], manifest: &Manifest) -> HashMap<String, Vec<u8>> {
        manifest
            .parts
            .iter()
            .map(|part| {
                let start = part.offset as usize;
                let end = start + part.size as usize;
                (part.file.clone(), buffer[start..end].to_vec())
            })
            .collect()
    }

    fn loader(
        payloads: HashMap<String, Vec<u8>>,
    ) -> impl FnMut(&ManifestEntry) -> crate::Result<Vec<u8>> {
        move |entry| {
            payloads
                .get(&entry.file)
                .cloned()
                .ok_or_else(|| Error::MissingSegment(entry.file.clone()))
        }
    }

    #[test]
    fn build_records_every_segment() {
        let buffer = jpeg();
        let classification = classifier().classify(&buffer, "in.jpg");
        let segments = segment::extract(&buffer, &classification);
        let manifest = Manifest::build("in.jpg", &classification, &segments);

        assert_eq!(manifest.original_file, "in.jpg");
        assert_eq!(manifest.file_type, "JPEG");
        assert_eq!(manifest.extension, ".jpg");
        assert_eq!(manifest.total_size, buffer.len() as u64);
        assert_eq!(manifest.parts.len(), 3);
        assert_eq!(manifest.parts[0].file, "jpeg_header.hex");
        assert_eq!(manifest.parts[2].size, 2);
        assert_eq!(manifest.parts_size(), manifest.total_size);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let buffer = jpeg();
        let classification = classifier().classify(&buffer, "in.jpg");
        let segments = segment::extract(&buffer, &classification);
        let manifest = Manifest::build("in.jpg", &classification, &segments);

        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(json["originalFile"], "in.jpg");
        assert_eq!(json["fileType"], "JPEG");
        assert_eq!(json["totalSize"], buffer.len());
        assert_eq!(json["timestamp"], "2024-01-02T03:04:05.000Z");
        assert_eq!(json["parts"][0]["name"], "jpeg_header");
        assert_eq!(json["parts"][0]["metadata"]["marker"], "SOI (Start of Image)");

        let parsed = Manifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn timestamp_matches_classification_precision() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let classification = Classifier::with_clock(FixedClock(at)).classify(b"abc", "x");
        let manifest = Manifest::build("x", &classification, &[]);

        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(json["timestamp"], "2024-01-02T03:04:05.123Z");
        assert_eq!(
            json["timestamp"],
            classification.metadata["timestamp"].to_string()
        );
    }

    #[test]
    fn order_comes_from_offsets_not_listing() {
        let buffer = jpeg();
        let classification = classifier().classify(&buffer, "in.jpg");
        let segments = segment::extract(&buffer, &classification);
        let mut manifest = Manifest::build("in.jpg", &classification, &segments);
        manifest.parts.reverse();
        let listing: Vec<_> = manifest.parts.iter().map(|p| p.name.clone()).collect();

        let rebuilt = reassemble(&manifest, loader(payloads(&buffer, &manifest))).unwrap();
        assert_eq!(rebuilt.bytes, buffer);
        assert!(rebuilt.integrity.is_intact());

        // The caller's manifest keeps its listing order
        let after: Vec<_> = manifest.parts.iter().map(|p| p.name.clone()).collect();
        assert_eq!(after, listing);
    }

    #[test]
    fn size_mismatch_is_a_warning_not_an_error() {
        let buffer = jpeg();
        let classification = classifier().classify(&buffer, "in.jpg");
        let segments = segment::extract(&buffer, &classification);
        let mut manifest = Manifest::build("in.jpg", &classification, &segments);
        manifest.total_size += 7;

        let rebuilt = reassemble(&manifest, loader(payloads(&buffer, &manifest))).unwrap();
        assert_eq!(rebuilt.bytes, buffer);
        assert_eq!(
            rebuilt.integrity,
            Integrity::SizeMismatch {
                expected: buffer.len() as u64 + 7,
                actual: buffer.len() as u64,
            }
        );
    }

    #[test]
    fn loader_failures_propagate() {
        let buffer = jpeg();
        let classification = classifier().classify(&buffer, "in.jpg");
        let segments = segment::extract(&buffer, &classification);
        let manifest = Manifest::build("in.jpg", &classification, &segments);

        let mut payloads = payloads(&buffer, &manifest);
        payloads.remove("image_data.hex");
        match reassemble(&manifest, loader(payloads)) {
            Err(Error::MissingSegment(file)) => assert_eq!(file, "image_data.hex"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn foreign_numbers_in_metadata_are_accepted() {
        let json = r#"{
            "originalFile": "x", "fileType": "Unknown", "extension": ".bin",
            "totalSize": 2, "timestamp": "2024-01-02T03:04:05.000Z",
            "parts": [{
                "name": "a", "file": "a.hex", "description": "", "offset": 0, "size": 2,
                "metadata": { "count": 2, "delta": -3, "ratio": 0.5, "label": "x" }
            }]
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        let metadata = &manifest.parts[0].metadata;
        assert_eq!(metadata["count"], MetaValue::Number(2));
        assert_eq!(metadata["delta"], MetaValue::Decimal((-3i64).into()));
        assert_eq!(metadata["ratio"].to_string(), "0.5");
        assert_eq!(metadata["label"], MetaValue::Text("x".into()));

        let reparsed = Manifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn missing_offsets_default_to_zero_and_keep_listing_order() {
        let json = r#"{
            "originalFile": "x", "fileType": "Unknown", "extension": ".bin",
            "totalSize": 4, "timestamp": "2024-01-02T03:04:05Z",
            "parts": [
                { "name": "b", "file": "b.hex", "description": "", "size": 2 },
                { "name": "a", "file": "a.hex", "description": "", "size": 2 }
            ]
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        let mut payloads = HashMap::new();
        payloads.insert("b.hex".to_string(), vec![1, 2]);
        payloads.insert("a.hex".to_string(), vec![3, 4]);

        let rebuilt = reassemble(&manifest, loader(payloads)).unwrap();
        assert_eq!(rebuilt.bytes, [1, 2, 3, 4]);
        assert!(rebuilt.integrity.is_intact());
    }
}
