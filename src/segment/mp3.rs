//! MP3 segmentation around ID3 tags.

use super::Segment;

const ID3V2_MAGIC: &[u8] = b"ID3";
const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_MAGIC: &[u8] = b"TAG";
pub const ID3V1_LEN: usize = 128;

/// Decode a 28-bit synchsafe integer (7 significant bits per byte).
pub fn synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Split an MP3 into optional ID3v2 tag, audio frames and optional ID3v1 tag.
///
/// Without an ID3v1 trailer the last 128 bytes stay part of the audio.
pub fn extract(buffer: &[u8]) -> Vec<Segment<'_>> {
    let len = buffer.len();
    let mut segments = Vec::with_capacity(3);
    let mut audio_start = 0;

    if buffer.starts_with(ID3V2_MAGIC) && len >= ID3V2_HEADER_LEN {
        let size = synchsafe([buffer[6], buffer[7], buffer[8], buffer[9]]);
        let tag_end = (size as usize + ID3V2_HEADER_LEN).min(len);
        segments.push(
            Segment::new(
                "id3v2_metadata",
                buffer,
                0..tag_end,
                "ID3v2 metadata tags (title, artist, album, etc.)",
            )
            .with("version", format!("2.{}.{}", buffer[3], buffer[4]))
            .with("size", size),
        );
        audio_start = tag_end;
    }

    let has_id3v1 = len >= ID3V1_LEN
        && len - ID3V1_LEN >= audio_start
        && buffer[len - ID3V1_LEN..].starts_with(ID3V1_MAGIC);
    let audio_end = if has_id3v1 { len - ID3V1_LEN } else { len };

    segments.push(Segment::new(
        "mp3_audio_data",
        buffer,
        audio_start..audio_end,
        "MP3 audio frames",
    ));

    if has_id3v1 {
        segments.push(
            Segment::new("id3v1_metadata", buffer, audio_end..len, "ID3v1 metadata tag")
                .with("version", "1.0"),
        );
    }

    segments
}
