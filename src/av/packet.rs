use bytes::{Buf, Bytes, BytesMut};

use super::{MediaFormat, INVALID_TIME};

/// One demuxed data unit with its timing and discontinuity metadata.
///
/// A packet has exactly one owner. It is deliberately not `Clone`: the
/// producer hands it over to the consumer by value.
#[derive(Debug)]
pub struct Packet {
    /// PID of the elementary stream this unit belongs to
    pub stream_id: u32,
    /// Timeline break before this unit
    pub discontinuity: bool,
    /// Safe random-access start
    pub sync_point: bool,
    /// May be concatenated with the next packet of the same stream
    pub appendable: bool,
    /// Start time in 100 ns ticks, or [`INVALID_TIME`]
    pub start_time: i64,
    /// Stop time in 100 ns ticks, or [`INVALID_TIME`]
    pub stop_time: i64,
    /// Present only when the stream format changes starting at this unit
    pub media_format: Option<Box<MediaFormat>>,
    data: BytesMut,
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            stream_id: 0,
            discontinuity: false,
            sync_point: false,
            appendable: false,
            start_time: INVALID_TIME,
            stop_time: INVALID_TIME,
            media_format: None,
            data: BytesMut::new(),
        }
    }
}

impl Packet {
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        let mut packet = Self::default();
        packet.set_data(data.as_ref());
        packet
    }

    /// An empty packet carrying only metadata, e.g. a discontinuity marker.
    pub fn marker(stream_id: u32) -> Self {
        Self::default().with_stream_id(stream_id).with_discontinuity(true)
    }

    pub fn with_stream_id(mut self, stream_id: u32) -> Self {
        self.stream_id = stream_id;
        self
    }

    pub fn with_times(mut self, start_time: i64, stop_time: i64) -> Self {
        self.start_time = start_time;
        self.stop_time = stop_time;
        self
    }

    pub fn with_sync_point(mut self, sync_point: bool) -> Self {
        self.sync_point = sync_point;
        self
    }

    pub fn with_discontinuity(mut self, discontinuity: bool) -> Self {
        self.discontinuity = discontinuity;
        self
    }

    pub fn with_appendable(mut self, appendable: bool) -> Self {
        self.appendable = appendable;
        self
    }

    pub fn with_media_format(mut self, format: MediaFormat) -> Self {
        self.media_format = Some(Box::new(format));
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Empty means no payload, whatever the metadata says.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn get_at(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    pub fn has_time(&self) -> bool {
        self.start_time != INVALID_TIME
    }

    /// Replaces the payload with a copy of `data`.
    pub fn set_data(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }

    /// Resizes the payload, zero-filling growth and truncating on shrink.
    pub fn set_data_size(&mut self, len: usize) {
        self.data.resize(len, 0);
    }

    /// Concatenates `other`'s payload onto this one.
    pub fn append(&mut self, other: &Packet) {
        self.append_data(&other.data);
    }

    pub fn append_data(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Discards the first `count` bytes, clamped to the current size.
    pub fn remove_head(&mut self, count: usize) {
        let count = count.min(self.data.len());
        self.data.advance(count);
    }

    /// Detaches the format descriptor so the packet can be forwarded without it.
    pub fn take_media_format(&mut self) -> Option<Box<MediaFormat>> {
        self.media_format.take()
    }

    /// Freezes the payload for zero-copy hand-off.
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::CodecType;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_new_packet_has_no_time() {
        let packet = Packet::default();
        assert!(packet.is_empty());
        assert_eq!(packet.start_time, INVALID_TIME);
        assert_eq!(packet.stop_time, INVALID_TIME);
        assert!(!packet.has_time());
        assert!(packet.media_format.is_none());
    }

    #[test]
    fn test_marker_keeps_metadata_when_empty() {
        let packet = Packet::marker(7).with_times(100, 200);
        assert!(packet.is_empty());
        assert!(packet.discontinuity);
        assert_eq!(packet.stream_id, 7);
        assert_eq!(packet.start_time, 100);
    }

    #[test]
    fn test_set_data_replaces_payload() {
        let mut packet = Packet::new([1u8, 2, 3, 4]);
        packet.set_data(&[9, 8]);
        assert_eq!(packet.data(), &[9, 8]);
        assert_eq!(packet.size(), 2);
        assert_eq!(packet.get_at(1), Some(8));
        assert_eq!(packet.get_at(2), None);
    }

    #[test]
    fn test_set_data_size() {
        let mut packet = Packet::new([1u8, 2, 3]);
        packet.set_data_size(5);
        assert_eq!(packet.data(), &[1, 2, 3, 0, 0]);
        packet.set_data_size(1);
        assert_eq!(packet.data(), &[1]);
    }

    #[test]
    fn test_remove_head_clamps() {
        let mut packet = Packet::new([1u8, 2, 3]);
        packet.remove_head(1);
        assert_eq!(packet.data(), &[2, 3]);
        packet.remove_head(10);
        assert!(packet.is_empty());
        packet.remove_head(1);
        assert!(packet.is_empty());
    }

    #[test]
    fn test_media_format_travels_with_packet() {
        let format = MediaFormat::new(CodecType::AAC).with_audio(48000, 2);
        let mut packet = Packet::new([0u8; 4]).with_media_format(format);
        let format = packet.take_media_format().unwrap();
        assert_eq!(format.sample_rate, Some(48000));
        assert!(packet.media_format.is_none());
    }

    #[quickcheck]
    fn prop_append_concatenates(a: Vec<u8>, b: Vec<u8>) -> bool {
        let mut first = Packet::new(&a);
        let second = Packet::new(&b);
        first.append(&second);

        let mut expected = a.clone();
        expected.extend_from_slice(&b);
        first.data() == expected.as_slice() && first.size() == a.len() + b.len()
    }

    #[quickcheck]
    fn prop_remove_head_keeps_tail(data: Vec<u8>, n: usize) -> bool {
        let mut packet = Packet::new(&data);
        packet.remove_head(n);
        if n >= data.len() {
            packet.is_empty()
        } else {
            packet.data() == &data[n..] && packet.size() == data.len() - n
        }
    }

    #[test]
    fn test_into_bytes() {
        let mut packet = Packet::new([1u8, 2, 3, 4]);
        packet.remove_head(2);
        assert_eq!(packet.into_bytes(), Bytes::from_static(&[3, 4]));
    }
}
