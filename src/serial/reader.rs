//! # CRSF Frame Reader
//!
//! Pulls complete CRSF frames out of an async byte stream.
//!
//! Bytes are accumulated in a [`BytesMut`] buffer. Anything before a sync
//! byte is skipped, and a candidate frame with a bad length or CRC costs one
//! byte before the search resumes, so the reader recovers from line noise
//! and from joining a stream mid-frame.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::crsf::decoder::decode_frame;
use crate::crsf::protocol::{
    CrsfFrame, CRSF_MAX_FRAME_LENGTH, CRSF_MAX_FRAME_SIZE, CRSF_MIN_FRAME_LENGTH, CRSF_SYNC_BYTE,
};
use crate::error::Result;

/// Counters describing the health of the byte stream
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames that passed validation
    pub frames: u64,
    /// Candidate frames rejected by the decoder (mostly CRC failures)
    pub rejected_frames: u64,
    /// Bytes skipped while searching for a sync byte
    pub skipped_bytes: u64,
}

/// Frame extractor over any [`AsyncRead`] source
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
    stats: ReaderStats,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap a byte source
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(CRSF_MAX_FRAME_SIZE * 4),
            stats: ReaderStats::default(),
        }
    }

    /// Wait for the next valid frame
    ///
    /// # Returns
    ///
    /// * `Ok(Some(frame))` - Next frame that passed validation
    /// * `Ok(None)` - Source reached end of stream
    ///
    /// # Errors
    ///
    /// Returns error if reading from the source fails
    pub async fn next_frame(&mut self) -> Result<Option<CrsfFrame>> {
        loop {
            if let Some(frame) = self.extract_frame() {
                return Ok(Some(frame));
            }

            let read = self.inner.read_buf(&mut self.buf).await?;
            if read == 0 {
                if !self.buf.is_empty() {
                    debug!("Stream closed with {} unparsed bytes", self.buf.len());
                }
                return Ok(None);
            }
            trace!("Read {} bytes ({} buffered)", read, self.buf.len());
        }
    }

    /// Stream health counters
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    fn extract_frame(&mut self) -> Option<CrsfFrame> {
        loop {
            let sync = self.buf.iter().position(|&b| b == CRSF_SYNC_BYTE);
            match sync {
                Some(0) => {}
                Some(pos) => self.skip(pos),
                None => {
                    let len = self.buf.len();
                    self.skip(len);
                    return None;
                }
            }

            if self.buf.len() < 2 {
                return None;
            }

            let length = self.buf[1];
            if !(CRSF_MIN_FRAME_LENGTH..=CRSF_MAX_FRAME_LENGTH).contains(&length) {
                self.skip(1);
                continue;
            }

            let total = 2 + length as usize;
            if self.buf.len() < total {
                return None;
            }

            match decode_frame(&self.buf[..total]) {
                Ok(frame) => {
                    self.buf.advance(total);
                    self.stats.frames += 1;
                    return Some(frame);
                }
                Err(e) => {
                    debug!("Discarding frame candidate: {}", e);
                    self.stats.rejected_frames += 1;
                    self.skip(1);
                }
            }
        }
    }

    fn skip(&mut self, count: usize) {
        if count > 0 {
            self.buf.advance(count);
            self.stats.skipped_bytes += count as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::encoder::{encode_frame, encode_link_statistics_frame};
    use crate::crsf::protocol::{
        LinkStatistics, CRSF_FRAMETYPE_LINK_STATISTICS, CRSF_FRAMETYPE_RC_CHANNELS_PACKED,
    };
    use tokio_test::io::Builder;

    fn stats(uplink_lq: u8) -> LinkStatistics {
        LinkStatistics {
            uplink_rssi_1: 60,
            uplink_rssi_2: 62,
            uplink_lq,
            uplink_snr: 8,
            active_antenna: 0,
            rf_mode: 2,
            uplink_tx_power: 2,
            downlink_rssi: 70,
            downlink_lq: 100,
            downlink_snr: 6,
        }
    }

    #[tokio::test]
    async fn test_reads_consecutive_frames() {
        let mut bytes = encode_link_statistics_frame(&stats(100));
        bytes.extend(encode_frame(CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &[0u8; 22]).unwrap());

        let mock = Builder::new().read(&bytes).build();
        let mut reader = FrameReader::new(mock);

        let first = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(first.frame_type, CRSF_FRAMETYPE_LINK_STATISTICS);

        let second = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(second.frame_type, CRSF_FRAMETYPE_RC_CHANNELS_PACKED);

        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.stats().frames, 2);
        assert_eq!(reader.stats().skipped_bytes, 0);
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        let bytes = encode_link_statistics_frame(&stats(77));
        let (head, tail) = bytes.split_at(5);

        let mock = Builder::new().read(head).read(tail).build();
        let mut reader = FrameReader::new(mock);

        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.payload[2], 77);
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skips_leading_garbage() {
        let mut bytes = vec![0x00, 0x11, 0x22];
        bytes.extend(encode_link_statistics_frame(&stats(55)));

        let mock = Builder::new().read(&bytes).build();
        let mut reader = FrameReader::new(mock);

        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.payload[2], 55);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.stats().skipped_bytes, 3);
    }

    #[tokio::test]
    async fn test_resyncs_after_corrupt_frame() {
        let mut corrupt = encode_link_statistics_frame(&stats(10));
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xFF;

        let mut bytes = corrupt;
        bytes.extend(encode_link_statistics_frame(&stats(90)));

        let mock = Builder::new().read(&bytes).build();
        let mut reader = FrameReader::new(mock);

        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.payload[2], 90);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert!(reader.stats().rejected_frames >= 1);
        assert_eq!(reader.stats().frames, 1);
    }

    #[tokio::test]
    async fn test_sync_byte_with_bad_length_is_skipped() {
        let mut bytes = vec![CRSF_SYNC_BYTE, 0x00];
        bytes.extend(encode_link_statistics_frame(&stats(64)));

        let mock = Builder::new().read(&bytes).build();
        let mut reader = FrameReader::new(mock);

        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.payload[2], 64);
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncated_frame_at_end_of_stream() {
        let bytes = encode_link_statistics_frame(&stats(100));

        let mock = Builder::new().read(&bytes[..8]).build();
        let mut reader = FrameReader::new(mock);

        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.stats().frames, 0);
    }

    #[tokio::test]
    async fn test_read_error_is_propagated() {
        let mock = Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
            .build();
        let mut reader = FrameReader::new(mock);

        assert!(reader.next_frame().await.is_err());
    }
}
