//! Binary frame-set container (`.frames`).
//!
//! A frame set is the hand-off format between the preprocessing step (decode,
//! resample to mono 16 kHz, peak-normalize, slice into frames) and the feature
//! engine. Layout, all little endian:
//!
//! | offset | size | field         |
//! |--------|------|---------------|
//! | 0      | 8    | magic `FRAMES1\0` |
//! | 8      | 4    | `sample_rate` |
//! | 12     | 4    | `frame_len`   |
//! | 16     | 4    | `hop_len`     |
//! | 20     | 4    | `num_frames`  |
//! | 24     | 4·N  | `num_frames × frame_len` f32 samples, frame-major |
//!
//! The payload size is exact: short payloads and trailing bytes are rejected.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::slice::ChunksExact;

use serde::Serialize;

use crate::error::FrameSetError;

/// Format version tag at the start of every frame-set file.
pub const FRAME_MAGIC: [u8; 8] = *b"FRAMES1\0";

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 24;

/// Smallest usable frame length (the Hamming window needs two points).
pub const MIN_FRAME_LEN: u32 = 2;

const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// Upper bound on the payload buffer reserved before any payload is read.
/// Larger payloads grow as bytes actually arrive.
const PAYLOAD_PREALLOC_BYTES: usize = 64 * 1024 * 1024;

/// Metadata shared by every frame of one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    pub sample_rate: u32,
    pub frame_len: u32,
    pub hop_len: u32,
    pub num_frames: u32,
}

impl FrameHeader {
    /// Reject dimensions the engine cannot work with.
    pub fn validate(&self) -> Result<(), FrameSetError> {
        if self.sample_rate == 0 {
            return Err(FrameSetError::InvalidDimension {
                field: "sample_rate",
                value: self.sample_rate,
            });
        }
        if self.frame_len < MIN_FRAME_LEN {
            return Err(FrameSetError::InvalidDimension {
                field: "frame_len",
                value: self.frame_len,
            });
        }
        if self.hop_len == 0 {
            return Err(FrameSetError::InvalidDimension {
                field: "hop_len",
                value: self.hop_len,
            });
        }
        Ok(())
    }

    /// Total sample count of the payload, `None` on overflow.
    pub fn payload_samples(&self) -> Option<usize> {
        (self.frame_len as usize).checked_mul(self.num_frames as usize)
    }

    /// FFT size used for this recording (frame length rounded up to a power of two).
    pub fn fft_size(&self) -> usize {
        (self.frame_len as usize).next_power_of_two()
    }

    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..8].copy_from_slice(&FRAME_MAGIC);
        bytes[8..12].copy_from_slice(&self.sample_rate.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.frame_len.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.hop_len.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.num_frames.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Result<Self, FrameSetError> {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[..8]);
        if magic != FRAME_MAGIC {
            return Err(FrameSetError::BadMagic { found: magic });
        }

        let field = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        Ok(Self {
            sample_rate: field(8),
            frame_len: field(12),
            hop_len: field(16),
            num_frames: field(20),
        })
    }
}

/// All frames of one recording, held in memory for a single extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    header: FrameHeader,
    samples: Vec<f32>,
}

impl FrameSet {
    /// Build a frame set from a frame-major sample buffer.
    ///
    /// `samples.len()` must be a multiple of `frame_len`; the frame count is
    /// derived from it.
    pub fn new(
        sample_rate: u32,
        frame_len: u32,
        hop_len: u32,
        samples: Vec<f32>,
    ) -> Result<Self, FrameSetError> {
        let mut header = FrameHeader {
            sample_rate,
            frame_len,
            hop_len,
            num_frames: 0,
        };
        header.validate()?;

        let frame_len = frame_len as usize;
        if samples.len() % frame_len != 0 {
            let expected = (samples.len() / frame_len + 1) * frame_len * SAMPLE_BYTES;
            return Err(FrameSetError::TruncatedPayload {
                expected,
                actual: samples.len() * SAMPLE_BYTES,
            });
        }
        header.num_frames = frame_count(samples.len(), frame_len)?;

        check_finite(&samples, frame_len)?;
        Ok(Self { header, samples })
    }

    /// Read and validate a `.frames` file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, FrameSetError> {
        let file = File::open(path.as_ref()).map_err(|err| FrameSetError::Io {
            details: format!("failed to open {}: {err}", path.as_ref().display()),
        })?;
        Self::read_from(BufReader::new(file))
    }

    /// Decode a frame set from any byte source.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, FrameSetError> {
        let mut header_bytes = [0u8; HEADER_LEN];
        let bytes_read = read_fully(&mut reader, &mut header_bytes)?;
        if bytes_read < HEADER_LEN {
            return Err(FrameSetError::TruncatedHeader { bytes_read });
        }

        let header = FrameHeader::from_bytes(&header_bytes)?;
        header.validate()?;

        let total_samples =
            header
                .payload_samples()
                .ok_or(FrameSetError::AllocationFailed {
                    samples: usize::MAX,
                })?;
        let expected_bytes =
            total_samples
                .checked_mul(SAMPLE_BYTES)
                .ok_or(FrameSetError::AllocationFailed {
                    samples: total_samples,
                })?;

        // A header may claim far more than the source holds; such input ends
        // as TruncatedPayload below instead of an up-front allocation.
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(expected_bytes.min(PAYLOAD_PREALLOC_BYTES))
            .map_err(|_| FrameSetError::AllocationFailed {
                samples: total_samples,
            })?;
        let actual = (&mut reader)
            .take(expected_bytes as u64)
            .read_to_end(&mut payload)?;
        if actual < expected_bytes {
            return Err(FrameSetError::TruncatedPayload {
                expected: expected_bytes,
                actual,
            });
        }

        let extra_bytes = io::copy(&mut reader, &mut io::sink())? as usize;
        if extra_bytes > 0 {
            return Err(FrameSetError::TrailingData { extra_bytes });
        }

        let samples: Vec<f32> = payload
            .chunks_exact(SAMPLE_BYTES)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        check_finite(&samples, header.frame_len as usize)?;

        Ok(Self { header, samples })
    }

    /// Write the frame set to a file, replacing any existing content.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FrameSetError> {
        let file = File::create(path.as_ref()).map_err(|err| FrameSetError::Io {
            details: format!("failed to create {}: {err}", path.as_ref().display()),
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode header and payload.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FrameSetError> {
        writer.write_all(&self.header.to_bytes())?;
        for sample in &self.samples {
            writer.write_all(&sample.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    pub fn frame_len(&self) -> usize {
        self.header.frame_len as usize
    }

    pub fn num_frames(&self) -> usize {
        self.header.num_frames as usize
    }

    /// Samples of frame `index`, or `None` past the end.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let len = self.frame_len();
        let start = index.checked_mul(len)?;
        self.samples.get(start..start.checked_add(len)?)
    }

    /// Iterate frames in order.
    pub fn frames(&self) -> ChunksExact<'_, f32> {
        self.samples.chunks_exact(self.frame_len())
    }
}

/// Like `read_exact`, but reports how many bytes arrived before EOF.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Number of `frame_len`-sample frames in `total_samples`, as stored in the header.
fn frame_count(total_samples: usize, frame_len: usize) -> Result<u32, FrameSetError> {
    let num_frames = total_samples / frame_len;
    u32::try_from(num_frames).map_err(|_| FrameSetError::TooManyFrames { num_frames })
}

fn check_finite(samples: &[f32], frame_len: usize) -> Result<(), FrameSetError> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(pos) => Err(FrameSetError::NonFiniteSample {
            frame: pos / frame_len,
            index: pos % frame_len,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_set() -> FrameSet {
        let samples: Vec<f32> = (0..12).map(|i| i as f32 * 0.25 - 1.0).collect();
        FrameSet::new(16_000, 4, 2, samples).unwrap()
    }

    fn encode(set: &FrameSet) -> Vec<u8> {
        let mut bytes = Vec::new();
        set.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&sample_set());
        assert_eq!(bytes.len(), HEADER_LEN + 12 * 4);
        assert_eq!(&bytes[..8], b"FRAMES1\0");
        assert_eq!(u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 16_000);
        assert_eq!(u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 3);
    }

    #[test]
    fn test_write_then_read_preserves_frames() {
        let set = sample_set();
        let decoded = FrameSet::read_from(Cursor::new(encode(&set))).unwrap();
        assert_eq!(decoded, set);
        assert_eq!(decoded.num_frames(), 3);
        assert_eq!(decoded.frame(1).unwrap(), &[0.0, 0.25, 0.5, 0.75]);
        assert!(decoded.frame(3).is_none());
        assert_eq!(decoded.frames().count(), 3);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = encode(&sample_set());
        bytes[0] = b'X';
        match FrameSet::read_from(Cursor::new(bytes)) {
            Err(FrameSetError::BadMagic { found }) => assert_eq!(found[0], b'X'),
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_truncated_header() {
        let bytes = encode(&sample_set());
        let result = FrameSet::read_from(Cursor::new(bytes[..10].to_vec()));
        assert_eq!(result, Err(FrameSetError::TruncatedHeader { bytes_read: 10 }));
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let bytes = encode(&sample_set());
        let short = bytes[..bytes.len() - 3].to_vec();
        match FrameSet::read_from(Cursor::new(short)) {
            Err(FrameSetError::TruncatedPayload { expected, actual }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 45);
            }
            other => panic!("expected TruncatedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_header_claim_is_truncated_payload() {
        let header = FrameHeader {
            sample_rate: 16_000,
            frame_len: 1 << 20,
            hop_len: 160,
            num_frames: 1 << 20,
        };
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 64]);

        let err = FrameSet::read_from(Cursor::new(bytes.clone())).unwrap_err();
        assert_eq!(
            err,
            FrameSetError::TruncatedPayload {
                expected: (1usize << 40) * 4,
                actual: 64
            }
        );
        assert!(err.is_malformed_input());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.frames");
        std::fs::write(&path, &bytes).unwrap();
        assert!(matches!(
            FrameSet::read_file(&path),
            Err(FrameSetError::TruncatedPayload { actual: 64, .. })
        ));
    }

    #[test]
    fn test_frame_count_reports_real_count() {
        let total = (u32::MAX as usize + 5) * 2;
        assert_eq!(
            frame_count(total, 2),
            Err(FrameSetError::TooManyFrames {
                num_frames: u32::MAX as usize + 5
            })
        );
        assert_eq!(frame_count(12, 4), Ok(3));
    }

    #[test]
    fn test_rejects_trailing_data() {
        let mut bytes = encode(&sample_set());
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(
            FrameSet::read_from(Cursor::new(bytes)),
            Err(FrameSetError::TrailingData { extra_bytes: 2 })
        );
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let mut bytes = encode(&sample_set());
        bytes[16..20].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(
            FrameSet::read_from(Cursor::new(bytes)),
            Err(FrameSetError::InvalidDimension {
                field: "hop_len",
                value: 0
            })
        );

        assert!(matches!(
            FrameSet::new(0, 4, 2, vec![0.0; 8]),
            Err(FrameSetError::InvalidDimension {
                field: "sample_rate",
                ..
            })
        ));
        assert!(matches!(
            FrameSet::new(16_000, 1, 1, vec![0.0; 8]),
            Err(FrameSetError::InvalidDimension {
                field: "frame_len",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let mut samples = vec![0.0f32; 8];
        samples[5] = f32::NAN;
        assert_eq!(
            FrameSet::new(16_000, 4, 4, samples),
            Err(FrameSetError::NonFiniteSample { frame: 1, index: 1 })
        );
    }

    #[test]
    fn test_rejects_ragged_sample_buffer() {
        assert!(matches!(
            FrameSet::new(16_000, 4, 4, vec![0.0; 9]),
            Err(FrameSetError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_file_roundtrip_and_fft_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.frames");
        let set = FrameSet::new(16_000, 480, 160, vec![0.5; 480 * 3]).unwrap();
        set.write_file(&path).unwrap();

        let decoded = FrameSet::read_file(&path).unwrap();
        assert_eq!(decoded.header().fft_size(), 512);
        assert_eq!(decoded.num_frames(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            FrameSet::read_file("/no/such/recording.frames"),
            Err(FrameSetError::Io { .. })
        ));
    }
}
