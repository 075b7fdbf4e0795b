//! Archive II file reader

use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use memmap2::Mmap;
use tracing::debug;

use super::bzip;
use super::format::{
    COMPRESSION_RECORD_SIZE, CONTROL_WORD_SIZE, MARKERS_UNCOMPRESSED, MARKER_BZIP2, VOLUME_HEADER,
};
use super::source::{unwrap_container, ByteSource};
use crate::schema::Fields;
use crate::{DecodeError, Result};

/// Fixed 24-byte header at the start of every Archive II file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeHeader {
    /// Tape identifier, e.g. `AR2V0006.`
    pub tape: String,
    /// Volume sequence extension, e.g. `501`
    pub extension: String,
    /// Modified Julian date (day 1 is 1970-01-01)
    pub date: u32,
    /// Milliseconds past midnight
    pub time: u32,
    /// Four-letter radar station identifier
    pub icao: String,
}

impl VolumeHeader {
    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            tape: fields.text("tape")?,
            extension: fields.text("extension")?,
            date: fields.u32("date")?,
            time: fields.u32("time")?,
            icao: fields.text("icao")?,
        })
    }

    /// Volume creation time
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        super::nexrad_datetime(self.date, self.time)
    }
}

/// How the message stream is stored after the volume header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Records stored as-is
    None,
    /// Records stored as consecutive BZIP2 blocks
    Bzip2,
}

/// Volume header plus the uncompressed message stream
#[derive(Debug, Clone)]
pub struct Archive {
    /// Volume header
    pub header: VolumeHeader,
    /// Record compression found in the file
    pub compression: Compression,
    /// Message stream, starting at the first message header
    pub payload: Bytes,
}

impl Archive {
    /// Memory-map and unpack an Archive II file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or mapped, or is not a valid volume
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(DecodeError::Truncated {
                context: "volume header",
                offset: 0,
                needed: VOLUME_HEADER.size(),
                available: 0,
            });
        }

        let mmap = unsafe { Mmap::map(&file)? };
        debug!("Mapped {} ({} bytes)", path.display(), mmap.len());

        Self::from_source(ByteSource::new(Bytes::from_owner(mmap)))
    }

    /// Unpack an Archive II volume held in memory
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a valid volume
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        Self::from_source(ByteSource::new(bytes))
    }

    /// Unpack an Archive II volume from a byte source
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] for an unknown compression record or a
    /// corrupt gzip/BZIP2 stream, and [`DecodeError::Truncated`] if the fixed
    /// prefix is incomplete
    pub fn from_source(source: ByteSource) -> Result<Self> {
        let mut source = unwrap_container(source)?;

        let header_bytes = source.read(VOLUME_HEADER.size());
        let header = VolumeHeader::from_fields(&VOLUME_HEADER.decode(&header_bytes)?)?;

        let record = source.peek(COMPRESSION_RECORD_SIZE);
        if record.len() < CONTROL_WORD_SIZE + 2 {
            return Err(DecodeError::Truncated {
                context: "compression record",
                offset: source.position(),
                needed: COMPRESSION_RECORD_SIZE,
                available: record.len(),
            });
        }

        let marker = [record[CONTROL_WORD_SIZE], record[CONTROL_WORD_SIZE + 1]];
        let (compression, payload) = if marker == MARKER_BZIP2 {
            let blocks = source.read_to_end();
            (Compression::Bzip2, bzip::reassemble(&blocks)?)
        } else if MARKERS_UNCOMPRESSED.contains(&marker) {
            source.seek(source.position() + COMPRESSION_RECORD_SIZE);
            (Compression::None, source.read_to_end())
        } else {
            return Err(DecodeError::Format(format!(
                "Unknown compression record: marker {}",
                hex::encode(marker)
            )));
        };

        debug!(
            "Volume {} {}: {:?} records, {} byte message stream",
            header.icao,
            header.extension,
            compression,
            payload.len()
        );

        Ok(Self {
            header,
            compression,
            payload,
        })
    }
}
