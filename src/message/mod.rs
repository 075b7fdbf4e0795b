//! Typed Archive II messages
//!
//! The message stream is a sequence of records, each introduced by a
//! 16-byte [`MessageHeader`]. Radar data arrives either as message 31
//! (generic digital radar data, one block per moment) or, in older volumes, as
//! message 1 (legacy digital radar data with fixed REF/VEL/SW moments).
//! Message 5 carries the volume coverage pattern.

mod digital;
mod framer;
mod legacy;
mod moment;
mod vcp;

pub use digital::{DigitalHeader, DigitalRadial, ElevationBlock, RadialBlock, VolumeBlock};
pub use framer::frame_records;
pub use legacy::{LegacyHeader, LegacyRadial};
pub use moment::{scale_raw, Moment, MomentBlock, MIN_VALID_RAW};
pub use vcp::{Cut, DopplerSector, VcpHeader, VolumeCoveragePattern};

use chrono::{DateTime, Utc};

use crate::archive::format::{MESSAGE_HEADER, SEGMENTED_SIZE_SENTINEL};
use crate::Result;

/// Message type of legacy digital radar data
pub const MSG_LEGACY_RADIAL: u8 = 1;
/// Message type of the volume coverage pattern
pub const MSG_VCP: u8 = 5;
/// Message type of model data
pub const MSG_MODEL_DATA: u8 = 29;
/// Message type of generic digital radar data
pub const MSG_DIGITAL_RADIAL: u8 = 31;

/// Header preceding every message in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Message size in halfwords, or [`SEGMENTED_SIZE_SENTINEL`]
    pub size: u16,
    /// RDA redundant channel
    pub channels: u8,
    /// Message type
    pub msg_type: u8,
    /// Message sequence number
    pub seq_id: u16,
    /// Modified Julian date of generation
    pub date: u16,
    /// Milliseconds past midnight
    pub ms: u32,
    /// Number of segments
    pub segments: u16,
    /// Segment number
    pub seg_num: u16,
}

impl MessageHeader {
    /// Encoded size
    pub const SIZE: usize = MESSAGE_HEADER.size();

    /// Decode the header at `offset` within `buf`
    ///
    /// # Errors
    ///
    /// Returns [`crate::DecodeError::Truncated`] if fewer than 16 bytes remain
    pub fn decode_at(buf: &[u8], offset: usize) -> Result<Self> {
        let fields = MESSAGE_HEADER.decode_at(buf, offset)?;
        Ok(Self {
            size: fields.u16("size")?,
            channels: fields.u8("channels")?,
            msg_type: fields.u8("type")?,
            seq_id: fields.u16("seq_id")?,
            date: fields.u16("date")?,
            ms: fields.u32("ms")?,
            segments: fields.u16("segments")?,
            seg_num: fields.u16("seg_num")?,
        })
    }

    /// Size of a possibly segmented message
    ///
    /// Messages too large for the 16-bit size field store it across the
    /// segment count and segment number instead.
    #[must_use]
    pub fn segmented_size(&self) -> usize {
        if self.size == SEGMENTED_SIZE_SENTINEL {
            (usize::from(self.segments) << 16) | usize::from(self.seg_num)
        } else {
            usize::from(self.size)
        }
    }

    /// Generation time of the message
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        crate::archive::nexrad_datetime(u32::from(self.date), self.ms)
    }
}

/// One radial of radar data in either encoding
#[derive(Debug, Clone)]
pub enum Radial {
    /// Message 31
    Digital(Box<DigitalRadial>),
    /// Message 1
    Legacy(Box<LegacyRadial>),
}

impl Radial {
    /// Collection date (modified Julian)
    #[must_use]
    pub fn collect_date(&self) -> u16 {
        match self {
            Self::Digital(r) => r.header.collect_date,
            Self::Legacy(r) => r.header.collect_date,
        }
    }

    /// Collection time in milliseconds past midnight
    #[must_use]
    pub fn collect_ms(&self) -> u32 {
        match self {
            Self::Digital(r) => r.header.collect_ms,
            Self::Legacy(r) => r.header.collect_ms,
        }
    }

    /// Elevation number within the volume, starting at 1
    #[must_use]
    pub fn elevation_number(&self) -> u16 {
        match self {
            Self::Digital(r) => u16::from(r.header.elevation_number),
            Self::Legacy(r) => r.header.elevation_number,
        }
    }

    /// Azimuth angle in degrees
    #[must_use]
    pub fn azimuth(&self) -> f32 {
        match self {
            Self::Digital(r) => r.header.azimuth_angle,
            Self::Legacy(r) => r.azimuth(),
        }
    }

    /// Elevation angle in degrees
    #[must_use]
    pub fn elevation(&self) -> f32 {
        match self {
            Self::Digital(r) => r.header.elevation_angle,
            Self::Legacy(r) => r.elevation(),
        }
    }

    /// Block for a data moment, if this radial carries it
    #[must_use]
    pub fn moment(&self, moment: Moment) -> Option<&MomentBlock> {
        let blocks = match self {
            Self::Digital(r) => &r.moments,
            Self::Legacy(r) => &r.moments,
        };
        blocks.iter().find(|b| b.moment == moment)
    }

    /// All moment blocks carried by this radial
    #[must_use]
    pub fn moments(&self) -> &[MomentBlock] {
        match self {
            Self::Digital(r) => &r.moments,
            Self::Legacy(r) => &r.moments,
        }
    }

    /// Nyquist velocity in 0.01 m/s, if recorded
    #[must_use]
    pub fn nyquist_vel(&self) -> Option<i16> {
        match self {
            Self::Digital(r) => r.radial.as_ref().map(|b| b.nyquist_vel),
            Self::Legacy(r) => Some(r.header.nyquist_vel),
        }
    }

    /// Unambiguous range in 0.1 km, if recorded
    #[must_use]
    pub fn unambig_range(&self) -> Option<i16> {
        match self {
            Self::Digital(r) => r.radial.as_ref().map(|b| b.unambig_range),
            Self::Legacy(r) => Some(r.header.unambig_range),
        }
    }
}

/// Decoded content of a message
#[derive(Debug, Clone)]
pub enum MessageBody {
    /// Radar data
    Radial(Radial),
    /// Volume coverage pattern
    CoveragePattern(Box<VolumeCoveragePattern>),
    /// Message type with no decoder; only the header is kept
    Skipped,
}

/// One message from the stream
#[derive(Debug, Clone)]
pub struct Record {
    /// Byte offset of the message header within the message stream
    pub offset: usize,
    /// Message header
    pub header: MessageHeader,
    /// Decoded body
    pub body: MessageBody,
}

impl Record {
    /// The radial carried by this record, if any
    #[must_use]
    pub fn radial(&self) -> Option<&Radial> {
        match &self.body {
            MessageBody::Radial(radial) => Some(radial),
            _ => None,
        }
    }

    /// The coverage pattern carried by this record, if any
    #[must_use]
    pub fn coverage_pattern(&self) -> Option<&VolumeCoveragePattern> {
        match &self.body {
            MessageBody::CoveragePattern(vcp) => Some(vcp),
            _ => None,
        }
    }
}
