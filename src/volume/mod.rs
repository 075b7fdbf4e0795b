//! Decoded volume and its scan index

mod grid;
mod query;

pub use grid::GateGrid;
pub use query::{Location, MomentData, ScanInfo};

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::archive::{Archive, Compression, VolumeHeader};
use crate::config::DecodeOptions;
use crate::message::{frame_records, Radial, Record, VolumeCoveragePattern};
use crate::{DecodeError, Result};

/// Fewest radials an elevation needs to count as a scan
const MIN_SCAN_RADIALS: usize = 2;

/// Encoding of the radials a volume was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialFormat {
    /// Message 31 generic digital radar data
    Digital,
    /// Message 1 legacy digital radar data
    Legacy,
}

/// Radials sharing one elevation number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    /// Elevation number reported by the radials
    pub elevation_number: u16,
    /// Indices into the volume's radial list, in acquisition order
    pub radials: Vec<usize>,
}

/// A fully decoded Archive II volume
#[derive(Debug, Clone)]
pub struct Volume {
    header: VolumeHeader,
    compression: Compression,
    records: Vec<Record>,
    radials: Vec<usize>,
    format: RadialFormat,
    scans: Vec<Scan>,
    vcp: Option<usize>,
    options: DecodeOptions,
}

impl Volume {
    /// Decode a volume file with default options
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a usable volume
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &DecodeOptions::default())
    }

    /// Decode a volume file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a usable volume
    pub fn open_with(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
        Self::from_archive(Archive::open(path.as_ref())?, options)
    }

    /// Decode an in-memory volume with default options
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a usable volume
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with(bytes, &DecodeOptions::default())
    }

    /// Decode an in-memory volume
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a usable volume
    pub fn from_bytes_with(bytes: impl Into<Bytes>, options: &DecodeOptions) -> Result<Self> {
        Self::from_archive(Archive::from_bytes(bytes)?, options)
    }

    /// Frame and index an unpacked archive
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if the volume holds no radials, or
    /// holds no coverage pattern while `require_vcp` is set
    pub fn from_archive(archive: Archive, options: &DecodeOptions) -> Result<Self> {
        options.validate()?;

        let records = frame_records(&archive.payload)?;
        let (format, radials) = select_radials(&records)?;

        let vcp = records.iter().position(|r| r.coverage_pattern().is_some());
        if vcp.is_none() {
            if options.require_vcp {
                return Err(DecodeError::MissingData(
                    "No message 5 (volume coverage pattern) record found".to_string(),
                ));
            }
            warn!(
                "Volume {} has no coverage pattern; target angles are unavailable",
                archive.header.icao
            );
        }

        let scans = group_scans(&records, &radials);

        info!(
            "Decoded volume {} ({:?}): {} records, {} radials, {} scans",
            archive.header.icao,
            format,
            records.len(),
            radials.len(),
            scans.len()
        );

        Ok(Self {
            header: archive.header,
            compression: archive.compression,
            records,
            radials,
            format,
            scans,
            vcp,
            options: options.clone(),
        })
    }

    /// Volume header
    #[must_use]
    pub fn header(&self) -> &VolumeHeader {
        &self.header
    }

    /// Radar station identifier
    #[must_use]
    pub fn icao(&self) -> &str {
        &self.header.icao
    }

    /// Volume creation time
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.header.timestamp()
    }

    /// Record compression found in the file
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Options the volume was decoded with
    #[must_use]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Every framed record, including skipped message types
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records per message type
    #[must_use]
    pub fn message_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.header.msg_type).or_insert(0) += 1;
        }
        counts
    }

    /// Encoding of the radials used for queries
    #[must_use]
    pub fn radial_format(&self) -> RadialFormat {
        self.format
    }

    /// Volume coverage pattern, if the volume carried one
    #[must_use]
    pub fn vcp(&self) -> Option<&VolumeCoveragePattern> {
        self.vcp.and_then(|i| self.records[i].coverage_pattern())
    }

    /// Number of radials used for queries
    #[must_use]
    pub fn nradials(&self) -> usize {
        self.radials.len()
    }

    /// Radial by index into the volume's radial list
    #[must_use]
    pub fn radial(&self, index: usize) -> Option<&Radial> {
        self.radials
            .get(index)
            .and_then(|&record| self.records[record].radial())
    }

    /// Number of retained scans
    #[must_use]
    pub fn nscans(&self) -> usize {
        self.scans.len()
    }

    /// Retained scans in elevation order
    #[must_use]
    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }
}

/// Pick the radial records to index, preferring message 31
fn select_radials(records: &[Record]) -> Result<(RadialFormat, Vec<usize>)> {
    let of_kind = |digital: bool| -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| match r.radial() {
                Some(Radial::Digital(_)) => digital,
                Some(Radial::Legacy(_)) => !digital,
                None => false,
            })
            .map(|(i, _)| i)
            .collect()
    };

    let digital = of_kind(true);
    if !digital.is_empty() {
        return Ok((RadialFormat::Digital, digital));
    }

    let legacy = of_kind(false);
    if !legacy.is_empty() {
        return Ok((RadialFormat::Legacy, legacy));
    }

    Err(DecodeError::MissingData(
        "No message 31 or message 1 radial records found".to_string(),
    ))
}

/// Group radials by elevation number, dropping sparse elevations
fn group_scans(records: &[Record], radials: &[usize]) -> Vec<Scan> {
    let mut by_elevation: BTreeMap<u16, Vec<usize>> = BTreeMap::new();
    for (index, &record) in radials.iter().enumerate() {
        if let Some(radial) = records[record].radial() {
            by_elevation
                .entry(radial.elevation_number())
                .or_default()
                .push(index);
        }
    }

    by_elevation
        .into_iter()
        .filter_map(|(elevation_number, radials)| {
            if radials.len() < MIN_SCAN_RADIALS {
                debug!(
                    "Dropping elevation {} with {} radial(s)",
                    elevation_number,
                    radials.len()
                );
                return None;
            }
            Some(Scan {
                elevation_number,
                radials,
            })
        })
        .collect()
}
