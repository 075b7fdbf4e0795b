//! Scan, angle, time and gate queries

use chrono::{DateTime, Utc};

use super::{GateGrid, RadialFormat, Volume};
use crate::archive::nexrad_datetime;
use crate::message::{scale_raw, Moment, MomentBlock, Radial};
use crate::{DecodeError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;
const NYQUIST_SCALE: f32 = 0.01;
const UNAMBIGUOUS_RANGE_SCALE: f32 = 100.0;

/// Radar site position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    /// Latitude (deg)
    pub latitude: f32,
    /// Longitude (deg)
    pub longitude: f32,
    /// Antenna height above sea level (m)
    pub height: i32,
}

/// Geometry of one scan, taken from its first radial
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInfo {
    /// Number of radials
    pub nrays: usize,
    /// Moments present
    pub moments: Vec<Moment>,
    /// Gate count per moment
    pub ngates: Vec<u16>,
    /// Gate spacing per moment (m)
    pub gate_spacing: Vec<i32>,
    /// Range to the first gate per moment (m)
    pub first_gate: Vec<i32>,
}

/// Gate values for one moment across the selected radials
#[derive(Debug, Clone, PartialEq)]
pub enum MomentData {
    /// Raw stored values; gates without data hold 1
    Raw(GateGrid<u16>),
    /// Physical values; `None` where masked
    Scaled(GateGrid<Option<f32>>),
}

impl MomentData {
    /// Raw grid, if raw values were requested
    #[must_use]
    pub fn as_raw(&self) -> Option<&GateGrid<u16>> {
        match self {
            Self::Raw(grid) => Some(grid),
            Self::Scaled(_) => None,
        }
    }

    /// Scaled grid, if physical values were requested
    #[must_use]
    pub fn as_scaled(&self) -> Option<&GateGrid<Option<f32>>> {
        match self {
            Self::Scaled(grid) => Some(grid),
            Self::Raw(_) => None,
        }
    }

    /// `(nrays, ngates)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Raw(grid) => grid.shape(),
            Self::Scaled(grid) => grid.shape(),
        }
    }
}

impl Volume {
    /// Radar site position
    ///
    /// Legacy volumes carry no site block and report the origin.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if the first message 31 radial has
    /// no `VOL` block
    pub fn location(&self) -> Result<Location> {
        match self.radial(0) {
            Some(Radial::Digital(radial)) => {
                let vol = radial.volume.as_ref().ok_or_else(|| {
                    DecodeError::MissingData("First radial has no VOL block".to_string())
                })?;
                Ok(Location {
                    latitude: vol.lat,
                    longitude: vol.lon,
                    height: i32::from(vol.height) + i32::from(vol.feedhorn_height),
                })
            }
            _ => Ok(Location::default()),
        }
    }

    /// Per-scan moment geometry, moments in `REF VEL SW ZDR PHI RHO CFP` order
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ScanOutOfRange`] for an invalid scan index
    pub fn scan_info(&self, scans: Option<&[usize]>) -> Result<Vec<ScanInfo>> {
        self.scan_indices(scans)?
            .into_iter()
            .map(|scan| {
                let first = self.first_radial(scan)?;
                let blocks: Vec<&MomentBlock> =
                    Moment::ALL.iter().filter_map(|&m| first.moment(m)).collect();
                Ok(ScanInfo {
                    nrays: self.scans[scan].radials.len(),
                    moments: blocks.iter().map(|b| b.moment).collect(),
                    ngates: blocks.iter().map(|b| b.ngates).collect(),
                    gate_spacing: blocks.iter().map(|b| b.gate_spacing).collect(),
                    first_gate: blocks.iter().map(|b| b.first_gate).collect(),
                })
            })
            .collect()
    }

    /// Coverage pattern number, if the volume carried a message 5
    #[must_use]
    pub fn get_vcp_pattern(&self) -> Option<u16> {
        self.vcp().map(|vcp| vcp.header.pattern_number)
    }

    /// Number of radials in a scan
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ScanOutOfRange`] for an invalid scan index
    pub fn get_nrays(&self, scan: usize) -> Result<usize> {
        self.check_scan(scan)?;
        Ok(self.scans[scan].radials.len())
    }

    /// Gate count of a moment in a scan
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if the scan's first radial lacks the moment
    pub fn get_ngates(&self, scan: usize, moment: Moment) -> Result<usize> {
        Ok(usize::from(self.scan_moment(scan, moment)?.ngates))
    }

    /// Range to each gate center of a moment in a scan (m)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if the scan's first radial lacks the moment
    pub fn get_range(&self, scan: usize, moment: Moment) -> Result<Vec<f32>> {
        Ok(self.scan_moment(scan, moment)?.range())
    }

    /// Start time and per-radial offsets in seconds
    ///
    /// The start is the first selected radial's collection time truncated to
    /// the whole second.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if no radials are selected
    pub fn get_times(&self, scans: Option<&[usize]>) -> Result<(DateTime<Utc>, Vec<f64>)> {
        let radials = self.select(scans)?;
        let first = radials
            .first()
            .ok_or_else(|| DecodeError::MissingData("No radials selected".to_string()))?;

        let day0 = i64::from(first.collect_date());
        let whole_secs0 = first.collect_ms() / 1000;
        let start = nexrad_datetime(u32::from(first.collect_date()), whole_secs0 * 1000)
            .ok_or_else(|| DecodeError::Format("Radial collection time out of range".to_string()))?;

        let offsets = radials
            .iter()
            .map(|r| {
                let secs = f64::from(r.collect_ms()) / 1000.0;
                let days = (i64::from(r.collect_date()) - day0) as f64;
                secs - f64::from(whole_secs0) + days * SECONDS_PER_DAY
            })
            .collect();

        Ok((start, offsets))
    }

    /// Azimuth of every selected radial (deg)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ScanOutOfRange`] for an invalid scan index
    pub fn get_azimuth_angles(&self, scans: Option<&[usize]>) -> Result<Vec<f32>> {
        Ok(self.select(scans)?.iter().map(|r| r.azimuth()).collect())
    }

    /// Elevation of every selected radial (deg)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ScanOutOfRange`] for an invalid scan index
    pub fn get_elevation_angles(&self, scans: Option<&[usize]>) -> Result<Vec<f32>> {
        Ok(self.select(scans)?.iter().map(|r| r.elevation()).collect())
    }

    /// Target elevation of each selected scan (deg)
    ///
    /// Message 31 volumes read the coverage pattern cut matching the scan's
    /// elevation number. Legacy volumes round the first radial's elevation to
    /// a tenth of a degree.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if a message 31 volume has no
    /// coverage pattern or no cut for a scan
    pub fn get_target_angles(&self, scans: Option<&[usize]>) -> Result<Vec<f32>> {
        let indices = self.scan_indices(scans)?;

        match self.format {
            RadialFormat::Digital => {
                let vcp = self.vcp().ok_or_else(|| {
                    DecodeError::MissingData(
                        "No volume coverage pattern; target angles are unavailable".to_string(),
                    )
                })?;
                indices
                    .into_iter()
                    .map(|scan| {
                        let elevation_number = self.scans[scan].elevation_number;
                        vcp.cut_for_elevation(elevation_number)
                            .map(|cut| cut.elevation_degrees())
                            .ok_or_else(|| {
                                DecodeError::MissingData(format!(
                                    "Coverage pattern has no cut for elevation {elevation_number}"
                                ))
                            })
                    })
                    .collect()
            }
            RadialFormat::Legacy => indices
                .into_iter()
                .map(|scan| {
                    let elevation = self.first_radial(scan)?.elevation();
                    Ok((elevation * 10.0).round() / 10.0)
                })
                .collect(),
        }
    }

    /// Nyquist velocity of each selected scan (m/s)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if a message 31 radial has no `RAD` block
    pub fn get_nyquist_vel(&self, scans: Option<&[usize]>) -> Result<Vec<f32>> {
        self.per_scan(scans, Radial::nyquist_vel, NYQUIST_SCALE)
    }

    /// Unambiguous range of each selected scan (m)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if a message 31 radial has no `RAD` block
    #[doc(alias = "get_unambigous_range")]
    pub fn get_unambiguous_range(&self, scans: Option<&[usize]>) -> Result<Vec<f32>> {
        self.per_scan(scans, Radial::unambig_range, UNAMBIGUOUS_RANGE_SCALE)
    }

    /// Gate values of one moment for every selected radial
    ///
    /// The grid has one column per gate up to `max_ngates` from the decode
    /// options, or the largest gate count among the selected radials.
    /// Radials lacking the moment and gates past a radial's end hold raw 1.
    /// Scaled output uses the scale and offset of the first selected scan
    /// whose leading radial carries the moment.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingData`] if no selected radial carries the
    /// moment, and [`DecodeError::ScanOutOfRange`] for an invalid scan index
    pub fn get_data(&self, moment: Moment, scans: Option<&[usize]>, raw: bool) -> Result<MomentData> {
        let indices = self.scan_indices(scans)?;
        let radials = self.radials_of(&indices);

        let Some(reference) = self.reference_block(&indices, &radials, moment) else {
            return Err(DecodeError::MissingData(format!(
                "Moment {moment} not present in the selected scans"
            )));
        };
        let (scale, offset) = (reference.scale, reference.offset);

        let width = self.options.max_ngates.unwrap_or_else(|| {
            radials
                .iter()
                .filter_map(|r| r.moment(moment))
                .map(|b| usize::from(b.ngates))
                .max()
                .unwrap_or(0)
        });

        let mut grid = GateGrid::filled(radials.len(), width, 1u16);
        for (ray, radial) in radials.iter().enumerate() {
            if let Some(block) = radial.moment(moment) {
                for (cell, value) in grid.row_mut(ray).iter_mut().zip(block.raw_values()) {
                    *cell = value;
                }
            }
        }

        if raw {
            return Ok(MomentData::Raw(grid));
        }
        Ok(MomentData::Scaled(grid.map(|value| scale_raw(value, scale, offset))))
    }

    /// Block supplying scale and offset for a moment across scans
    fn reference_block<'a>(
        &'a self,
        indices: &[usize],
        radials: &[&'a Radial],
        moment: Moment,
    ) -> Option<&'a MomentBlock> {
        indices
            .iter()
            .filter_map(|&scan| self.first_radial(scan).ok())
            .find_map(|r| r.moment(moment))
            .or_else(|| radials.iter().find_map(|&r| r.moment(moment)))
    }

    fn per_scan(
        &self,
        scans: Option<&[usize]>,
        field: fn(&Radial) -> Option<i16>,
        scale: f32,
    ) -> Result<Vec<f32>> {
        self.scan_indices(scans)?
            .into_iter()
            .map(|scan| {
                let raw = field(self.first_radial(scan)?).ok_or_else(|| {
                    DecodeError::MissingData(format!("Scan {scan} has no RAD block"))
                })?;
                Ok(f32::from(raw) * scale)
            })
            .collect()
    }

    fn check_scan(&self, scan: usize) -> Result<()> {
        if scan >= self.scans.len() {
            return Err(DecodeError::ScanOutOfRange {
                scan,
                nscans: self.scans.len(),
            });
        }
        Ok(())
    }

    /// Requested scan indices, or all scans
    fn scan_indices(&self, scans: Option<&[usize]>) -> Result<Vec<usize>> {
        match scans {
            None => Ok((0..self.scans.len()).collect()),
            Some(list) => {
                for &scan in list {
                    self.check_scan(scan)?;
                }
                Ok(list.to_vec())
            }
        }
    }

    fn first_radial(&self, scan: usize) -> Result<&Radial> {
        self.check_scan(scan)?;
        self.scans[scan]
            .radials
            .first()
            .and_then(|&i| self.radial(i))
            .ok_or_else(|| DecodeError::MissingData(format!("Scan {scan} has no radials")))
    }

    fn scan_moment(&self, scan: usize, moment: Moment) -> Result<&MomentBlock> {
        self.first_radial(scan)?.moment(moment).ok_or_else(|| {
            DecodeError::MissingData(format!("Scan {scan} does not carry {moment}"))
        })
    }

    fn radials_of(&self, indices: &[usize]) -> Vec<&Radial> {
        indices
            .iter()
            .flat_map(|&scan| self.scans[scan].radials.iter())
            .filter_map(|&i| self.radial(i))
            .collect()
    }

    /// Radials of the requested scans in order
    fn select(&self, scans: Option<&[usize]>) -> Result<Vec<&Radial>> {
        let indices = self.scan_indices(scans)?;
        Ok(self.radials_of(&indices))
    }
}
