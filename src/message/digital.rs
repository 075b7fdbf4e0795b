//! Message 31: generic digital radar data

use bytes::Bytes;
use tracing::{trace, warn};

use super::moment::{Moment, MomentBlock};
use crate::archive::format::{
    ELEVATION_DATA_BLOCK, GENERIC_DATA_BLOCK, MSG31_HEADER, MSG31_POINTER_FIELDS,
    RADIAL_DATA_BLOCK, VOLUME_DATA_BLOCK,
};
use crate::schema::Fields;
use crate::{DecodeError, Result};

/// Length of the type byte plus three-character name that opens every block
const BLOCK_TAG_SIZE: usize = 4;

/// Fixed part of a message 31 radial
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalHeader {
    /// Radar identifier
    pub id: String,
    /// Collection time in milliseconds past midnight
    pub collect_ms: u32,
    /// Collection date (modified Julian)
    pub collect_date: u16,
    /// Radial number within the elevation scan
    pub azimuth_number: u16,
    /// Azimuth angle (deg)
    pub azimuth_angle: f32,
    /// Compression indicator
    pub compress_flag: u8,
    /// Uncompressed radial length in bytes
    pub radial_length: u16,
    /// Azimuthal spacing code (1 = 0.5 deg, 2 = 1.0 deg)
    pub azimuth_resolution: u8,
    /// Radial status (start/end of elevation or volume)
    pub radial_spacing: u8,
    /// Elevation number within the volume
    pub elevation_number: u8,
    /// Sector number within the cut
    pub cut_sector: u8,
    /// Elevation angle (deg)
    pub elevation_angle: f32,
    /// Spot blanking status
    pub radial_blanking: u8,
    /// Azimuth indexing mode
    pub azimuth_mode: i8,
    /// Number of data blocks that follow
    pub block_count: u16,
    /// Block offsets relative to the start of this header
    pub block_pointers: Vec<u32>,
}

impl DigitalHeader {
    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        let block_pointers = MSG31_POINTER_FIELDS
            .iter()
            .map(|&name| fields.u32(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: fields.text("id")?,
            collect_ms: fields.u32("collect_ms")?,
            collect_date: fields.u16("collect_date")?,
            azimuth_number: fields.u16("azimuth_number")?,
            azimuth_angle: fields.f32("azimuth_angle")?,
            compress_flag: fields.u8("compress_flag")?,
            radial_length: fields.u16("radial_length")?,
            azimuth_resolution: fields.u8("azimuth_resolution")?,
            radial_spacing: fields.u8("radial_spacing")?,
            elevation_number: fields.u8("elevation_number")?,
            cut_sector: fields.u8("cut_sector")?,
            elevation_angle: fields.f32("elevation_angle")?,
            radial_blanking: fields.u8("radial_blanking")?,
            azimuth_mode: fields.i8("azimuth_mode")?,
            block_count: fields.u16("block_count")?,
            block_pointers,
        })
    }

    /// Pointers to the blocks actually present
    ///
    /// Zero pointers are unused slots. Only the first `block_count` non-zero
    /// pointers are honored.
    pub fn active_pointers(&self) -> impl Iterator<Item = usize> + '_ {
        self.block_pointers
            .iter()
            .filter(|&&p| p != 0)
            .take(usize::from(self.block_count))
            .map(|&p| p as usize)
    }
}

/// Volume data constant block (`VOL`)
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBlock {
    /// ICD major version
    pub version_major: u8,
    /// ICD minor version
    pub version_minor: u8,
    /// Site latitude (deg)
    pub lat: f32,
    /// Site longitude (deg)
    pub lon: f32,
    /// Site height above sea level (m)
    pub height: i16,
    /// Feedhorn height above ground (m)
    pub feedhorn_height: u16,
    /// Reflectivity calibration (dB)
    pub refl_calib: f32,
    /// Horizontal transmitter power (kW)
    pub power_h: f32,
    /// Vertical transmitter power (kW)
    pub power_v: f32,
    /// ZDR system calibration (dB)
    pub diff_refl_calib: f32,
    /// Initial system differential phase (deg)
    pub init_phase: f32,
    /// Volume coverage pattern number
    pub vcp: u16,
}

impl VolumeBlock {
    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            version_major: fields.u8("version_major")?,
            version_minor: fields.u8("version_minor")?,
            lat: fields.f32("lat")?,
            lon: fields.f32("lon")?,
            height: fields.i16("height")?,
            feedhorn_height: fields.u16("feedhorn_height")?,
            refl_calib: fields.f32("refl_calib")?,
            power_h: fields.f32("power_h")?,
            power_v: fields.f32("power_v")?,
            diff_refl_calib: fields.f32("diff_refl_calib")?,
            init_phase: fields.f32("init_phase")?,
            vcp: fields.u16("vcp")?,
        })
    }
}

/// Elevation data constant block (`ELV`)
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationBlock {
    /// Atmospheric attenuation factor (0.001 dB/km)
    pub atmos: i16,
    /// Scaling constant used by the signal processor (dB)
    pub refl_calib: f32,
}

/// Radial data constant block (`RAD`)
#[derive(Debug, Clone, PartialEq)]
pub struct RadialBlock {
    /// Unambiguous range (0.1 km)
    pub unambig_range: i16,
    /// Horizontal noise level (dBm)
    pub noise_level_h: f32,
    /// Vertical noise level (dBm)
    pub noise_level_v: f32,
    /// Nyquist velocity (0.01 m/s)
    pub nyquist_vel: i16,
}

/// A decoded message 31 radial
#[derive(Debug, Clone)]
pub struct DigitalRadial {
    /// Fixed header
    pub header: DigitalHeader,
    /// `VOL` block, if present
    pub volume: Option<VolumeBlock>,
    /// `ELV` block, if present
    pub elevation: Option<ElevationBlock>,
    /// `RAD` block, if present
    pub radial: Option<RadialBlock>,
    /// Moment blocks in pointer order
    pub moments: Vec<MomentBlock>,
}

/// Decode a message 31 body
///
/// `body` starts at the message 31 header, immediately after the message
/// header. Gate samples are sliced from `body` without copying.
pub(crate) fn decode(body: &Bytes) -> Result<DigitalRadial> {
    let header = DigitalHeader::from_fields(&MSG31_HEADER.decode(body)?)?;

    let mut radial = DigitalRadial {
        volume: None,
        elevation: None,
        radial: None,
        moments: Vec::with_capacity(usize::from(header.block_count)),
        header,
    };

    let pointers: Vec<usize> = radial.header.active_pointers().collect();
    for ptr in pointers {
        let tag = body.get(ptr..ptr + BLOCK_TAG_SIZE).ok_or(DecodeError::Truncated {
            context: "message 31 block tag",
            offset: ptr,
            needed: BLOCK_TAG_SIZE,
            available: body.len().saturating_sub(ptr),
        })?;
        let name = String::from_utf8_lossy(&tag[1..]).trim_end().to_string();

        match name.as_str() {
            "VOL" => {
                let fields = VOLUME_DATA_BLOCK.decode_at(body, ptr)?;
                radial.volume = Some(VolumeBlock::from_fields(&fields)?);
            }
            "ELV" => {
                let fields = ELEVATION_DATA_BLOCK.decode_at(body, ptr)?;
                radial.elevation = Some(ElevationBlock {
                    atmos: fields.i16("atmos")?,
                    refl_calib: fields.f32("refl_calib")?,
                });
            }
            "RAD" => {
                let fields = RADIAL_DATA_BLOCK.decode_at(body, ptr)?;
                radial.radial = Some(RadialBlock {
                    unambig_range: fields.i16("unambig_range")?,
                    noise_level_h: fields.f32("noise_level_h")?,
                    noise_level_v: fields.f32("noise_level_v")?,
                    nyquist_vel: fields.i16("nyquist_vel")?,
                });
            }
            other => match Moment::from_name(other) {
                Some(moment) => {
                    if let Some(block) = decode_moment(body, ptr, moment)? {
                        radial.moments.push(block);
                    }
                }
                None => trace!("Ignoring unknown message 31 block {:?} at {}", other, ptr),
            },
        }
    }

    Ok(radial)
}

fn decode_moment(body: &Bytes, ptr: usize, moment: Moment) -> Result<Option<MomentBlock>> {
    let fields = GENERIC_DATA_BLOCK.decode_at(body, ptr)?;
    let ngates = fields.u16("ngates")?;
    let word_size = fields.u8("word_size")?;

    let width = match word_size {
        8 => 1,
        16 => 2,
        other => {
            warn!("Skipping {} block with unsupported word size {}", moment, other);
            return Ok(None);
        }
    };

    let start = ptr + GENERIC_DATA_BLOCK.size();
    let end = (start + usize::from(ngates) * width).min(body.len());
    let data = if start < end {
        body.slice(start..end)
    } else {
        Bytes::new()
    };

    Ok(Some(MomentBlock {
        moment,
        ngates,
        first_gate: i32::from(fields.i16("first_gate")?),
        gate_spacing: i32::from(fields.i16("gate_spacing")?),
        thresh: fields.i16("thresh")?,
        snr_thresh: fields.i16("snr_thresh")?,
        flags: fields.u8("flags")?,
        word_size,
        scale: fields.f32("scale")?,
        offset: fields.f32("offset")?,
        data,
    }))
}
