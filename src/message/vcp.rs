//! Message 5: volume coverage pattern

use bytes::Bytes;

use crate::archive::format::{MSG5_CUT, MSG5_HEADER};
use crate::schema::Fields;
use crate::Result;

/// Binary angle units of a cut elevation in degrees
pub const BINARY_ANGLE_SCALE: f32 = 360.0 / 65536.0;

/// Fixed part of a coverage pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcpHeader {
    /// Message size in halfwords
    pub msg_size: u16,
    /// Pattern type
    pub pattern_type: u16,
    /// Pattern number, e.g. 212
    pub pattern_number: u16,
    /// Number of elevation cuts
    pub num_cuts: u16,
    /// Clutter map group number
    pub clutter_map_group: u16,
    /// Velocity resolution code
    pub doppler_vel_res: u8,
    /// Pulse width code
    pub pulse_width: u8,
}

/// Doppler PRF assignment for one azimuth sector of a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DopplerSector {
    /// Sector edge angle (binary angle)
    pub edge_angle: u16,
    /// Doppler PRF number
    pub prf_number: u16,
    /// Doppler PRF pulse count per radial
    pub prf_pulse_count: u16,
}

/// Scanning parameters of one elevation cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut {
    /// Target elevation angle (binary angle)
    pub elevation_angle: u16,
    /// Channel configuration
    pub channel_config: u8,
    /// Waveform type
    pub waveform_type: u8,
    /// Super resolution control bits
    pub super_resolution: u8,
    /// Surveillance PRF number
    pub prf_number: u8,
    /// Surveillance PRF pulse count per radial
    pub prf_pulse_count: u16,
    /// Antenna azimuth rate (binary angle per second)
    pub azimuth_rate: u16,
    /// Reflectivity SNR threshold (0.125 dB)
    pub ref_thresh: i16,
    /// Velocity SNR threshold (0.125 dB)
    pub vel_thresh: i16,
    /// Spectrum width SNR threshold (0.125 dB)
    pub sw_thresh: i16,
    /// ZDR SNR threshold (0.125 dB)
    pub zdr_thresh: i16,
    /// PHI SNR threshold (0.125 dB)
    pub phi_thresh: i16,
    /// RHO SNR threshold (0.125 dB)
    pub rho_thresh: i16,
    /// Doppler sectors
    pub sectors: [DopplerSector; 3],
}

impl Cut {
    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        let sector = |edge: &'static str, num: &'static str, count: &'static str| -> Result<DopplerSector> {
            Ok(DopplerSector {
                edge_angle: fields.u16(edge)?,
                prf_number: fields.u16(num)?,
                prf_pulse_count: fields.u16(count)?,
            })
        };

        Ok(Self {
            elevation_angle: fields.u16("elevation_angle")?,
            channel_config: fields.u8("channel_config")?,
            waveform_type: fields.u8("waveform_type")?,
            super_resolution: fields.u8("super_resolution")?,
            prf_number: fields.u8("prf_number")?,
            prf_pulse_count: fields.u16("prf_pulse_count")?,
            azimuth_rate: fields.u16("azimuth_rate")?,
            ref_thresh: fields.i16("ref_thresh")?,
            vel_thresh: fields.i16("vel_thresh")?,
            sw_thresh: fields.i16("sw_thresh")?,
            zdr_thresh: fields.i16("zdr_thresh")?,
            phi_thresh: fields.i16("phi_thresh")?,
            rho_thresh: fields.i16("rho_thresh")?,
            sectors: [
                sector("edge_angle_1", "dop_prf_num_1", "dop_prf_pulse_count_1")?,
                sector("edge_angle_2", "dop_prf_num_2", "dop_prf_pulse_count_2")?,
                sector("edge_angle_3", "dop_prf_num_3", "dop_prf_pulse_count_3")?,
            ],
        })
    }

    /// Target elevation angle (deg)
    #[must_use]
    pub fn elevation_degrees(&self) -> f32 {
        f32::from(self.elevation_angle) * BINARY_ANGLE_SCALE
    }
}

/// Volume coverage pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCoveragePattern {
    /// Pattern header
    pub header: VcpHeader,
    /// Elevation cuts in scan order
    pub cuts: Vec<Cut>,
}

impl VolumeCoveragePattern {
    /// Cut for a 1-based elevation number
    #[must_use]
    pub fn cut_for_elevation(&self, elevation_number: u16) -> Option<&Cut> {
        usize::from(elevation_number)
            .checked_sub(1)
            .and_then(|i| self.cuts.get(i))
    }
}

/// Decode a message 5 body starting right after the message header
pub(crate) fn decode(body: &Bytes) -> Result<VolumeCoveragePattern> {
    let fields = MSG5_HEADER.decode(body)?;
    let header = VcpHeader {
        msg_size: fields.u16("msg_size")?,
        pattern_type: fields.u16("pattern_type")?,
        pattern_number: fields.u16("pattern_number")?,
        num_cuts: fields.u16("num_cuts")?,
        clutter_map_group: fields.u16("clutter_map_group")?,
        doppler_vel_res: fields.u8("doppler_vel_res")?,
        pulse_width: fields.u8("pulse_width")?,
    };

    let cuts = (0..usize::from(header.num_cuts))
        .map(|i| {
            let offset = MSG5_HEADER.size() + i * MSG5_CUT.size();
            Cut::from_fields(&MSG5_CUT.decode_at(body, offset)?)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VolumeCoveragePattern { header, cuts })
}
