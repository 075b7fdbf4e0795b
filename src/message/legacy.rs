//! Message 1: legacy digital radar data

use bytes::Bytes;

use super::moment::{Moment, MomentBlock};
use crate::archive::format::MSG1_HEADER;
use crate::schema::Fields;
use crate::Result;

/// Angle units of a message 1 header in degrees
pub const ANGLE_SCALE: f32 = 180.0 / (4096.0 * 8.0);

const REF_SCALE: f32 = 2.0;
const REF_OFFSET: f32 = 66.0;
const DOPPLER_OFFSET: f32 = 129.0;
/// `doppler_resolution` code for 1.0 m/s velocity bins
const DOPPLER_RESOLUTION_COARSE: u16 = 4;

/// Fixed part of a message 1 radial
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyHeader {
    /// Collection time in milliseconds past midnight
    pub collect_ms: u32,
    /// Collection date (modified Julian)
    pub collect_date: u16,
    /// Unambiguous range (0.1 km)
    pub unambig_range: i16,
    /// Coded azimuth angle
    pub azimuth_angle: u16,
    /// Radial number within the elevation scan
    pub azimuth_number: u16,
    /// Radial status
    pub radial_status: u16,
    /// Coded elevation angle
    pub elevation_angle: u16,
    /// Elevation number within the volume
    pub elevation_number: u16,
    /// Range to the first surveillance gate (m)
    pub sur_range_first: u16,
    /// Range to the first Doppler gate (m), as a wrapped 16-bit value
    pub doppler_range_first: u16,
    /// Surveillance gate spacing (m)
    pub sur_range_step: u16,
    /// Doppler gate spacing (m)
    pub doppler_range_step: u16,
    /// Number of surveillance gates
    pub sur_nbins: u16,
    /// Number of Doppler gates
    pub doppler_nbins: u16,
    /// Sector number within the cut
    pub cut_sector_num: u16,
    /// System gain calibration constant (dB)
    pub calib_const: f32,
    /// Offset of reflectivity data from the start of this header
    pub sur_pointer: u16,
    /// Offset of velocity data from the start of this header
    pub vel_pointer: u16,
    /// Offset of spectrum width data from the start of this header
    pub width_pointer: u16,
    /// Velocity resolution code (2 = 0.5 m/s, 4 = 1.0 m/s)
    pub doppler_resolution: u16,
    /// Volume coverage pattern number
    pub vcp: u16,
    /// Nyquist velocity (0.01 m/s)
    pub nyquist_vel: i16,
    /// Atmospheric attenuation factor (0.001 dB/km)
    pub atmos_attenuation: i16,
    /// Threshold parameter
    pub threshold: i16,
    /// Spot blanking status
    pub spot_blank_status: u16,
}

impl LegacyHeader {
    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            collect_ms: fields.u32("collect_ms")?,
            collect_date: fields.u16("collect_date")?,
            unambig_range: fields.i16("unambig_range")?,
            azimuth_angle: fields.u16("azimuth_angle")?,
            azimuth_number: fields.u16("azimuth_number")?,
            radial_status: fields.u16("radial_status")?,
            elevation_angle: fields.u16("elevation_angle")?,
            elevation_number: fields.u16("elevation_number")?,
            sur_range_first: fields.u16("sur_range_first")?,
            doppler_range_first: fields.u16("doppler_range_first")?,
            sur_range_step: fields.u16("sur_range_step")?,
            doppler_range_step: fields.u16("doppler_range_step")?,
            sur_nbins: fields.u16("sur_nbins")?,
            doppler_nbins: fields.u16("doppler_nbins")?,
            cut_sector_num: fields.u16("cut_sector_num")?,
            calib_const: fields.f32("calib_const")?,
            sur_pointer: fields.u16("sur_pointer")?,
            vel_pointer: fields.u16("vel_pointer")?,
            width_pointer: fields.u16("width_pointer")?,
            doppler_resolution: fields.u16("doppler_resolution")?,
            vcp: fields.u16("vcp")?,
            nyquist_vel: fields.i16("nyquist_vel")?,
            atmos_attenuation: fields.i16("atmos_attenuation")?,
            threshold: fields.i16("threshold")?,
            spot_blank_status: fields.u16("spot_blank_status")?,
        })
    }

    /// Range to the first Doppler gate (m)
    ///
    /// Near-radar gates are stored as a wrapped negative value.
    #[must_use]
    pub fn doppler_first_gate(&self) -> i32 {
        let raw = i32::from(self.doppler_range_first);
        if raw > 1 << 15 {
            raw - (1 << 16)
        } else {
            raw
        }
    }
}

/// A decoded message 1 radial
#[derive(Debug, Clone)]
pub struct LegacyRadial {
    /// Fixed header
    pub header: LegacyHeader,
    /// REF, VEL and SW blocks that carry gates
    pub moments: Vec<MomentBlock>,
}

impl LegacyRadial {
    /// Azimuth angle (deg)
    #[must_use]
    pub fn azimuth(&self) -> f32 {
        f32::from(self.header.azimuth_angle) * ANGLE_SCALE
    }

    /// Elevation angle (deg)
    #[must_use]
    pub fn elevation(&self) -> f32 {
        f32::from(self.header.elevation_angle) * ANGLE_SCALE
    }
}

/// Decode a message 1 body starting right after the message header
pub(crate) fn decode(body: &Bytes) -> Result<LegacyRadial> {
    let header = LegacyHeader::from_fields(&MSG1_HEADER.decode(body)?)?;

    let velocity_scale = if header.doppler_resolution == DOPPLER_RESOLUTION_COARSE {
        1.0
    } else {
        2.0
    };
    let doppler_first = header.doppler_first_gate();
    let doppler_step = i32::from(header.doppler_range_step);

    let layouts = [
        (
            Moment::Ref,
            header.sur_pointer,
            header.sur_nbins,
            i32::from(header.sur_range_first),
            i32::from(header.sur_range_step),
            REF_SCALE,
            REF_OFFSET,
        ),
        (
            Moment::Vel,
            header.vel_pointer,
            header.doppler_nbins,
            doppler_first,
            doppler_step,
            velocity_scale,
            DOPPLER_OFFSET,
        ),
        (
            Moment::Sw,
            header.width_pointer,
            header.doppler_nbins,
            doppler_first,
            doppler_step,
            2.0,
            DOPPLER_OFFSET,
        ),
    ];

    let moments = layouts
        .into_iter()
        .filter(|&(_, pointer, ngates, ..)| pointer != 0 && ngates != 0)
        .map(|(moment, pointer, ngates, first_gate, gate_spacing, scale, offset)| {
            let start = usize::from(pointer).min(body.len());
            let end = (start + usize::from(ngates)).min(body.len());
            MomentBlock {
                moment,
                ngates,
                first_gate,
                gate_spacing,
                thresh: 0,
                snr_thresh: 0,
                flags: 0,
                word_size: 8,
                scale,
                offset,
                data: body.slice(start..end),
            }
        })
        .collect();

    Ok(LegacyRadial { header, moments })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Msg1 {
        elevation_angle: u16,
        doppler_range_first: u16,
        doppler_resolution: u16,
        sur_nbins: u16,
        doppler_nbins: u16,
    }

    fn encode(m: &Msg1) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&1_000u32.to_be_bytes());
        b.extend_from_slice(&10_000u16.to_be_bytes());
        b.extend_from_slice(&1_150i16.to_be_bytes());
        b.extend_from_slice(&16_384u16.to_be_bytes()); // 90 deg
        b.extend_from_slice(&1u16.to_be_bytes());
        b.extend_from_slice(&0u16.to_be_bytes());
        b.extend_from_slice(&m.elevation_angle.to_be_bytes());
        b.extend_from_slice(&2u16.to_be_bytes());
        b.extend_from_slice(&0u16.to_be_bytes());
        b.extend_from_slice(&m.doppler_range_first.to_be_bytes());
        b.extend_from_slice(&1_000u16.to_be_bytes());
        b.extend_from_slice(&250u16.to_be_bytes());
        b.extend_from_slice(&m.sur_nbins.to_be_bytes());
        b.extend_from_slice(&m.doppler_nbins.to_be_bytes());
        b.extend_from_slice(&1u16.to_be_bytes());
        b.extend_from_slice(&0.0f32.to_be_bytes());
        let sur = 100u16;
        let vel = sur + m.sur_nbins;
        let width = vel + m.doppler_nbins;
        b.extend_from_slice(&sur.to_be_bytes());
        b.extend_from_slice(&vel.to_be_bytes());
        b.extend_from_slice(&width.to_be_bytes());
        b.extend_from_slice(&m.doppler_resolution.to_be_bytes());
        b.extend_from_slice(&21u16.to_be_bytes());
        b.extend_from_slice(&[0; 14]);
        b.extend_from_slice(&2_650i16.to_be_bytes());
        b.extend_from_slice(&(-12i16).to_be_bytes());
        b.extend_from_slice(&0i16.to_be_bytes());
        b.extend_from_slice(&0u16.to_be_bytes());
        b.extend_from_slice(&[0; 32]);
        assert_eq!(b.len(), 100);

        b.extend((0..m.sur_nbins).map(|i| i as u8));
        b.extend((0..m.doppler_nbins).map(|i| 129 + i as u8));
        b.extend((0..m.doppler_nbins).map(|i| 130 + i as u8));
        b
    }

    fn sample() -> Msg1 {
        Msg1 {
            elevation_angle: 91,
            doppler_range_first: 65_411,
            doppler_resolution: 2,
            sur_nbins: 4,
            doppler_nbins: 3,
        }
    }

    #[test]
    fn test_decode_moments() {
        let radial = decode(&Bytes::from(encode(&sample()))).unwrap();
        assert_eq!(radial.header.vcp, 21);
        assert_eq!(radial.header.nyquist_vel, 2_650);
        assert_eq!(radial.moments.len(), 3);

        let refl = &radial.moments[0];
        assert_eq!(refl.moment, Moment::Ref);
        assert_eq!((refl.scale, refl.offset), (2.0, 66.0));
        assert_eq!(refl.gate_spacing, 1_000);
        assert_eq!(refl.raw_values().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let vel = &radial.moments[1];
        assert_eq!(vel.moment, Moment::Vel);
        assert_eq!((vel.scale, vel.offset), (2.0, 129.0));
        assert_eq!(vel.first_gate, -125);
        assert_eq!(vel.raw_values().collect::<Vec<_>>(), vec![129, 130, 131]);

        let sw = &radial.moments[2];
        assert_eq!(sw.moment, Moment::Sw);
        assert_eq!(sw.raw_values().collect::<Vec<_>>(), vec![130, 131, 132]);
    }

    #[test]
    fn test_coarse_velocity_resolution() {
        let mut m = sample();
        m.doppler_resolution = 4;
        let radial = decode(&Bytes::from(encode(&m))).unwrap();
        assert_eq!(radial.moments[1].scale, 1.0);
        assert_eq!(radial.moments[2].scale, 2.0);
    }

    #[test]
    fn test_angles() {
        let radial = decode(&Bytes::from(encode(&sample()))).unwrap();
        assert_eq!(radial.azimuth(), 90.0);
        assert!((radial.elevation() - 0.499_877_9).abs() < 1e-6);
    }

    #[test]
    fn test_surveillance_only_cut() {
        let mut m = sample();
        m.doppler_nbins = 0;
        let radial = decode(&Bytes::from(encode(&m))).unwrap();
        assert_eq!(radial.moments.len(), 1);
        assert_eq!(radial.moments[0].moment, Moment::Ref);
    }

    #[test]
    fn test_short_header_is_truncated() {
        let err = decode(&Bytes::from(vec![0u8; 40])).unwrap_err();
        assert!(err.is_recoverable());
    }
}
