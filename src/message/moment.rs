//! Data moments and their gate arrays

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::DecodeError;

/// Raw gate values below this carry no data
pub const MIN_VALID_RAW: u16 = 2;

/// Radar data moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Moment {
    /// Reflectivity
    Ref,
    /// Radial velocity
    Vel,
    /// Spectrum width
    Sw,
    /// Differential reflectivity
    Zdr,
    /// Differential phase
    Phi,
    /// Correlation coefficient
    Rho,
    /// Clutter filter power removed
    Cfp,
}

impl Moment {
    /// Every moment a message 31 radial may carry, in block order
    pub const ALL: [Self; 7] = [
        Self::Ref,
        Self::Vel,
        Self::Sw,
        Self::Zdr,
        Self::Phi,
        Self::Rho,
        Self::Cfp,
    ];

    /// Moments carried by legacy message 1 radials
    pub const LEGACY: [Self; 3] = [Self::Ref, Self::Vel, Self::Sw];

    /// Block name as it appears in the file
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ref => "REF",
            Self::Vel => "VEL",
            Self::Sw => "SW",
            Self::Zdr => "ZDR",
            Self::Phi => "PHI",
            Self::Rho => "RHO",
            Self::Cfp => "CFP",
        }
    }

    /// Parse a block name, ignoring trailing padding
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_end_matches(['\0', ' ']) {
            "REF" => Some(Self::Ref),
            "VEL" => Some(Self::Vel),
            "SW" => Some(Self::Sw),
            "ZDR" => Some(Self::Zdr),
            "PHI" => Some(Self::Phi),
            "RHO" => Some(Self::Rho),
            "CFP" => Some(Self::Cfp),
            _ => None,
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Moment {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(&s.to_ascii_uppercase()).ok_or_else(|| DecodeError::UnknownMoment(s.to_string()))
    }
}

/// Convert a raw gate value to physical units
///
/// Values below [`MIN_VALID_RAW`] are below threshold or range folded and
/// yield `None`.
#[must_use]
pub fn scale_raw(raw: u16, scale: f32, offset: f32) -> Option<f32> {
    if raw < MIN_VALID_RAW {
        None
    } else {
        Some((f32::from(raw) - offset) / scale)
    }
}

/// One moment's gates along a single radial
#[derive(Debug, Clone, PartialEq)]
pub struct MomentBlock {
    /// Which moment this is
    pub moment: Moment,
    /// Declared number of gates
    pub ngates: u16,
    /// Range to the center of the first gate (m)
    pub first_gate: i32,
    /// Distance between gates (m)
    pub gate_spacing: i32,
    /// Threshold parameter (message 31 only)
    pub thresh: i16,
    /// SNR threshold (message 31 only)
    pub snr_thresh: i16,
    /// Control flags (message 31 only)
    pub flags: u8,
    /// Bits per gate sample: 8 or 16
    pub word_size: u8,
    /// Scale applied to raw values
    pub scale: f32,
    /// Offset applied to raw values
    pub offset: f32,
    pub(crate) data: Bytes,
}

impl MomentBlock {
    /// Number of gate samples actually present
    ///
    /// Smaller than `ngates` only when the record was cut short.
    #[must_use]
    pub fn len(&self) -> usize {
        let available = match self.word_size {
            16 => self.data.len() / 2,
            _ => self.data.len(),
        };
        available.min(usize::from(self.ngates))
    }

    /// Whether no gate samples are present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw value of one gate
    #[must_use]
    pub fn raw(&self, gate: usize) -> Option<u16> {
        if gate >= self.len() {
            return None;
        }
        match self.word_size {
            16 => Some(u16::from_be_bytes([self.data[gate * 2], self.data[gate * 2 + 1]])),
            _ => Some(u16::from(self.data[gate])),
        }
    }

    /// All raw gate values
    pub fn raw_values(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len()).filter_map(|gate| self.raw(gate))
    }

    /// All gate values in physical units, `None` where masked
    #[must_use]
    pub fn scaled_values(&self) -> Vec<Option<f32>> {
        self.raw_values()
            .map(|raw| scale_raw(raw, self.scale, self.offset))
            .collect()
    }

    /// Range to each gate center (m)
    #[must_use]
    pub fn range(&self) -> Vec<f32> {
        let (first, spacing) = (i64::from(self.first_gate), i64::from(self.gate_spacing));
        (0..i64::from(self.ngates))
            .map(|i| (i * spacing + first) as f32)
            .collect()
    }
}
