//! Synthetic Archive II volume builder shared by integration tests and benches

#![allow(dead_code)]

use std::io::Write;

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;

pub const RECORD_SIZE: usize = 2432;
pub const CTM_SIZE: usize = 12;

/// 2024-01-01 as a NEXRAD modified Julian date
pub const DAY: u16 = 19_724;

/// One generic moment block
#[derive(Debug, Clone)]
pub struct MomentSpec {
    pub name: [u8; 3],
    pub word_size: u8,
    pub scale: f32,
    pub offset: f32,
    pub first_gate: i16,
    pub gate_spacing: i16,
    pub gates: Vec<u16>,
}

impl MomentSpec {
    pub fn new(name: &str, scale: f32, offset: f32, gates: Vec<u16>) -> Self {
        let mut padded = [b' '; 3];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        Self {
            name: padded,
            word_size: 8,
            scale,
            offset,
            first_gate: 2125,
            gate_spacing: 250,
            gates,
        }
    }

    pub fn word_size(mut self, word_size: u8) -> Self {
        self.word_size = word_size;
        self
    }

    pub fn geometry(mut self, first_gate: i16, gate_spacing: i16) -> Self {
        self.first_gate = first_gate;
        self.gate_spacing = gate_spacing;
        self
    }
}

/// Site constants carried in the `VOL` block
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub lat: f32,
    pub lon: f32,
    pub height: i16,
    pub feedhorn_height: u16,
    pub vcp: u16,
}

pub const KTLX: Site = Site {
    lat: 35.333,
    lon: -97.278,
    height: 370,
    feedhorn_height: 20,
    vcp: 212,
};

/// One message 31 radial
#[derive(Debug, Clone)]
pub struct DigitalSpec {
    pub elevation_number: u8,
    pub azimuth: f32,
    pub elevation: f32,
    pub collect_date: u16,
    pub collect_ms: u32,
    pub site: Option<Site>,
    pub rad: Option<(i16, i16)>,
    pub moments: Vec<MomentSpec>,
}

impl DigitalSpec {
    pub fn new(elevation_number: u8, azimuth: f32) -> Self {
        Self {
            elevation_number,
            azimuth,
            elevation: 0.5 * f32::from(elevation_number),
            collect_date: DAY,
            collect_ms: 43_200_000,
            site: Some(KTLX),
            rad: Some((1_467, 2_650)),
            moments: Vec::new(),
        }
    }

    pub fn time(mut self, collect_date: u16, collect_ms: u32) -> Self {
        self.collect_date = collect_date;
        self.collect_ms = collect_ms;
        self
    }

    pub fn moment(mut self, moment: MomentSpec) -> Self {
        self.moments.push(moment);
        self
    }

    pub fn without_site(mut self) -> Self {
        self.site = None;
        self
    }
}

/// One message 1 radial
#[derive(Debug, Clone)]
pub struct LegacySpec {
    pub elevation_number: u16,
    pub azimuth: u16,
    pub elevation: u16,
    pub collect_ms: u32,
    pub doppler_resolution: u16,
    pub nyquist_vel: i16,
    pub unambig_range: i16,
    pub reflectivity: Vec<u8>,
    pub velocity: Vec<u8>,
    pub width: Vec<u8>,
}

impl LegacySpec {
    pub fn new(elevation_number: u16, azimuth: u16, elevation: u16) -> Self {
        Self {
            elevation_number,
            azimuth,
            elevation,
            collect_ms: 3_600_000,
            doppler_resolution: 2,
            nyquist_vel: 2_650,
            unambig_range: 1_150,
            reflectivity: vec![0, 1, 66, 132],
            velocity: vec![0, 129, 139],
            width: vec![1, 131, 133],
        }
    }
}

fn message_header(size: u16, msg_type: u8) -> Vec<u8> {
    let mut b = Vec::with_capacity(16);
    b.extend_from_slice(&size.to_be_bytes());
    b.push(0);
    b.push(msg_type);
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&DAY.to_be_bytes());
    b.extend_from_slice(&43_200_000u32.to_be_bytes());
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&1u16.to_be_bytes());
    b
}

/// Variable-length message followed by the next record's CTM bytes
pub fn variable_message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut body = body.to_vec();
    if body.len() % 2 == 1 {
        body.push(0);
    }
    let size = u16::try_from((16 + body.len()) / 2).unwrap();
    let mut b = message_header(size, msg_type);
    b.extend(body);
    b.extend_from_slice(&[0; CTM_SIZE]);
    b
}

/// Message occupying one fixed record slot
pub fn fixed_message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    assert!(16 + body.len() <= RECORD_SIZE);
    let mut b = message_header(1208, msg_type);
    b.extend_from_slice(body);
    b.resize(RECORD_SIZE, 0);
    b
}

fn moment_block(m: &MomentSpec) -> Vec<u8> {
    let mut b = vec![b'D'];
    b.extend_from_slice(&m.name);
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&u16::try_from(m.gates.len()).unwrap().to_be_bytes());
    b.extend_from_slice(&m.first_gate.to_be_bytes());
    b.extend_from_slice(&m.gate_spacing.to_be_bytes());
    b.extend_from_slice(&16i16.to_be_bytes());
    b.extend_from_slice(&28i16.to_be_bytes());
    b.push(0);
    b.push(m.word_size);
    b.extend_from_slice(&m.scale.to_be_bytes());
    b.extend_from_slice(&m.offset.to_be_bytes());
    for &gate in &m.gates {
        match m.word_size {
            16 => b.extend_from_slice(&gate.to_be_bytes()),
            _ => b.push(u8::try_from(gate).unwrap()),
        }
    }
    b
}

fn vol_block(site: &Site) -> Vec<u8> {
    let mut b = b"RVOL".to_vec();
    b.extend_from_slice(&44u16.to_be_bytes());
    b.extend_from_slice(&[1, 0]);
    b.extend_from_slice(&site.lat.to_be_bytes());
    b.extend_from_slice(&site.lon.to_be_bytes());
    b.extend_from_slice(&site.height.to_be_bytes());
    b.extend_from_slice(&site.feedhorn_height.to_be_bytes());
    for v in [-44.5f32, 700.0, 700.0, 0.1, 60.0] {
        b.extend_from_slice(&v.to_be_bytes());
    }
    b.extend_from_slice(&site.vcp.to_be_bytes());
    b.extend_from_slice(&[0, 0]);
    b
}

fn rad_block(unambig_range: i16, nyquist_vel: i16) -> Vec<u8> {
    let mut b = b"RRAD".to_vec();
    b.extend_from_slice(&20u16.to_be_bytes());
    b.extend_from_slice(&unambig_range.to_be_bytes());
    b.extend_from_slice(&(-80.0f32).to_be_bytes());
    b.extend_from_slice(&(-80.0f32).to_be_bytes());
    b.extend_from_slice(&nyquist_vel.to_be_bytes());
    b.extend_from_slice(&[0, 0]);
    b
}

/// Message 31 record
pub fn digital_radial(spec: &DigitalSpec) -> Vec<u8> {
    let mut blocks = Vec::new();
    if let Some(site) = &spec.site {
        blocks.push(vol_block(site));
    }
    if let Some((unambig_range, nyquist_vel)) = spec.rad {
        blocks.push(rad_block(unambig_range, nyquist_vel));
    }
    blocks.extend(spec.moments.iter().map(moment_block));
    assert!(blocks.len() <= 10);

    let mut body = Vec::new();
    body.extend_from_slice(b"KTLX");
    body.extend_from_slice(&spec.collect_ms.to_be_bytes());
    body.extend_from_slice(&spec.collect_date.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&spec.azimuth.to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&[1, 0, spec.elevation_number, 1]);
    body.extend_from_slice(&spec.elevation.to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&u16::try_from(blocks.len()).unwrap().to_be_bytes());

    let mut pointer = 72u32;
    for i in 0..10 {
        match blocks.get(i) {
            Some(block) => {
                body.extend_from_slice(&pointer.to_be_bytes());
                pointer += u32::try_from(block.len()).unwrap();
            }
            None => body.extend_from_slice(&0u32.to_be_bytes()),
        }
    }
    assert_eq!(body.len(), 72);

    for block in blocks {
        body.extend(block);
    }
    variable_message(31, &body)
}

/// Message 5 record with one cut per binary elevation angle
pub fn coverage_pattern(pattern: u16, elevations: &[u16]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&0u16.to_be_bytes());
    b.extend_from_slice(&2u16.to_be_bytes());
    b.extend_from_slice(&pattern.to_be_bytes());
    b.extend_from_slice(&u16::try_from(elevations.len()).unwrap().to_be_bytes());
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&[2, 2]);
    b.extend_from_slice(&[0; 10]);
    for &angle in elevations {
        b.extend_from_slice(&angle.to_be_bytes());
        b.extend_from_slice(&[1, 1, 0, 1]);
        b.extend_from_slice(&15u16.to_be_bytes());
        b.extend_from_slice(&5_000u16.to_be_bytes());
        b.extend_from_slice(&[0; 12]);
        b.extend_from_slice(&[0; 24]);
    }
    fixed_message(5, &b)
}

/// Message 1 record
pub fn legacy_radial(spec: &LegacySpec) -> Vec<u8> {
    let sur_nbins = u16::try_from(spec.reflectivity.len()).unwrap();
    let doppler_nbins = u16::try_from(spec.velocity.len()).unwrap();
    let sur_pointer = 100u16;
    let vel_pointer = sur_pointer + sur_nbins;
    let width_pointer = vel_pointer + doppler_nbins;

    let mut b = Vec::new();
    b.extend_from_slice(&spec.collect_ms.to_be_bytes());
    b.extend_from_slice(&DAY.to_be_bytes());
    b.extend_from_slice(&spec.unambig_range.to_be_bytes());
    b.extend_from_slice(&spec.azimuth.to_be_bytes());
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&0u16.to_be_bytes());
    b.extend_from_slice(&spec.elevation.to_be_bytes());
    b.extend_from_slice(&spec.elevation_number.to_be_bytes());
    b.extend_from_slice(&0u16.to_be_bytes());
    b.extend_from_slice(&65_411u16.to_be_bytes());
    b.extend_from_slice(&1_000u16.to_be_bytes());
    b.extend_from_slice(&250u16.to_be_bytes());
    b.extend_from_slice(&sur_nbins.to_be_bytes());
    b.extend_from_slice(&doppler_nbins.to_be_bytes());
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&0.0f32.to_be_bytes());
    b.extend_from_slice(&sur_pointer.to_be_bytes());
    b.extend_from_slice(&vel_pointer.to_be_bytes());
    b.extend_from_slice(&width_pointer.to_be_bytes());
    b.extend_from_slice(&spec.doppler_resolution.to_be_bytes());
    b.extend_from_slice(&21u16.to_be_bytes());
    b.extend_from_slice(&[0; 14]);
    b.extend_from_slice(&spec.nyquist_vel.to_be_bytes());
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&0u16.to_be_bytes());
    b.extend_from_slice(&[0; 32]);
    assert_eq!(b.len(), 100);

    b.extend_from_slice(&spec.reflectivity);
    b.extend_from_slice(&spec.velocity);
    b.extend_from_slice(&spec.width);
    fixed_message(1, &b)
}

/// 24-byte volume header
pub fn volume_header(icao: &[u8; 4]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(b"AR2V0006.");
    b.extend_from_slice(b"001");
    b.extend_from_slice(&u32::from(DAY).to_be_bytes());
    b.extend_from_slice(&43_200_000u32.to_be_bytes());
    b.extend_from_slice(icao);
    b
}

/// Volume with the given compression marker and uncompressed messages
pub fn volume_with_marker(marker: [u8; 2], messages: &[Vec<u8>]) -> Vec<u8> {
    let mut b = volume_header(b"KTLX");
    b.extend_from_slice(&[0; 4]);
    b.extend_from_slice(&marker);
    b.extend_from_slice(&[0; 6]);
    for message in messages {
        b.extend_from_slice(message);
    }
    b
}

/// Uncompressed volume
pub fn uncompressed_volume(messages: &[Vec<u8>]) -> Vec<u8> {
    volume_with_marker([0, 0], messages)
}

/// BZIP2 block-compressed volume split into `blocks` roughly equal blocks
pub fn bzip2_volume(messages: &[Vec<u8>], blocks: usize) -> Vec<u8> {
    let mut stream = vec![0u8; CTM_SIZE];
    for message in messages {
        stream.extend_from_slice(message);
    }

    let chunk = stream.len().div_ceil(blocks.max(1));
    let chunks: Vec<&[u8]> = stream.chunks(chunk).collect();

    let mut b = volume_header(b"KTLX");
    for (i, part) in chunks.iter().enumerate() {
        let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::best());
        encoder.write_all(part).unwrap();
        let compressed = encoder.finish().unwrap();

        let size = i32::try_from(compressed.len()).unwrap();
        let word = if i + 1 == chunks.len() { -size } else { size };
        b.extend_from_slice(&word.to_be_bytes());
        b.extend(compressed);
    }
    b
}

/// Whole-file gzip envelope
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// A small multi-scan volume: `nscans` elevations of `nrays` radials each,
/// every radial carrying REF (8-bit) and ZDR (16-bit) moments
pub fn sample_messages(nscans: u8, nrays: u16, ngates: u16) -> Vec<Vec<u8>> {
    let elevations: Vec<u16> = (1..=u16::from(nscans)).map(|e| e * 91).collect();
    let mut messages = vec![coverage_pattern(212, &elevations)];

    for elevation_number in 1..=nscans {
        for ray in 0..nrays {
            let azimuth = f32::from(ray) * 360.0 / f32::from(nrays);
            let refl: Vec<u16> = (0..ngates).map(|g| (g + ray) % 256).collect();
            let zdr: Vec<u16> = (0..ngates).map(|g| g * 3 + ray).collect();
            let ms = 43_200_000 + u32::from(elevation_number) * 30_000 + u32::from(ray) * 100;
            let spec = DigitalSpec::new(elevation_number, azimuth)
                .time(DAY, ms)
                .moment(MomentSpec::new("REF", 2.0, 66.0, refl))
                .moment(MomentSpec::new("ZDR", 16.0, 128.0, zdr).word_size(16));
            messages.push(digital_radial(&spec));
        }
    }
    messages
}
