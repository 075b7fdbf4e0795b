//! Archive II binary layouts
//!
//! Field tables follow the RDA/RPG and Archive II/User ICDs. All multi-byte
//! values are big-endian.

use crate::schema::{Field, FieldKind::*, Schema};

/// Gzip magic bytes (ID1, ID2, CM=deflate)
pub const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];

/// Fixed length of a legacy Archive II record
pub const RECORD_SIZE: usize = 2432;

/// Compression record following the volume header (control word + reserved)
pub const COMPRESSION_RECORD_SIZE: usize = 12;

/// Signed block-size word preceding each BZIP2 block
pub const CONTROL_WORD_SIZE: usize = 4;

/// Compression marker of a BZIP2 block-compressed volume
pub const MARKER_BZIP2: [u8; 2] = *b"BZ";

/// Compression markers of uncompressed volumes
pub const MARKERS_UNCOMPRESSED: [[u8; 2]; 2] = [[0x00, 0x00], [0x09, 0x80]];

/// Message size value signalling that the real size spans the segment fields
pub const SEGMENTED_SIZE_SENTINEL: u16 = 0xFFFF;

/// Number of block pointers carried by a message 31 header
pub const MSG31_BLOCK_POINTERS: usize = 10;

/// Volume header at the very start of the file
pub const VOLUME_HEADER: Schema = Schema::new(
    "volume header",
    &[
        Field { name: "tape", kind: Bytes(9) },
        Field { name: "extension", kind: Bytes(3) },
        Field { name: "date", kind: U32 },
        Field { name: "time", kind: U32 },
        Field { name: "icao", kind: Bytes(4) },
    ],
);

/// Message header preceding every record
pub const MESSAGE_HEADER: Schema = Schema::new(
    "message header",
    &[
        Field { name: "size", kind: U16 },
        Field { name: "channels", kind: U8 },
        Field { name: "type", kind: U8 },
        Field { name: "seq_id", kind: U16 },
        Field { name: "date", kind: U16 },
        Field { name: "ms", kind: U32 },
        Field { name: "segments", kind: U16 },
        Field { name: "seg_num", kind: U16 },
    ],
);

/// Message 31 (generic digital radar data) fixed header
pub const MSG31_HEADER: Schema = Schema::new(
    "message 31 header",
    &[
        Field { name: "id", kind: Bytes(4) },
        Field { name: "collect_ms", kind: U32 },
        Field { name: "collect_date", kind: U16 },
        Field { name: "azimuth_number", kind: U16 },
        Field { name: "azimuth_angle", kind: F32 },
        Field { name: "compress_flag", kind: U8 },
        Field { name: "spare_0", kind: U8 },
        Field { name: "radial_length", kind: U16 },
        Field { name: "azimuth_resolution", kind: U8 },
        Field { name: "radial_spacing", kind: U8 },
        Field { name: "elevation_number", kind: U8 },
        Field { name: "cut_sector", kind: U8 },
        Field { name: "elevation_angle", kind: F32 },
        Field { name: "radial_blanking", kind: U8 },
        Field { name: "azimuth_mode", kind: I8 },
        Field { name: "block_count", kind: U16 },
        Field { name: "block_pointer_1", kind: U32 },
        Field { name: "block_pointer_2", kind: U32 },
        Field { name: "block_pointer_3", kind: U32 },
        Field { name: "block_pointer_4", kind: U32 },
        Field { name: "block_pointer_5", kind: U32 },
        Field { name: "block_pointer_6", kind: U32 },
        Field { name: "block_pointer_7", kind: U32 },
        Field { name: "block_pointer_8", kind: U32 },
        Field { name: "block_pointer_9", kind: U32 },
        Field { name: "block_pointer_10", kind: U32 },
    ],
);

/// Names of the message 31 block pointer fields, in order
pub const MSG31_POINTER_FIELDS: [&str; MSG31_BLOCK_POINTERS] = [
    "block_pointer_1",
    "block_pointer_2",
    "block_pointer_3",
    "block_pointer_4",
    "block_pointer_5",
    "block_pointer_6",
    "block_pointer_7",
    "block_pointer_8",
    "block_pointer_9",
    "block_pointer_10",
];

/// Volume data constant block (`VOL`)
pub const VOLUME_DATA_BLOCK: Schema = Schema::new(
    "VOL block",
    &[
        Field { name: "block_type", kind: Bytes(1) },
        Field { name: "data_name", kind: Bytes(3) },
        Field { name: "lrtup", kind: U16 },
        Field { name: "version_major", kind: U8 },
        Field { name: "version_minor", kind: U8 },
        Field { name: "lat", kind: F32 },
        Field { name: "lon", kind: F32 },
        Field { name: "height", kind: I16 },
        Field { name: "feedhorn_height", kind: U16 },
        Field { name: "refl_calib", kind: F32 },
        Field { name: "power_h", kind: F32 },
        Field { name: "power_v", kind: F32 },
        Field { name: "diff_refl_calib", kind: F32 },
        Field { name: "init_phase", kind: F32 },
        Field { name: "vcp", kind: U16 },
        Field { name: "spare", kind: Bytes(2) },
    ],
);

/// Elevation data constant block (`ELV`)
pub const ELEVATION_DATA_BLOCK: Schema = Schema::new(
    "ELV block",
    &[
        Field { name: "block_type", kind: Bytes(1) },
        Field { name: "data_name", kind: Bytes(3) },
        Field { name: "lrtup", kind: U16 },
        Field { name: "atmos", kind: I16 },
        Field { name: "refl_calib", kind: F32 },
    ],
);

/// Radial data constant block (`RAD`)
pub const RADIAL_DATA_BLOCK: Schema = Schema::new(
    "RAD block",
    &[
        Field { name: "block_type", kind: Bytes(1) },
        Field { name: "data_name", kind: Bytes(3) },
        Field { name: "lrtup", kind: U16 },
        Field { name: "unambig_range", kind: I16 },
        Field { name: "noise_level_h", kind: F32 },
        Field { name: "noise_level_v", kind: F32 },
        Field { name: "nyquist_vel", kind: I16 },
        Field { name: "spare", kind: Bytes(2) },
    ],
);

/// Generic data moment block header; gate samples follow it
pub const GENERIC_DATA_BLOCK: Schema = Schema::new(
    "moment block",
    &[
        Field { name: "block_type", kind: Bytes(1) },
        Field { name: "data_name", kind: Bytes(3) },
        Field { name: "reserved", kind: U32 },
        Field { name: "ngates", kind: U16 },
        Field { name: "first_gate", kind: I16 },
        Field { name: "gate_spacing", kind: I16 },
        Field { name: "thresh", kind: I16 },
        Field { name: "snr_thresh", kind: I16 },
        Field { name: "flags", kind: U8 },
        Field { name: "word_size", kind: U8 },
        Field { name: "scale", kind: F32 },
        Field { name: "offset", kind: F32 },
    ],
);

/// Message 5 (volume coverage pattern) header
pub const MSG5_HEADER: Schema = Schema::new(
    "message 5 header",
    &[
        Field { name: "msg_size", kind: U16 },
        Field { name: "pattern_type", kind: U16 },
        Field { name: "pattern_number", kind: U16 },
        Field { name: "num_cuts", kind: U16 },
        Field { name: "clutter_map_group", kind: U16 },
        Field { name: "doppler_vel_res", kind: U8 },
        Field { name: "pulse_width", kind: U8 },
        Field { name: "spare", kind: Bytes(10) },
    ],
);

/// Message 5 per-elevation cut parameters
pub const MSG5_CUT: Schema = Schema::new(
    "message 5 cut",
    &[
        Field { name: "elevation_angle", kind: U16 },
        Field { name: "channel_config", kind: U8 },
        Field { name: "waveform_type", kind: U8 },
        Field { name: "super_resolution", kind: U8 },
        Field { name: "prf_number", kind: U8 },
        Field { name: "prf_pulse_count", kind: U16 },
        Field { name: "azimuth_rate", kind: U16 },
        Field { name: "ref_thresh", kind: I16 },
        Field { name: "vel_thresh", kind: I16 },
        Field { name: "sw_thresh", kind: I16 },
        Field { name: "zdr_thresh", kind: I16 },
        Field { name: "phi_thresh", kind: I16 },
        Field { name: "rho_thresh", kind: I16 },
        Field { name: "edge_angle_1", kind: U16 },
        Field { name: "dop_prf_num_1", kind: U16 },
        Field { name: "dop_prf_pulse_count_1", kind: U16 },
        Field { name: "spare_1", kind: Bytes(2) },
        Field { name: "edge_angle_2", kind: U16 },
        Field { name: "dop_prf_num_2", kind: U16 },
        Field { name: "dop_prf_pulse_count_2", kind: U16 },
        Field { name: "spare_2", kind: Bytes(2) },
        Field { name: "edge_angle_3", kind: U16 },
        Field { name: "dop_prf_num_3", kind: U16 },
        Field { name: "dop_prf_pulse_count_3", kind: U16 },
        Field { name: "spare_3", kind: Bytes(2) },
    ],
);

/// Message 1 (legacy digital radar data) header; moment bytes follow it
pub const MSG1_HEADER: Schema = Schema::new(
    "message 1 header",
    &[
        Field { name: "collect_ms", kind: U32 },
        Field { name: "collect_date", kind: U16 },
        Field { name: "unambig_range", kind: I16 },
        Field { name: "azimuth_angle", kind: U16 },
        Field { name: "azimuth_number", kind: U16 },
        Field { name: "radial_status", kind: U16 },
        Field { name: "elevation_angle", kind: U16 },
        Field { name: "elevation_number", kind: U16 },
        Field { name: "sur_range_first", kind: U16 },
        Field { name: "doppler_range_first", kind: U16 },
        Field { name: "sur_range_step", kind: U16 },
        Field { name: "doppler_range_step", kind: U16 },
        Field { name: "sur_nbins", kind: U16 },
        Field { name: "doppler_nbins", kind: U16 },
        Field { name: "cut_sector_num", kind: U16 },
        Field { name: "calib_const", kind: F32 },
        Field { name: "sur_pointer", kind: U16 },
        Field { name: "vel_pointer", kind: U16 },
        Field { name: "width_pointer", kind: U16 },
        Field { name: "doppler_resolution", kind: U16 },
        Field { name: "vcp", kind: U16 },
        Field { name: "spare_1", kind: Bytes(8) },
        Field { name: "spare_2", kind: Bytes(2) },
        Field { name: "spare_3", kind: Bytes(2) },
        Field { name: "spare_4", kind: Bytes(2) },
        Field { name: "nyquist_vel", kind: I16 },
        Field { name: "atmos_attenuation", kind: I16 },
        Field { name: "threshold", kind: I16 },
        Field { name: "spot_blank_status", kind: U16 },
        Field { name: "spare_5", kind: Bytes(32) },
    ],
);

static_assertions::const_assert_eq!(VOLUME_HEADER.size(), 24);
static_assertions::const_assert_eq!(MESSAGE_HEADER.size(), 16);
static_assertions::const_assert_eq!(MSG31_HEADER.size(), 72);
static_assertions::const_assert_eq!(VOLUME_DATA_BLOCK.size(), 44);
static_assertions::const_assert_eq!(ELEVATION_DATA_BLOCK.size(), 12);
static_assertions::const_assert_eq!(RADIAL_DATA_BLOCK.size(), 20);
static_assertions::const_assert_eq!(GENERIC_DATA_BLOCK.size(), 28);
static_assertions::const_assert_eq!(MSG5_HEADER.size(), 22);
static_assertions::const_assert_eq!(MSG5_CUT.size(), 46);
static_assertions::const_assert_eq!(MSG1_HEADER.size(), 100);
