//! nexrad-l2 - NEXRAD Level II Archive II volume decoder
//!
//! Decodes optionally gzip-wrapped, optionally BZIP2 block-compressed
//! Archive II files into scans, radials and per-moment gate arrays.
//!
//! ```no_run
//! use nexrad_l2::{Moment, Volume};
//!
//! # fn main() -> nexrad_l2::Result<()> {
//! let volume = Volume::open("KTLX20240101_120000_V06")?;
//! let reflectivity = volume.get_data(Moment::Ref, Some(&[0]), false)?;
//! println!("{} scans, first scan {:?}", volume.nscans(), reflectivity.shape());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::multiple_crate_versions
)]

pub mod archive;
pub mod config;
pub mod error;
pub mod message;
pub mod schema;
pub mod volume;

pub use archive::{Archive, Compression, VolumeHeader};
pub use config::DecodeOptions;
pub use error::{DecodeError, Result};
pub use message::{Moment, MomentBlock, Radial, Record, VolumeCoveragePattern};
pub use volume::{GateGrid, Location, MomentData, RadialFormat, Scan, ScanInfo, Volume};
