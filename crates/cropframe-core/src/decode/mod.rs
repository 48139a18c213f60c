//! Source decoding for the file encoder.
//!
//! Crop regions are computed against the upright image the user saw, so
//! every decode applies the EXIF orientation before pixels are touched,
//! and probing reports the upright size.

mod orientation;
mod source;

pub use orientation::{read_orientation, Orientation};
pub use source::{decode_oriented, probe_dimensions, DecodeError};
