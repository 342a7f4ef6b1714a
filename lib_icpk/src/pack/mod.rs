pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::{decode, DecodeError};
pub use encoder::{EncodingError, PackBuilder, VariantProgram};

use bincode::Options;
use serde::{Deserialize, Serialize};

/// Container header: magic followed by the number of icons (a hint only).
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PackHeader {
    pub magic: [u8; 4],
    pub icon_count: u32,
}

/// Per-variant record of an `ICON` section.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct VariantRecord {
    pub width: u16,
    pub height: u16,
    pub size: u32,
}

/// Fixed-width little-endian integers, no length limit.
pub(crate) fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}
