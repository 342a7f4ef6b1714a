pub const MAGIC: [u8; 4] = *b"icpk";
pub const PALETTE_TAG: [u8; 4] = *b"PALT";
pub const ICON_TAG: [u8; 4] = *b"ICON";

pub const TAG_SIZE: usize = 4;

/// width:u16 height:u16 size:u32
pub const VARIANT_RECORD_SIZE: usize = 8;
pub const RGBA_SIZE: usize = 4;

/// `ICON` sections larger than this are rejected.
pub const MAX_ICON_SECTION_SIZE: u32 = 1 << 20;

/// Upper bound on storage reserved from the untrusted icon count hint.
pub const MAX_PRESIZED_ICONS: usize = 4096;
