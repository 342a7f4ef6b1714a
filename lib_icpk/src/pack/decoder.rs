use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom};

use bincode::Options;
use log::{debug, error, info};
use thiserror::Error;

use super::format::{Icon, Pack, Palette, Rgba, SharedPalettes, Variant};
use super::{wire_options, PackHeader, VariantRecord};
use crate::constants::{
    ICON_TAG, MAGIC, MAX_ICON_SECTION_SIZE, MAX_PRESIZED_ICONS, PALETTE_TAG, RGBA_SIZE, TAG_SIZE,
    VARIANT_RECORD_SIZE,
};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid format or header")]
    InvalidHeader,
    #[error("Truncated section header: {0} bytes")]
    TruncatedSectionHeader(usize),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to read record: {0}")]
    Record(#[from] bincode::Error),
    #[error("Palette section size {size} does not match {count} colors")]
    PaletteSizeMismatch { size: u32, count: u8 },
    #[error("Icon name is empty")]
    EmptyName,
    #[error("Icon name {0:02x?} is not valid UTF-8")]
    InvalidName(Vec<u8>),
    #[error("Icon {0:?} has no variants")]
    NoVariants(String),
    #[error("Icon section size {size} is smaller than its {header}-byte header")]
    IconSectionTooSmall { size: u32, header: usize },
    #[error("Icon section size {0} exceeds the limit")]
    SectionTooLarge(u32),
    #[error("Section {tag:?} of {size} bytes runs past the end of the stream")]
    SectionOutOfBounds { tag: String, size: u32 },
}

/// Decodes a pack held in memory.
pub fn decode(encoded_data: &[u8]) -> Result<Pack, DecodeError> {
    Pack::load(&mut Cursor::new(encoded_data))
}

impl Pack {
    /// Reads a whole pack from `reader`.
    ///
    /// Sections with unknown tags are skipped. Any other malformed section
    /// fails the load.
    pub fn load<R: Read + Seek>(reader: &mut R) -> Result<Pack, DecodeError> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let header: PackHeader = wire_options().deserialize_from(&mut *reader).map_err(|e| {
            error!("Failed to read pack header: {}", e);
            DecodeError::InvalidHeader
        })?;
        if header.magic != MAGIC {
            error!("Invalid magic number {:02x?}", header.magic);
            return Err(DecodeError::InvalidHeader);
        }
        debug!(
            "Magic number validated, {} icons announced",
            header.icon_count
        );

        let mut pack = Pack::with_capacity((header.icon_count as usize).min(MAX_PRESIZED_ICONS));
        let mut palettes: Option<SharedPalettes> = None;

        while let Some(tag) = read_tag(reader)? {
            let size: u32 = wire_options().deserialize_from(&mut *reader).map_err(|e| {
                error!("Failed to read section size: {}", e);
                DecodeError::TruncatedSectionHeader(TAG_SIZE)
            })?;
            debug!(
                "Section {:?}: {} bytes",
                String::from_utf8_lossy(&tag),
                size
            );

            match tag {
                PALETTE_TAG => {
                    let (slot, palette) = read_palette(reader, size)?;
                    palettes
                        .get_or_insert_with(SharedPalettes::new)
                        .set(slot as usize, palette);
                }
                ICON_TAG => {
                    let icon = read_icon(reader, size, palettes.clone())?;
                    pack.push(icon);
                }
                _ => {
                    let pos = reader.stream_position()?;
                    if pos + size as u64 > end {
                        error!(
                            "Unknown section {:?} of {} bytes runs past the end",
                            String::from_utf8_lossy(&tag),
                            size
                        );
                        return Err(DecodeError::SectionOutOfBounds {
                            tag: String::from_utf8_lossy(&tag).into_owned(),
                            size,
                        });
                    }
                    debug!("Skipping unknown section");
                    reader.seek(SeekFrom::Current(size as i64))?;
                }
            }
        }

        info!("Pack loaded: {} icons", pack.len());
        Ok(pack)
    }
}

/// Reads a section tag. `None` means the stream ended cleanly.
fn read_tag<R: Read>(reader: &mut R) -> Result<Option<[u8; TAG_SIZE]>, DecodeError> {
    let mut tag = [0u8; TAG_SIZE];
    let mut filled = 0;
    while filled < TAG_SIZE {
        match reader.read(&mut tag[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        TAG_SIZE => Ok(Some(tag)),
        n => {
            error!("Stream ended inside a section tag after {} bytes", n);
            Err(DecodeError::TruncatedSectionHeader(n))
        }
    }
}

fn read_palette<R: Read>(reader: &mut R, size: u32) -> Result<(u8, Palette), DecodeError> {
    let (slot, count): (u8, u8) = wire_options().deserialize_from(&mut *reader)?;

    if size as usize != 2 + RGBA_SIZE * count as usize {
        error!(
            "Palette section size {} does not match {} colors",
            size, count
        );
        return Err(DecodeError::PaletteSizeMismatch { size, count });
    }

    let mut palette = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let color: Rgba = wire_options().deserialize_from(&mut *reader)?;
        palette.push(color);
    }
    debug!("Read palette #{} with {} colors", slot, count);

    Ok((slot, palette))
}

fn read_icon<R: Read>(
    reader: &mut R,
    size: u32,
    palettes: Option<SharedPalettes>,
) -> Result<Icon, DecodeError> {
    if size > MAX_ICON_SECTION_SIZE {
        error!("Icon section of {} bytes exceeds the limit", size);
        return Err(DecodeError::SectionTooLarge(size));
    }

    let name_len: u8 = wire_options().deserialize_from(&mut *reader)?;
    if name_len == 0 {
        error!("Icon name is empty");
        return Err(DecodeError::EmptyName);
    }

    let mut name = vec![0u8; name_len as usize];
    reader.read_exact(&mut name)?;
    let name = String::from_utf8(name).map_err(|e| {
        error!("Icon name {:02x?} is not valid UTF-8", e.as_bytes());
        DecodeError::InvalidName(e.into_bytes())
    })?;

    let num_variants: u8 = wire_options().deserialize_from(&mut *reader)?;
    if num_variants == 0 {
        error!("Icon {:?} has no variants", name);
        return Err(DecodeError::NoVariants(name));
    }

    let header_len = 1 + name_len as usize + 1 + VARIANT_RECORD_SIZE * num_variants as usize;
    if (size as usize) < header_len {
        error!(
            "Icon {:?} section size {} is smaller than its {}-byte header",
            name, size, header_len
        );
        return Err(DecodeError::IconSectionTooSmall {
            size,
            header: header_len,
        });
    }

    let mut variants = Vec::with_capacity(num_variants as usize);
    let mut offset = 0u32;
    for _ in 0..num_variants {
        let record: VariantRecord = wire_options().deserialize_from(&mut *reader)?;
        variants.push(Variant {
            width: record.width,
            height: record.height,
            offset,
            size: record.size,
        });
        offset = offset.saturating_add(record.size);
    }

    let mut data = vec![0u8; size as usize - header_len];
    reader.read_exact(&mut data)?;
    debug!(
        "Read icon {:?}: {} variants, {} data bytes",
        name,
        variants.len(),
        data.len()
    );

    Ok(Icon::new(name, variants, data, palettes))
}
