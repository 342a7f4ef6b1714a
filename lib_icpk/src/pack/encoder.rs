use std::io::{self, Write};

use bincode::Options;
use log::{debug, error, info};
use thiserror::Error;

use super::format::Rgba;
use super::{wire_options, PackHeader, VariantRecord};
use crate::constants::{ICON_TAG, MAGIC, PALETTE_TAG, TAG_SIZE};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Icon name must be 1 to 255 bytes, got {0}")]
    InvalidNameLength(usize),
    #[error("Icon {name:?} needs 1 to 255 variants, got {count}")]
    InvalidVariantCount { name: String, count: usize },
    #[error("Palette exceeds 255 colors: {0}")]
    PaletteTooLarge(usize),
    #[error("Section of {0} bytes does not fit a 32-bit size")]
    SectionTooLarge(usize),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write record: {0}")]
    Record(#[from] bincode::Error),
}

/// One resolution of an icon to be written.
#[derive(Debug, Clone)]
pub struct VariantProgram {
    pub width: u16,
    pub height: u16,
    pub program: Vec<u8>,
}

impl VariantProgram {
    pub fn new(width: u16, height: u16, program: Vec<u8>) -> Self {
        Self {
            width,
            height,
            program,
        }
    }
}

#[derive(Debug, Clone)]
enum Section {
    Palette { slot: u8, colors: Vec<Rgba> },
    Icon { name: String, variants: Vec<VariantProgram> },
    Raw { tag: [u8; TAG_SIZE], payload: Vec<u8> },
}

/// Collects sections and writes them as a pack, in the order they were
/// added.
#[derive(Debug, Clone, Default)]
pub struct PackBuilder {
    sections: Vec<Section>,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a palette section for palette `slot`.
    pub fn palette(&mut self, slot: u8, colors: &[Rgba]) -> Result<&mut Self, EncodingError> {
        if colors.len() > u8::MAX as usize {
            error!("Palette #{} has {} colors", slot, colors.len());
            return Err(EncodingError::PaletteTooLarge(colors.len()));
        }
        self.sections.push(Section::Palette {
            slot,
            colors: colors.to_vec(),
        });
        Ok(self)
    }

    /// Adds an icon section. Variants keep the given order, which is the
    /// order the decoder tries them in.
    pub fn icon(
        &mut self,
        name: &str,
        variants: Vec<VariantProgram>,
    ) -> Result<&mut Self, EncodingError> {
        if name.is_empty() || name.len() > u8::MAX as usize {
            return Err(EncodingError::InvalidNameLength(name.len()));
        }
        if variants.is_empty() || variants.len() > u8::MAX as usize {
            return Err(EncodingError::InvalidVariantCount {
                name: name.to_string(),
                count: variants.len(),
            });
        }
        self.sections.push(Section::Icon {
            name: name.to_string(),
            variants,
        });
        Ok(self)
    }

    /// Adds a section with an arbitrary tag, copied verbatim.
    pub fn raw_section(&mut self, tag: [u8; TAG_SIZE], payload: &[u8]) -> &mut Self {
        self.sections.push(Section::Raw {
            tag,
            payload: payload.to_vec(),
        });
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), EncodingError> {
        info!("Starting encoding");

        let icon_count = self
            .sections
            .iter()
            .filter(|s| matches!(s, Section::Icon { .. }))
            .count();
        let header = PackHeader {
            magic: MAGIC,
            icon_count: icon_count as u32,
        };
        wire_options().serialize_into(&mut *w, &header)?;
        debug!("Header written with {} icons", icon_count);

        for section in &self.sections {
            match section {
                Section::Palette { slot, colors } => {
                    let mut payload = vec![*slot, colors.len() as u8];
                    for color in colors {
                        wire_options().serialize_into(&mut payload, color)?;
                    }
                    write_section(w, PALETTE_TAG, &payload)?;
                    debug!("Palette #{} written with {} colors", slot, colors.len());
                }
                Section::Icon { name, variants } => {
                    let mut payload = vec![name.len() as u8];
                    payload.extend_from_slice(name.as_bytes());
                    payload.push(variants.len() as u8);
                    for v in variants {
                        let size = u32::try_from(v.program.len())
                            .map_err(|_| EncodingError::SectionTooLarge(v.program.len()))?;
                        let record = VariantRecord {
                            width: v.width,
                            height: v.height,
                            size,
                        };
                        wire_options().serialize_into(&mut payload, &record)?;
                    }
                    for v in variants {
                        payload.extend_from_slice(&v.program);
                    }
                    write_section(w, ICON_TAG, &payload)?;
                    debug!("Icon {:?} written with {} variants", name, variants.len());
                }
                Section::Raw { tag, payload } => {
                    write_section(w, *tag, payload)?;
                    debug!("Raw section {:?} written", String::from_utf8_lossy(tag));
                }
            }
        }

        info!("Encoding completed successfully");
        Ok(())
    }
}

fn write_section<W: Write>(
    w: &mut W,
    tag: [u8; TAG_SIZE],
    payload: &[u8],
) -> Result<(), EncodingError> {
    let size =
        u32::try_from(payload.len()).map_err(|_| EncodingError::SectionTooLarge(payload.len()))?;
    w.write_all(&tag)?;
    wire_options().serialize_into(&mut *w, &size)?;
    w.write_all(payload)?;
    Ok(())
}
