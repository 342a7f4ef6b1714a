use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::program::interpreter;
use crate::program::{DrawEngine, DrawError};

/// A non-premultiplied color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub type Palette = Vec<Rgba>;

/// Palettes indexed by slot. Palette-fill opcodes pick a color from the
/// palette chosen by the caller's selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteTable {
    palettes: Vec<Palette>,
}

impl PaletteTable {
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn get(&self, selector: usize) -> Option<&Palette> {
        self.palettes.get(selector)
    }

    pub fn color(&self, selector: usize, index: usize) -> Option<Rgba> {
        self.palettes.get(selector)?.get(index).copied()
    }

    /// Stores `palette` at `slot`, growing the table with empty palettes.
    fn set(&mut self, slot: usize, palette: Palette) {
        if slot >= self.palettes.len() {
            self.palettes.resize_with(slot + 1, Palette::new);
        }
        self.palettes[slot] = palette;
    }
}

/// The palette table shared by every icon decoded after it was created.
///
/// Later palette sections in the same pack update the one table, so all
/// icons holding it see the final colors. It can only be written while the
/// pack is loading.
#[derive(Debug, Clone, Default)]
pub struct SharedPalettes(Arc<RwLock<PaletteTable>>);

impl SharedPalettes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, slot: usize, palette: Palette) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(slot, palette);
    }

    fn read(&self) -> RwLockReadGuard<'_, PaletteTable> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn color(&self, selector: usize, index: usize) -> Option<Rgba> {
        self.read().color(selector, index)
    }

    /// Copies the current table.
    pub fn snapshot(&self) -> PaletteTable {
        self.read().clone()
    }

    /// Whether both handles refer to the same table.
    pub fn ptr_eq(&self, other: &SharedPalettes) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One resolution of an icon: the size it was drawn for and the location of
/// its program in the icon data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub width: u16,
    pub height: u16,
    pub offset: u32,
    pub size: u32,
}

impl Variant {
    pub fn fits(&self, width: u16, height: u16) -> bool {
        self.width <= width && self.height <= height
    }
}

#[derive(Debug, Clone)]
pub struct Icon {
    name: String,
    variants: Vec<Variant>,
    data: Vec<u8>,
    palettes: Option<SharedPalettes>,
}

impl Icon {
    pub fn new(
        name: String,
        variants: Vec<Variant>,
        data: Vec<u8>,
        palettes: Option<SharedPalettes>,
    ) -> Self {
        Self {
            name,
            variants,
            data,
            palettes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Concatenated programs of all variants.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn palettes(&self) -> Option<&SharedPalettes> {
        self.palettes.as_ref()
    }

    /// Picks the first variant no larger than the requested size, or the
    /// last variant if none fits.
    pub fn select_variant(&self, width: u16, height: u16) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.fits(width, height))
            .or_else(|| self.variants.last())
    }

    /// The program bytes of `variant`, or `None` if its range lies outside
    /// the icon data.
    pub fn program(&self, variant: &Variant) -> Option<&[u8]> {
        let start = variant.offset as usize;
        let end = start.checked_add(variant.size as usize)?;
        self.data.get(start..end)
    }

    /// Draws the variant selected for `width`×`height` into `engine`,
    /// resolving palette fills against palette `palette_selector`.
    ///
    /// Errors are reported to [`DrawEngine::error`] and returned; paths filled
    /// before the error remain drawn.
    pub fn draw<E: DrawEngine + ?Sized>(
        &self,
        engine: &mut E,
        width: u16,
        height: u16,
        palette_selector: usize,
    ) -> Result<(), DrawError> {
        let program = self
            .select_variant(width, height)
            .and_then(|variant| self.program(variant));
        let Some(program) = program else {
            debug!("Icon {:?} has no drawable variant", self.name);
            let err = DrawError::EmptyImage;
            engine.error(&err);
            return Err(err);
        };

        interpreter::run(program, self.palettes.as_ref(), palette_selector, engine)
    }
}

/// Icons in pack order, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct Pack {
    icons: Vec<Icon>,
    name_to_index: HashMap<String, usize>,
}

impl Pack {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            icons: Vec::with_capacity(capacity),
            name_to_index: HashMap::with_capacity(capacity),
        }
    }

    /// Appends `icon`; a later icon with the same name replaces the earlier
    /// one in name lookups.
    pub(crate) fn push(&mut self, icon: Icon) {
        let index = self.icons.len();
        self.name_to_index.insert(icon.name.clone(), index);
        self.icons.push(icon);
    }

    pub fn find(&self, name: &str) -> Option<&Icon> {
        self.name_to_index
            .get(name)
            .and_then(|&index| self.icons.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&Icon> {
        self.icons.get(index)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Icon> {
        self.icons.iter()
    }
}

impl<'a> IntoIterator for &'a Pack {
    type Item = &'a Icon;
    type IntoIter = std::slice::Iter<'a, Icon>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(width: u16, height: u16) -> Variant {
        Variant {
            width,
            height,
            offset: 0,
            size: 0,
        }
    }

    #[test]
    fn test_select_variant_first_fit() {
        let icon = Icon::new(
            "x".into(),
            vec![variant(16, 16), variant(32, 32)],
            Vec::new(),
            None,
        );
        assert_eq!(icon.select_variant(20, 20).unwrap().width, 16);
        assert_eq!(icon.select_variant(16, 16).unwrap().width, 16);
        assert_eq!(icon.select_variant(64, 64).unwrap().width, 16);
        // nothing fits: last variant
        assert_eq!(icon.select_variant(8, 8).unwrap().width, 32);
        assert_eq!(icon.select_variant(16, 8).unwrap().width, 32);
    }

    #[test]
    fn test_select_variant_largest_first() {
        let icon = Icon::new(
            "x".into(),
            vec![variant(32, 32), variant(16, 16)],
            Vec::new(),
            None,
        );
        assert_eq!(icon.select_variant(20, 20).unwrap().width, 16);
        assert_eq!(icon.select_variant(32, 32).unwrap().width, 32);
        assert_eq!(icon.select_variant(8, 8).unwrap().width, 16);
    }

    #[test]
    fn test_program_range() {
        let icon = Icon::new(
            "x".into(),
            vec![
                Variant {
                    width: 1,
                    height: 1,
                    offset: 0,
                    size: 2,
                },
                Variant {
                    width: 2,
                    height: 2,
                    offset: 2,
                    size: 5,
                },
            ],
            vec![1, 2, 3, 4],
            None,
        );
        assert_eq!(icon.program(&icon.variants()[0]), Some(&[1u8, 2][..]));
        assert_eq!(icon.program(&icon.variants()[1]), None);
    }

    #[test]
    fn test_palette_table_grows() {
        let mut table = PaletteTable::default();
        table.set(2, vec![Rgba::new(1, 2, 3, 4)]);
        assert_eq!(table.len(), 3);
        assert!(table.get(0).unwrap().is_empty());
        assert_eq!(table.color(2, 0), Some(Rgba::new(1, 2, 3, 4)));
        assert_eq!(table.color(2, 1), None);
        assert_eq!(table.color(3, 0), None);

        table.set(0, vec![Rgba::default()]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.color(0, 0), Some(Rgba::default()));
    }

    #[test]
    fn test_shared_palettes_alias() {
        let shared = SharedPalettes::new();
        let held = shared.clone();
        assert!(held.is_empty());

        shared.set(0, vec![Rgba::new(9, 9, 9, 255)]);
        assert!(held.ptr_eq(&shared));
        assert_eq!(held.color(0, 0), Some(Rgba::new(9, 9, 9, 255)));
        assert_eq!(held.snapshot().len(), 1);
    }

    #[test]
    fn test_pack_last_duplicate_wins() {
        let mut pack = Pack::default();
        pack.push(Icon::new("a".into(), vec![variant(1, 1)], vec![], None));
        pack.push(Icon::new("a".into(), vec![variant(2, 2)], vec![], None));

        assert_eq!(pack.len(), 2);
        assert_eq!(pack.find("a").unwrap().variants()[0].width, 2);
        assert_eq!(pack.get(0).unwrap().variants()[0].width, 1);
        assert!(pack.find("b").is_none());
        assert_eq!(pack.iter().count(), 2);
    }
}
