use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn lerp(self, to: Point, t: f32) -> Point {
        Point::new(self.x + t * (to.x - self.x), self.y + t * (to.y - self.y))
    }
}

/// Raises the quadratic segment `p0 q p2` to the equivalent cubic control
/// points `[c1, c2, p2]`.
///
/// The interpreter forwards quadratic segments unchanged; this is for
/// engines whose backend only draws cubics.
pub fn quadratic_to_cubic(p0: Point, q: Point, p2: Point) -> [Point; 3] {
    [p0.lerp(q, 2.0 / 3.0), p2.lerp(q, 2.0 / 3.0), p2]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawErrorKind {
    EmptyImage,
    InvalidPaletteIndex,
    InvalidOpCode,
}

/// Errors reported while drawing an icon. Positions are byte offsets from
/// the start of the variant's program.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    #[error("empty image")]
    EmptyImage,
    #[error("invalid palette index {index} at byte {pos}")]
    InvalidPaletteIndex { pos: usize, index: usize },
    #[error("invalid opcode 0x{opcode:02x} at byte {pos}")]
    InvalidOpCode { pos: usize, opcode: u8 },
}

impl DrawError {
    pub fn kind(&self) -> DrawErrorKind {
        match self {
            DrawError::EmptyImage => DrawErrorKind::EmptyImage,
            DrawError::InvalidPaletteIndex { .. } => DrawErrorKind::InvalidPaletteIndex,
            DrawError::InvalidOpCode { .. } => DrawErrorKind::InvalidOpCode,
        }
    }

    pub fn pos(&self) -> usize {
        match *self {
            DrawError::EmptyImage => 0,
            DrawError::InvalidPaletteIndex { pos, .. } | DrawError::InvalidOpCode { pos, .. } => pos,
        }
    }
}

/// Receives the drawing instructions decoded from an icon program.
///
/// Nothing is read back from the engine. Paths are built with `move_to` and
/// the segment calls, then filled with the current fill by `close_path`.
pub trait DrawEngine {
    /// Called once per draw with the coordinate bounds of the program.
    fn view_box(&mut self, xmin: f32, ymin: f32, xmax: f32, ymax: f32);

    /// Sets a non-premultiplied solid fill for the paths that follow.
    fn set_solid_fill(&mut self, r: u8, g: u8, b: u8, a: u8);

    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, pts: &[Point]);

    /// `pts` holds `(control1, control2, end)` triples.
    fn cubic_bezier_to(&mut self, pts: &[Point]);

    /// `pts` holds `(control, end)` pairs.
    fn quadratic_bezier_to(&mut self, pts: &[Point]);

    /// Fills the current path.
    fn close_path(&mut self);

    /// Receives the error that ended a draw. Ignored by default.
    fn error(&mut self, _err: &DrawError) {}
}
