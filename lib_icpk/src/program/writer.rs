use thiserror::Error;

use super::coord::encode_coord;
use super::engine::Point;
use super::interpreter::{
    OP_CUBIC_TO, OP_LINE_TO, OP_MOVE_TO, OP_MOVE_TO_CONT, OP_PALETTE_FILL, OP_QUADRATIC_TO,
    OP_SOLID_FILL, OP_STOP,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProgramError {
    #[error("empty {0} op")]
    EmptyOp(&'static str),
    #[error("invalid {op} op: {len} points is not a multiple of {arity}")]
    InvalidPointCount {
        op: &'static str,
        len: usize,
        arity: usize,
    },
}

/// Builds an icon program.
///
/// Coordinates use the shortest encoding that stays within `precision` of
/// the requested value.
#[derive(Debug, Default)]
pub struct ProgramWriter {
    buf: Vec<u8>,
    precision: f32,
    in_path: bool,
}

impl ProgramWriter {
    pub fn new(precision: f32) -> Self {
        Self {
            buf: Vec::new(),
            precision,
            in_path: false,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn byte(&mut self, b: u8) -> &mut Self {
        self.buf.push(b);
        self
    }

    pub fn coord(&mut self, v: f32) -> &mut Self {
        let mut tmp = [0u8; 4];
        let n = encode_coord(&mut tmp, v, self.precision);
        self.buf.extend_from_slice(&tmp[..n]);
        self
    }

    pub fn view_box(&mut self, xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> &mut Self {
        self.coord(xmin).coord(ymin).coord(xmax).coord(ymax)
    }

    pub fn solid_fill(&mut self, r: u8, g: u8, b: u8, a: u8) -> &mut Self {
        self.buf.extend_from_slice(&[OP_SOLID_FILL, r, g, b, a]);
        self
    }

    pub fn palette_fill(&mut self, index: u8) -> &mut Self {
        self.buf.extend_from_slice(&[OP_PALETTE_FILL, index]);
        self
    }

    /// Starts a new shape; the next `move_to` closes the previous one.
    pub fn begin_path(&mut self) -> &mut Self {
        self.in_path = false;
        self
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        let op = if self.in_path {
            OP_MOVE_TO_CONT
        } else {
            OP_MOVE_TO
        };
        self.in_path = true;
        self.byte(op).points(&[p])
    }

    pub fn line_to(&mut self, pts: &[Point]) -> Result<&mut Self, ProgramError> {
        self.segments("line", OP_LINE_TO, 0x20, 1, pts)
    }

    pub fn cubic_to(&mut self, pts: &[Point]) -> Result<&mut Self, ProgramError> {
        self.segments("cubic", OP_CUBIC_TO, 0x10, 3, pts)
    }

    pub fn quadratic_to(&mut self, pts: &[Point]) -> Result<&mut Self, ProgramError> {
        self.segments("quadratic", OP_QUADRATIC_TO, 0x10, 2, pts)
    }

    pub fn stop(&mut self) -> &mut Self {
        self.byte(OP_STOP)
    }

    fn points(&mut self, pts: &[Point]) -> &mut Self {
        for p in pts {
            self.coord(p.x).coord(p.y);
        }
        self
    }

    fn segments(
        &mut self,
        op: &'static str,
        base: u8,
        max_rep: usize,
        arity: usize,
        pts: &[Point],
    ) -> Result<&mut Self, ProgramError> {
        if pts.is_empty() {
            return Err(ProgramError::EmptyOp(op));
        }
        if pts.len() % arity != 0 {
            return Err(ProgramError::InvalidPointCount {
                op,
                len: pts.len(),
                arity,
            });
        }

        for chunk in pts.chunks(max_rep * arity) {
            self.byte(base + (chunk.len() / arity - 1) as u8);
            self.points(chunk);
        }
        Ok(self)
    }
}
