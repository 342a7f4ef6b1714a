use log::{debug, warn};

use super::coord::ProgCursor;
use super::engine::{DrawEngine, DrawError, Point};
use crate::pack::format::SharedPalettes;

pub const OP_STOP: u8 = 0x00;
pub const OP_SOLID_FILL: u8 = 0x01;
pub const OP_PALETTE_FILL: u8 = 0x02;
pub const OP_MOVE_TO: u8 = 0x70;
pub const OP_MOVE_TO_CONT: u8 = 0x71;
pub const OP_LINE_TO: u8 = 0x80;
pub const OP_CUBIC_TO: u8 = 0xa0;
pub const OP_QUADRATIC_TO: u8 = 0xb0;

/// Fills the current path before a new shape starts, if any segment was drawn.
struct PathState<'e, E: DrawEngine + ?Sized> {
    engine: &'e mut E,
    open: bool,
}

impl<E: DrawEngine + ?Sized> PathState<'_, E> {
    fn auto_close(&mut self) {
        if self.open {
            self.engine.close_path();
            self.open = false;
        }
    }
}

/// Runs one variant program against `engine`.
///
/// Any error is passed to [`DrawEngine::error`] before being returned. Paths
/// filled before the error stay drawn.
pub fn run<E: DrawEngine + ?Sized>(
    program: &[u8],
    palettes: Option<&SharedPalettes>,
    palette_selector: usize,
    engine: &mut E,
) -> Result<(), DrawError> {
    let result = execute(program, palettes, palette_selector, engine);
    if let Err(ref err) = result {
        warn!("Icon program failed: {}", err);
        engine.error(err);
    }
    result
}

fn execute<E: DrawEngine + ?Sized>(
    program: &[u8],
    palettes: Option<&SharedPalettes>,
    palette_selector: usize,
    engine: &mut E,
) -> Result<(), DrawError> {
    let mut pm = ProgCursor::new(program);

    let mut bounds = [0.0f32; 4];
    for b in bounds.iter_mut() {
        if !pm.has_coord() {
            return Err(DrawError::EmptyImage);
        }
        *b = pm.coord();
    }
    let [xmin, ymin, xmax, ymax] = bounds;
    engine.view_box(xmin, ymin, xmax, ymax);

    let mut path = PathState {
        engine,
        open: false,
    };
    let mut ptbuf: Vec<Point> = Vec::new();

    while pm.good() {
        let pos = pm.pos();
        let op = pm.byte();
        match op {
            OP_STOP => {
                path.auto_close();
                return Ok(());
            }
            OP_SOLID_FILL => {
                let (r, g, b, a) = (pm.byte(), pm.byte(), pm.byte(), pm.byte());
                path.auto_close();
                path.engine.set_solid_fill(r, g, b, a);
            }
            OP_PALETTE_FILL => {
                let index = pm.byte() as usize;
                let color = palettes
                    .and_then(|p| p.color(palette_selector, index))
                    .ok_or(DrawError::InvalidPaletteIndex { pos, index })?;
                path.auto_close();
                path.engine
                    .set_solid_fill(color.r, color.g, color.b, color.a);
            }
            OP_MOVE_TO => {
                path.auto_close();
                path.engine.move_to(pm.point());
            }
            OP_MOVE_TO_CONT => {
                path.engine.move_to(pm.point());
            }
            0x80..=0x9f => {
                let rep = 1 + (op - OP_LINE_TO) as usize;
                pm.points(&mut ptbuf, rep);
                path.engine.line_to(&ptbuf);
                path.open = true;
            }
            0xa0..=0xaf => {
                let rep = 1 + (op - OP_CUBIC_TO) as usize;
                pm.points(&mut ptbuf, rep * 3);
                path.engine.cubic_bezier_to(&ptbuf);
                path.open = true;
            }
            0xb0..=0xbf => {
                let rep = 1 + (op - OP_QUADRATIC_TO) as usize;
                pm.points(&mut ptbuf, rep * 2);
                path.engine.quadratic_bezier_to(&ptbuf);
                path.open = true;
            }
            _ => return Err(DrawError::InvalidOpCode { pos, opcode: op }),
        }
    }

    debug!("Icon program ended without stop at byte {}", pm.pos());
    // a missing stop still fills the last open path
    path.auto_close();
    Ok(())
}
