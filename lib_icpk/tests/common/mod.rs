#![allow(dead_code)]

use lib_icpk::{DrawEngine, DrawError, Point, ProgramWriter};

/// Everything the interpreter asked the engine to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ViewBox(f32, f32, f32, f32),
    SolidFill(u8, u8, u8, u8),
    MoveTo(Point),
    LineTo(Vec<Point>),
    CubicTo(Vec<Point>),
    QuadraticTo(Vec<Point>),
    ClosePath,
    Error(DrawError),
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn errors(&self) -> Vec<DrawError> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Error(e) => Some(*e),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(wanted))
            .count()
    }
}

impl DrawEngine for Recorder {
    fn view_box(&mut self, xmin: f32, ymin: f32, xmax: f32, ymax: f32) {
        self.calls.push(Call::ViewBox(xmin, ymin, xmax, ymax));
    }

    fn set_solid_fill(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.calls.push(Call::SolidFill(r, g, b, a));
    }

    fn move_to(&mut self, p: Point) {
        self.calls.push(Call::MoveTo(p));
    }

    fn line_to(&mut self, pts: &[Point]) {
        self.calls.push(Call::LineTo(pts.to_vec()));
    }

    fn cubic_bezier_to(&mut self, pts: &[Point]) {
        self.calls.push(Call::CubicTo(pts.to_vec()));
    }

    fn quadratic_bezier_to(&mut self, pts: &[Point]) {
        self.calls.push(Call::QuadraticTo(pts.to_vec()));
    }

    fn close_path(&mut self) {
        self.calls.push(Call::ClosePath);
    }

    fn error(&mut self, err: &DrawError) {
        self.calls.push(Call::Error(*err));
    }
}

pub fn pt(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// A program with a 0,0–16,16 view box and nothing else.
pub fn program_header() -> ProgramWriter {
    let mut w = ProgramWriter::new(0.0);
    w.view_box(0.0, 0.0, 16.0, 16.0);
    w
}

/// A filled triangle in `color`, tagged by its first x coordinate.
pub fn triangle_program(tag: f32, color: [u8; 4]) -> Vec<u8> {
    let mut w = program_header();
    w.solid_fill(color[0], color[1], color[2], color[3])
        .move_to(pt(tag, 0.0))
        .line_to(&[pt(8.0, 8.0), pt(0.0, 8.0)])
        .unwrap()
        .stop();
    w.into_bytes()
}

pub fn view_box_16() -> Call {
    Call::ViewBox(0.0, 0.0, 16.0, 16.0)
}
