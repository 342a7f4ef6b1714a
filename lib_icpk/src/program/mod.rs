pub mod coord;
pub mod disasm;
pub mod engine;
pub mod interpreter;
pub mod writer;

pub use coord::{decode_coord, encode_coord, ProgCursor};
pub use disasm::{disassemble, dump_pack};
pub use engine::{quadratic_to_cubic, DrawEngine, DrawError, DrawErrorKind, Point};
pub use writer::{ProgramError, ProgramWriter};
