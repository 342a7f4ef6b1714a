pub mod constants;
pub mod pack;
pub mod program;

use log::*;
use std::io::Write;

pub use crate::pack::format::{Icon, Pack, Palette, PaletteTable, Rgba, SharedPalettes, Variant};
pub use crate::pack::{decode, DecodeError, EncodingError, PackBuilder, VariantProgram};
pub use crate::program::{
    disassemble, dump_pack, quadratic_to_cubic, DrawEngine, DrawError, DrawErrorKind, Point,
    ProgramWriter,
};

/// Sets up `env_logger` for this crate. `RUST_LOG` overrides the default filter.
pub fn init_logging() -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter(Some("lib_icpk"), LevelFilter::Debug)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
}
