use std::fmt::Write;

use super::coord::ProgCursor;
use crate::pack::format::Pack;

struct Lister<'a> {
    data: &'a [u8],
    pm: ProgCursor<'a>,
    out: String,
    invalid: bool,
}

impl Lister<'_> {
    fn hex(&self, start: usize, end: usize) -> String {
        self.data[start..end]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn point(&mut self) {
        let start = self.pm.pos();
        let p = self.pm.point();
        let dump = self.hex(start, self.pm.pos());
        let _ = writeln!(self.out, "{:<24}   {:8.4}  {:8.4}", dump, p.x, p.y);
    }

    fn step(&mut self) {
        if self.invalid {
            let start = self.pm.pos();
            let end = (start + 8).min(self.data.len());
            let dump = self.hex(start, end);
            let _ = writeln!(self.out, "{}", dump);
            for _ in start..end {
                self.pm.byte();
            }
            return;
        }

        let start = self.pm.pos();
        let op = self.pm.byte();
        let (cmd, npoints) = match op {
            0x00 => ("STOP".to_string(), 0),
            0x01 => {
                let (r, g, b, a) = (self.pm.byte(), self.pm.byte(), self.pm.byte(), self.pm.byte());
                let color = if a != 255 {
                    format!(
                        "rgba({:.4}, {:.4}, {:.4}, {:.4})",
                        r as f32 / 255.0,
                        g as f32 / 255.0,
                        b as f32 / 255.0,
                        a as f32 / 255.0
                    )
                } else {
                    format!("#{:02x}{:02x}{:02x}", r, g, b)
                };
                (format!("SOLIDFILL {}", color), 0)
            }
            0x02 => (format!("PALFILL {}", self.pm.byte()), 0),
            0x70 => ("M-begin".to_string(), 1),
            0x71 => ("M-cont".to_string(), 1),
            0x80..=0x9f => {
                let n = (op - 0x80) as usize + 1;
                (format!("L {}", n), n)
            }
            0xa0..=0xaf => {
                let n = (op - 0xa0) as usize + 1;
                (format!("C {}", n), n * 3)
            }
            0xb0..=0xbf => {
                let n = (op - 0xb0) as usize + 1;
                (format!("Q {}", n), n * 2)
            }
            _ => {
                self.invalid = true;
                ("INVALID".to_string(), 0)
            }
        };

        let dump = self.hex(start, self.pm.pos());
        let _ = writeln!(self.out, "{:<24}  {}", dump, cmd);
        for _ in 0..npoints {
            self.point();
        }
    }
}

/// Produces a listing of an icon program: the view box, then one line per
/// opcode followed by its points. Bytes after an invalid opcode are dumped
/// raw.
pub fn disassemble(program: &[u8]) -> String {
    let mut lister = Lister {
        data: program,
        pm: ProgCursor::new(program),
        out: String::new(),
        invalid: false,
    };

    lister.out.push_str("# viewbox:\n");
    lister.point();
    lister.point();

    while lister.pm.good() {
        lister.step();
    }
    lister.out
}

/// Lists every variant of every icon in `pack`.
pub fn dump_pack(pack: &Pack) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} icons", pack.len());
    for icon in pack {
        for variant in icon.variants() {
            let _ = writeln!(
                out,
                "ICON {:?} {}×{}",
                icon.name(),
                variant.width,
                variant.height
            );
            match icon.program(variant) {
                Some(program) => out.push_str(&disassemble(program)),
                None => out.push_str("# program out of range\n"),
            }
        }
    }
    out
}
