//! Variable-width coordinate encoding.
//!
//! The low two bits of the first byte select the form:
//! - `xxxxxxx1`: one byte, integer in `-64..=63`
//! - `xxxxxx10`: two bytes (LE), 1/64 fixed point in `-128.0..128.0`
//! - `xxxxxx00`: four bytes (LE), IEEE-754 binary32

use super::engine::Point;

/// Reads bytes and coordinates from a bounded program range.
///
/// Reads past the end yield zero and never advance beyond it.
#[derive(Debug, Clone)]
pub struct ProgCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ProgCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn good(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Offset of the next byte, relative to the start of the range.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether the next coordinate lies entirely within the range.
    pub fn has_coord(&self) -> bool {
        match self.data.get(self.pos) {
            Some(&b0) => self.pos + coord_width(b0) <= self.data.len(),
            None => false,
        }
    }

    pub fn byte(&mut self) -> u8 {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                b
            }
            None => 0,
        }
    }

    pub fn coord(&mut self) -> f32 {
        if !self.good() {
            return 0.0;
        }

        let b0 = self.byte();
        if b0 & 0x01 != 0 {
            return ((b0 >> 1) as i32 - 64) as f32;
        }

        let b1 = self.byte();
        if b0 & 0x02 != 0 {
            let u = u16::from_le_bytes([b0, b1]);
            return ((u >> 2) as i32 - 128 * 64) as f32 / 64.0;
        }

        let b2 = self.byte();
        let b3 = self.byte();
        f32::from_le_bytes([b0, b1, b2, b3])
    }

    pub fn point(&mut self) -> Point {
        let x = self.coord();
        let y = self.coord();
        Point { x, y }
    }

    /// Replaces the contents of `dest` with `n` points.
    pub fn points(&mut self, dest: &mut Vec<Point>, n: usize) {
        dest.clear();
        dest.reserve(n);
        for _ in 0..n {
            dest.push(self.point());
        }
    }
}

/// Encoded length of a coordinate starting with `b0`.
fn coord_width(b0: u8) -> usize {
    if b0 & 0x01 != 0 {
        1
    } else if b0 & 0x02 != 0 {
        2
    } else {
        4
    }
}

/// Decodes one coordinate from the front of `bytes`, returning the value and
/// the number of bytes consumed.
pub fn decode_coord(bytes: &[u8]) -> (f32, usize) {
    let mut cursor = ProgCursor::new(bytes);
    let value = cursor.coord();
    (value, cursor.pos())
}

/// Encodes `v` in the shortest form that represents it within `precision`,
/// writing into `buf` and returning the number of bytes used.
pub fn encode_coord(buf: &mut [u8; 4], v: f32, precision: f32) -> usize {
    let i = v.round();
    if (v - i).abs() <= precision && (-64.0..64.0).contains(&i) {
        buf[0] = (((i as i32 + 64) as u8) << 1) | 0x01;
        return 1;
    }

    let n = (v * 64.0).round() / 64.0;
    if (v - n).abs() <= precision && (-128.0..128.0).contains(&n) {
        let x = (((n * 64.0) as i32 + 128 * 64) as u16) << 2 | 0x02;
        buf[..2].copy_from_slice(&x.to_le_bytes());
        return 2;
    }

    let mut bytes = v.to_bits().to_le_bytes();
    bytes[0] &= !0x03;
    *buf = bytes;
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_byte_form() {
        for b0 in (0u8..=255).filter(|b| b & 0x01 != 0) {
            let (v, n) = decode_coord(&[b0, 0xff, 0xff]);
            assert_eq!(n, 1);
            assert_eq!(v, ((b0 >> 1) as i32 - 64) as f32);
        }
        assert_eq!(decode_coord(&[0x01]), (-64.0, 1));
        assert_eq!(decode_coord(&[0xff]), (63.0, 1));
        assert_eq!(decode_coord(&[0x81]), (0.0, 1));
    }

    #[test]
    fn test_two_byte_form() {
        for b0 in (0u8..=255).filter(|b| b & 0x03 == 0x02) {
            for b1 in [0x00u8, 0x01, 0x7f, 0x80, 0xfe, 0xff] {
                let (v, n) = decode_coord(&[b0, b1, 0xaa]);
                let u = b0 as u32 | (b1 as u32) << 8;
                assert_eq!(n, 2);
                assert_eq!(v, ((u >> 2) as i32 - 128 * 64) as f32 / 64.0);
            }
        }
        // 0.0 is 128*64 << 2 | 2 = 0x8002
        assert_eq!(decode_coord(&[0x02, 0x80]), (0.0, 2));
        assert_eq!(decode_coord(&[0x02, 0x00]), (-128.0, 2));
    }

    #[test]
    fn test_four_byte_form() {
        for v in [0.0f32, 1.5e-3, -3.25, 1000.0, 12345.678, f32::MAX] {
            let mut bytes = v.to_bits().to_le_bytes();
            bytes[0] &= !0x03;
            let (decoded, n) = decode_coord(&bytes);
            assert_eq!(n, 4);
            assert_eq!(decoded.to_bits(), u32::from_le_bytes(bytes));
        }
    }

    #[test]
    fn test_empty_and_truncated() {
        assert_eq!(decode_coord(&[]), (0.0, 0));

        // missing high byte reads as zero
        let (v, n) = decode_coord(&[0x06]);
        assert_eq!(n, 1);
        assert_eq!(v, (1 - 128 * 64) as f32 / 64.0);

        let (v, n) = decode_coord(&[0x00, 0x00]);
        assert_eq!(n, 2);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_encode_shortest_form() {
        let mut buf = [0u8; 4];
        assert_eq!(encode_coord(&mut buf, 12.0, 0.0), 1);
        assert_eq!(encode_coord(&mut buf, -64.0, 0.0), 1);
        assert_eq!(encode_coord(&mut buf, 64.0, 0.0), 2);
        assert_eq!(encode_coord(&mut buf, 1.25, 0.0), 2);
        assert_eq!(encode_coord(&mut buf, 1.26, 0.0), 4);
        assert_eq!(encode_coord(&mut buf, 1.26, 0.01), 2);
        assert_eq!(encode_coord(&mut buf, 500.0, 0.0), 4);
    }

    #[test]
    fn test_exact_values_survive_encoding() {
        let mut buf = [0u8; 4];
        let mut values: Vec<f32> = (-64..64).map(|i| i as f32).collect();
        values.extend((-128 * 64..128 * 64).step_by(37).map(|i| i as f32 / 64.0));

        for v in values {
            let n = encode_coord(&mut buf, v, 0.0);
            assert!(n <= 2, "{} needed {} bytes", v, n);
            assert_eq!(decode_coord(&buf[..n]), (v, n));
        }
    }

    #[test]
    fn test_cursor_points() {
        let mut cursor = ProgCursor::new(&[0x83, 0x85, 0x02, 0x80, 0x87]);
        let mut pts = Vec::new();
        cursor.points(&mut pts, 2);
        assert_eq!(pts, vec![Point::new(1.0, 2.0), Point::new(0.0, 3.0)]);
        assert!(!cursor.good());
        assert_eq!(cursor.byte(), 0);
        assert_eq!(cursor.pos(), 5);
    }

    #[test]
    fn test_has_coord() {
        assert!(!ProgCursor::new(&[]).has_coord());
        assert!(ProgCursor::new(&[0x81]).has_coord());
        assert!(!ProgCursor::new(&[0x02]).has_coord());
        assert!(ProgCursor::new(&[0x02, 0x80]).has_coord());
        assert!(!ProgCursor::new(&[0x00, 0x00, 0x00]).has_coord());
        assert!(ProgCursor::new(&[0x00, 0x00, 0x00, 0x00]).has_coord());

        let mut cursor = ProgCursor::new(&[0x81, 0x00, 0x00]);
        cursor.coord();
        assert!(!cursor.has_coord());
    }
}
