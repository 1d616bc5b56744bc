//! Blockies identicons: a mirrored 8x8 grid in three colours, all drawn
//! from an xorshift generator seeded with the owner address.

const SIZE: usize = 8;
const DISPLAY_PX: u32 = 48;

struct Seed([i32; 4]);

impl Seed {
    fn from_text(text: &str) -> Self {
        let mut state = [0i32; 4];
        for (i, unit) in text.encode_utf16().enumerate() {
            let slot = &mut state[i % 4];
            *slot = slot
                .wrapping_shl(5)
                .wrapping_sub(*slot)
                .wrapping_add(unit as i32);
        }
        Seed(state)
    }

    /// Uniform-ish value in `[0, 2)`, like the reference generator.
    fn next(&mut self) -> f64 {
        let s = &mut self.0;
        let t = s[0] ^ s[0].wrapping_shl(11);
        s[0] = s[1];
        s[1] = s[2];
        s[2] = s[3];
        s[3] = s[3] ^ (s[3] >> 19) ^ t ^ (t >> 8);
        (s[3] as u32) as f64 / (1u32 << 31) as f64
    }

    fn color(&mut self) -> String {
        let hue = (self.next() * 360.0).floor();
        let saturation = self.next() * 60.0 + 40.0;
        let lightness = (self.next() + self.next() + self.next() + self.next()) * 25.0;
        format!("hsl({},{:.1}%,{:.1}%)", hue, saturation, lightness)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identicon {
    pub color: String,
    pub background: String,
    pub spot: String,
    /// Row-major cells: 0 background, 1 colour, 2 spot.
    pub cells: Vec<u8>,
}

impl Identicon {
    pub fn new(seed: &str) -> Self {
        let mut rng = Seed::from_text(&seed.to_lowercase());
        let color = rng.color();
        let background = rng.color();
        let spot = rng.color();

        let data_width = (SIZE + 1) / 2;
        let mirror_width = SIZE - data_width;
        let mut cells = Vec::with_capacity(SIZE * SIZE);

        for _ in 0..SIZE {
            let row: Vec<u8> = (0..data_width)
                .map(|_| ((rng.next() * 2.3).floor() as u8).min(2))
                .collect();
            cells.extend_from_slice(&row);
            cells.extend(row[..mirror_width].iter().rev());
        }

        Identicon {
            color,
            background,
            spot,
            cells,
        }
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{px}" height="{px}" viewBox="0 0 {n} {n}" shape-rendering="crispEdges"><rect width="{n}" height="{n}" fill="{bg}"/>"#,
            px = DISPLAY_PX,
            n = SIZE,
            bg = self.background
        );

        for (i, cell) in self.cells.iter().enumerate() {
            let fill = match cell {
                1 => &self.color,
                2 => &self.spot,
                _ => continue,
            };
            svg.push_str(&format!(
                r#"<rect x="{}" y="{}" width="1" height="1" fill="{}"/>"#,
                i % SIZE,
                i / SIZE,
                fill
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1";

    #[test]
    fn same_address_same_icon() {
        assert_eq!(Identicon::new(OWNER), Identicon::new(OWNER));
        assert_eq!(Identicon::new(OWNER), Identicon::new(&OWNER.to_lowercase()));
    }

    #[test]
    fn rows_are_mirrored() {
        let icon = Identicon::new(OWNER);

        assert_eq!(icon.cells.len(), SIZE * SIZE);
        for row in icon.cells.chunks(SIZE) {
            let reversed: Vec<u8> = row.iter().rev().copied().collect();
            assert_eq!(row, reversed.as_slice());
            assert!(row.iter().all(|cell| *cell <= 2));
        }
    }

    #[test]
    fn different_addresses_differ() {
        let other = Identicon::new("0x0000000000000000000000000000000000000001");

        assert_ne!(Identicon::new(OWNER), other);
    }

    #[test]
    fn svg_is_self_contained() {
        let svg = Identicon::new(OWNER).to_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="48""#));
    }

    #[test]
    fn svg_draws_one_rect_per_coloured_cell() {
        let icon = Identicon::new(OWNER);
        let coloured = icon.cells.iter().filter(|cell| **cell != 0).count();

        // plus the background rect
        assert_eq!(icon.to_svg().matches("<rect").count(), coloured + 1);
    }
}
