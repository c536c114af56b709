//! Built-in 5×7 bitmap font used when no TrueType font is available.
//!
//! Covers ASCII letters (lowercase drawn as uppercase), digits, space and a
//! little punctuation. Every other character, including all non-Latin
//! scripts, renders as a hollow box.

/// Glyph cell width in pixels, excluding the 1px gap between glyphs.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in pixels.
pub const GLYPH_HEIGHT: u32 = 7;

/// One row per entry, bit 4 is the leftmost pixel.
type Glyph = [u8; GLYPH_HEIGHT as usize];

const MISSING: Glyph = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

const SPACE: Glyph = [0; 7];

const LETTERS: [Glyph; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

fn glyph(c: char) -> &'static Glyph {
    match c {
        'A'..='Z' => &LETTERS[(c as u8 - b'A') as usize],
        'a'..='z' => &LETTERS[(c as u8 - b'a') as usize],
        '0'..='9' => &DIGITS[(c as u8 - b'0') as usize],
        ' ' => &SPACE,
        '-' => &[0, 0, 0, 0b11111, 0, 0, 0],
        '_' => &[0, 0, 0, 0, 0, 0, 0b11111],
        '.' => &[0, 0, 0, 0, 0, 0b01100, 0b01100],
        '!' => &[0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0, 0b00100],
        '?' => &[0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
        _ => &MISSING,
    }
}

/// Width and height, in unscaled cells, of `text` laid out on one line.
pub fn text_cells(text: &str) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    (n * (GLYPH_WIDTH + 1) - 1, GLYPH_HEIGHT)
}

/// Lit cells of `text` as `(column, row)` offsets from the top-left of the block.
pub fn lit_cells(text: &str) -> impl Iterator<Item = (u32, u32)> + '_ {
    text.chars().enumerate().flat_map(|(i, c)| {
        let left = i as u32 * (GLYPH_WIDTH + 1);
        let rows = glyph(c);
        (0..GLYPH_HEIGHT).flat_map(move |row| {
            let bits = rows[row as usize];
            (0..GLYPH_WIDTH)
                .filter(move |col| bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0)
                .map(move |col| (left + col, row))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_for_two_glyphs_include_gap() {
        assert_eq!(text_cells("AB"), (11, 7));
    }

    #[test]
    fn empty_text_has_no_cells() {
        assert_eq!(text_cells(""), (0, 0));
        assert_eq!(lit_cells("").count(), 0);
    }

    #[test]
    fn lowercase_matches_uppercase() {
        let upper: Vec<_> = lit_cells("K").collect();
        let lower: Vec<_> = lit_cells("k").collect();
        assert_eq!(upper, lower);
    }

    #[test]
    fn unknown_characters_render_as_box() {
        let boxed: Vec<_> = lit_cells("球").collect();
        // Outline of a 5×7 box: 5 + 5 + 2 × 5 sides
        assert_eq!(boxed.len(), 20);
        assert!(boxed.contains(&(0, 0)));
        assert!(boxed.contains(&(4, 6)));
    }

    #[test]
    fn second_glyph_is_offset_by_cell_and_gap() {
        let cells: Vec<_> = lit_cells(" I").collect();
        assert!(cells.iter().all(|(x, _)| *x >= GLYPH_WIDTH + 1));
    }

    #[test]
    fn space_is_blank() {
        assert_eq!(lit_cells("   ").count(), 0);
    }
}
