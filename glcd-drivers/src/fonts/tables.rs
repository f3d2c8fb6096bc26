//! Compiled-in variable-width fonts
//!
//! Both tables use the font descriptor layout documented in
//! `glcd_core::font` and are derived from the built-in 5x8 glyphs
//! (blank columns trimmed; the tall font doubled in both directions).

/// Variable-width font, 8 px tall, codes 0x20-0x7F
#[rustfmt::skip]
pub const PROPORTIONAL_8: &[u8] = &[
    // size, nominal width, height, first char, count
    0x02, 0x10, 0x05, 0x08, 0x20, 0x60,
    // widths
    0x03, 0x01, 0x03, 0x05, 0x05, 0x05, 0x05, 0x02, 0x03, 0x03, 0x05, 0x05, 0x02, 0x05, 0x02, 0x05,
    0x05, 0x03, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x02, 0x02, 0x04, 0x05, 0x04, 0x05,
    0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x03, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05,
    0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x03, 0x05, 0x03, 0x05, 0x05,
    0x03, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x03, 0x04, 0x04, 0x03, 0x05, 0x05, 0x05,
    0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x03, 0x01, 0x03, 0x05, 0x04,
    // bitmaps
    0x00, 0x00, 0x00, // 0x20 ' '
    0x5F, // 0x21 '!'
    0x07, 0x00, 0x07, // 0x22 '"'
    0x14, 0x7F, 0x14, 0x7F, 0x14, // 0x23 '#'
    0x24, 0x2A, 0x7F, 0x2A, 0x12, // 0x24 '$'
    0x23, 0x13, 0x08, 0x64, 0x62, // 0x25 '%'
    0x36, 0x49, 0x55, 0x22, 0x50, // 0x26 '&'
    0x05, 0x03, // 0x27 '\''
    0x1C, 0x22, 0x41, // 0x28 '('
    0x41, 0x22, 0x1C, // 0x29 ')'
    0x08, 0x2A, 0x1C, 0x2A, 0x08, // 0x2A '*'
    0x08, 0x08, 0x3E, 0x08, 0x08, // 0x2B '+'
    0x50, 0x30, // 0x2C ','
    0x08, 0x08, 0x08, 0x08, 0x08, // 0x2D '-'
    0x60, 0x60, // 0x2E '.'
    0x20, 0x10, 0x08, 0x04, 0x02, // 0x2F '/'
    0x3E, 0x51, 0x49, 0x45, 0x3E, // 0x30 '0'
    0x42, 0x7F, 0x40, // 0x31 '1'
    0x42, 0x61, 0x51, 0x49, 0x46, // 0x32 '2'
    0x21, 0x41, 0x45, 0x4B, 0x31, // 0x33 '3'
    0x18, 0x14, 0x12, 0x7F, 0x10, // 0x34 '4'
    0x27, 0x45, 0x45, 0x45, 0x39, // 0x35 '5'
    0x3C, 0x4A, 0x49, 0x49, 0x30, // 0x36 '6'
    0x01, 0x71, 0x09, 0x05, 0x03, // 0x37 '7'
    0x36, 0x49, 0x49, 0x49, 0x36, // 0x38 '8'
    0x06, 0x49, 0x49, 0x29, 0x1E, // 0x39 '9'
    0x36, 0x36, // 0x3A ':'
    0x56, 0x36, // 0x3B ';'
    0x08, 0x14, 0x22, 0x41, // 0x3C '<'
    0x14, 0x14, 0x14, 0x14, 0x14, // 0x3D '='
    0x41, 0x22, 0x14, 0x08, // 0x3E '>'
    0x02, 0x01, 0x51, 0x09, 0x06, // 0x3F '?'
    0x32, 0x49, 0x79, 0x41, 0x3E, // 0x40 '@'
    0x7E, 0x11, 0x11, 0x11, 0x7E, // 0x41 'A'
    0x7F, 0x49, 0x49, 0x49, 0x36, // 0x42 'B'
    0x3E, 0x41, 0x41, 0x41, 0x22, // 0x43 'C'
    0x7F, 0x41, 0x41, 0x22, 0x1C, // 0x44 'D'
    0x7F, 0x49, 0x49, 0x49, 0x41, // 0x45 'E'
    0x7F, 0x09, 0x09, 0x01, 0x01, // 0x46 'F'
    0x3E, 0x41, 0x41, 0x51, 0x32, // 0x47 'G'
    0x7F, 0x08, 0x08, 0x08, 0x7F, // 0x48 'H'
    0x41, 0x7F, 0x41, // 0x49 'I'
    0x20, 0x40, 0x41, 0x3F, 0x01, // 0x4A 'J'
    0x7F, 0x08, 0x14, 0x22, 0x41, // 0x4B 'K'
    0x7F, 0x40, 0x40, 0x40, 0x40, // 0x4C 'L'
    0x7F, 0x02, 0x04, 0x02, 0x7F, // 0x4D 'M'
    0x7F, 0x04, 0x08, 0x10, 0x7F, // 0x4E 'N'
    0x3E, 0x41, 0x41, 0x41, 0x3E, // 0x4F 'O'
    0x7F, 0x09, 0x09, 0x09, 0x06, // 0x50 'P'
    0x3E, 0x41, 0x51, 0x21, 0x5E, // 0x51 'Q'
    0x7F, 0x09, 0x19, 0x29, 0x46, // 0x52 'R'
    0x46, 0x49, 0x49, 0x49, 0x31, // 0x53 'S'
    0x01, 0x01, 0x7F, 0x01, 0x01, // 0x54 'T'
    0x3F, 0x40, 0x40, 0x40, 0x3F, // 0x55 'U'
    0x1F, 0x20, 0x40, 0x20, 0x1F, // 0x56 'V'
    0x7F, 0x20, 0x18, 0x20, 0x7F, // 0x57 'W'
    0x63, 0x14, 0x08, 0x14, 0x63, // 0x58 'X'
    0x03, 0x04, 0x78, 0x04, 0x03, // 0x59 'Y'
    0x61, 0x51, 0x49, 0x45, 0x43, // 0x5A 'Z'
    0x7F, 0x41, 0x41, // 0x5B '['
    0x02, 0x04, 0x08, 0x10, 0x20, // 0x5C '\\'
    0x41, 0x41, 0x7F, // 0x5D ']'
    0x04, 0x02, 0x01, 0x02, 0x04, // 0x5E '^'
    0x40, 0x40, 0x40, 0x40, 0x40, // 0x5F '_'
    0x01, 0x02, 0x04, // 0x60 '`'
    0x20, 0x54, 0x54, 0x54, 0x78, // 0x61 'a'
    0x7F, 0x48, 0x44, 0x44, 0x38, // 0x62 'b'
    0x38, 0x44, 0x44, 0x44, 0x20, // 0x63 'c'
    0x38, 0x44, 0x44, 0x48, 0x7F, // 0x64 'd'
    0x38, 0x54, 0x54, 0x54, 0x18, // 0x65 'e'
    0x08, 0x7E, 0x09, 0x01, 0x02, // 0x66 'f'
    0x08, 0x14, 0x54, 0x54, 0x3C, // 0x67 'g'
    0x7F, 0x08, 0x04, 0x04, 0x78, // 0x68 'h'
    0x44, 0x7D, 0x40, // 0x69 'i'
    0x20, 0x40, 0x44, 0x3D, // 0x6A 'j'
    0x7F, 0x10, 0x28, 0x44, // 0x6B 'k'
    0x41, 0x7F, 0x40, // 0x6C 'l'
    0x7C, 0x04, 0x18, 0x04, 0x78, // 0x6D 'm'
    0x7C, 0x08, 0x04, 0x04, 0x78, // 0x6E 'n'
    0x38, 0x44, 0x44, 0x44, 0x38, // 0x6F 'o'
    0x7C, 0x14, 0x14, 0x14, 0x08, // 0x70 'p'
    0x08, 0x14, 0x14, 0x18, 0x7C, // 0x71 'q'
    0x7C, 0x08, 0x04, 0x04, 0x08, // 0x72 'r'
    0x48, 0x54, 0x54, 0x54, 0x20, // 0x73 's'
    0x04, 0x3F, 0x44, 0x40, 0x20, // 0x74 't'
    0x3C, 0x40, 0x40, 0x20, 0x7C, // 0x75 'u'
    0x1C, 0x20, 0x40, 0x20, 0x1C, // 0x76 'v'
    0x3C, 0x40, 0x30, 0x40, 0x3C, // 0x77 'w'
    0x44, 0x28, 0x10, 0x28, 0x44, // 0x78 'x'
    0x0C, 0x50, 0x50, 0x50, 0x3C, // 0x79 'y'
    0x44, 0x64, 0x54, 0x4C, 0x44, // 0x7A 'z'
    0x08, 0x36, 0x41, // 0x7B '{'
    0x7F, // 0x7C '|'
    0x41, 0x36, 0x08, // 0x7D '}'
    0x08, 0x04, 0x08, 0x10, 0x08, // 0x7E '~'
    0x06, 0x09, 0x09, 0x06, // 0x7F (degree sign)
];

/// Variable-width font, 14 px tall (two page rows), codes 0x20-0x7E
///
/// The second page row is stored bottom-aligned.
#[rustfmt::skip]
pub const TALL_14: &[u8] = &[
    // size, nominal width, height, first char, count
    0x06, 0xF9, 0x0A, 0x0E, 0x20, 0x5F,
    // widths
    0x04, 0x02, 0x06, 0x0A, 0x0A, 0x0A, 0x0A, 0x04, 0x06, 0x06, 0x0A, 0x0A, 0x04, 0x0A, 0x04, 0x0A,
    0x0A, 0x06, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x04, 0x04, 0x08, 0x0A, 0x08, 0x0A,
    0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x06, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A,
    0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x06, 0x0A, 0x06, 0x0A, 0x0A,
    0x06, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x06, 0x08, 0x08, 0x06, 0x0A, 0x0A, 0x0A,
    0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x0A, 0x06, 0x02, 0x06, 0x0A,
    // bitmaps
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x20 ' '
    0xFF, 0xFF, 0xCC, 0xCC, // 0x21 '!'
    0x3F, 0x3F, 0x00, 0x00, 0x3F, 0x3F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x22 '"'
    0x30, 0x30, 0xFF, 0xFF, 0x30, 0x30, 0xFF, 0xFF, 0x30, 0x30, 0x0C, 0x0C, 0xFC, 0xFC, 0x0C, 0x0C, 0xFC, 0xFC, 0x0C, 0x0C, // 0x23 '#'
    0x30, 0x30, 0xCC, 0xCC, 0xFF, 0xFF, 0xCC, 0xCC, 0x0C, 0x0C, 0x30, 0x30, 0x30, 0x30, 0xFC, 0xFC, 0x30, 0x30, 0x0C, 0x0C, // 0x24 '$'
    0x0F, 0x0F, 0x0F, 0x0F, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x30, 0x30, 0x0C, 0x0C, 0x00, 0x00, 0xF0, 0xF0, 0xF0, 0xF0, // 0x25 '%'
    0x3C, 0x3C, 0xC3, 0xC3, 0x33, 0x33, 0x0C, 0x0C, 0x00, 0x00, 0x3C, 0x3C, 0xC0, 0xC0, 0xCC, 0xCC, 0x30, 0x30, 0xCC, 0xCC, // 0x26 '&'
    0x33, 0x33, 0x0F, 0x0F, 0x00, 0x00, 0x00, 0x00, // 0x27 '\''
    0xF0, 0xF0, 0x0C, 0x0C, 0x03, 0x03, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x28 '('
    0x03, 0x03, 0x0C, 0x0C, 0xF0, 0xF0, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, // 0x29 ')'
    0xC0, 0xC0, 0xCC, 0xCC, 0xF0, 0xF0, 0xCC, 0xCC, 0xC0, 0xC0, 0x00, 0x00, 0x30, 0x30, 0x0C, 0x0C, 0x30, 0x30, 0x00, 0x00, // 0x2A '*'
    0xC0, 0xC0, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x3C, 0x3C, 0x00, 0x00, 0x00, 0x00, // 0x2B '+'
    0x00, 0x00, 0x00, 0x00, 0xCC, 0xCC, 0x3C, 0x3C, // 0x2C ','
    0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x2D '-'
    0x00, 0x00, 0x00, 0x00, 0xF0, 0xF0, 0xF0, 0xF0, // 0x2E '.'
    0x00, 0x00, 0x00, 0x00, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x30, 0x30, 0x0C, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x2F '/'
    0xFC, 0xFC, 0x03, 0x03, 0xC3, 0xC3, 0x33, 0x33, 0xFC, 0xFC, 0x3C, 0x3C, 0xCC, 0xCC, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x30 '0'
    0x0C, 0x0C, 0xFF, 0xFF, 0x00, 0x00, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, // 0x31 '1'
    0x0C, 0x0C, 0x03, 0x03, 0x03, 0x03, 0xC3, 0xC3, 0x3C, 0x3C, 0xC0, 0xC0, 0xF0, 0xF0, 0xCC, 0xCC, 0xC0, 0xC0, 0xC0, 0xC0, // 0x32 '2'
    0x03, 0x03, 0x03, 0x03, 0x33, 0x33, 0xCF, 0xCF, 0x03, 0x03, 0x30, 0x30, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x33 '3'
    0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0xFF, 0xFF, 0x00, 0x00, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0xFC, 0xFC, 0x0C, 0x0C, // 0x34 '4'
    0x3F, 0x3F, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0xC3, 0xC3, 0x30, 0x30, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x35 '5'
    0xF0, 0xF0, 0xCC, 0xCC, 0xC3, 0xC3, 0xC3, 0xC3, 0x00, 0x00, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x36 '6'
    0x03, 0x03, 0x03, 0x03, 0xC3, 0xC3, 0x33, 0x33, 0x0F, 0x0F, 0x00, 0x00, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x37 '7'
    0x3C, 0x3C, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x3C, 0x3C, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x38 '8'
    0x3C, 0x3C, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xFC, 0xFC, 0x00, 0x00, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, // 0x39 '9'
    0x3C, 0x3C, 0x3C, 0x3C, 0x3C, 0x3C, 0x3C, 0x3C, // 0x3A ':'
    0x3C, 0x3C, 0x3C, 0x3C, 0xCC, 0xCC, 0x3C, 0x3C, // 0x3B ';'
    0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x03, 0x03, 0x00, 0x00, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x3C '<'
    0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, // 0x3D '='
    0x03, 0x03, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x00, 0x00, // 0x3E '>'
    0x0C, 0x0C, 0x03, 0x03, 0x03, 0x03, 0xC3, 0xC3, 0x3C, 0x3C, 0x00, 0x00, 0x00, 0x00, 0xCC, 0xCC, 0x00, 0x00, 0x00, 0x00, // 0x3F '?'
    0x0C, 0x0C, 0xC3, 0xC3, 0xC3, 0xC3, 0x03, 0x03, 0xFC, 0xFC, 0x3C, 0x3C, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0x3C, 0x3C, // 0x40 '@'
    0xFC, 0xFC, 0x03, 0x03, 0x03, 0x03, 0x03, 0x03, 0xFC, 0xFC, 0xFC, 0xFC, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0xFC, 0xFC, // 0x41 'A'
    0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x3C, 0x3C, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x42 'B'
    0xFC, 0xFC, 0x03, 0x03, 0x03, 0x03, 0x03, 0x03, 0x0C, 0x0C, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, // 0x43 'C'
    0xFF, 0xFF, 0x03, 0x03, 0x03, 0x03, 0x0C, 0x0C, 0xF0, 0xF0, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, // 0x44 'D'
    0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x03, 0x03, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, // 0x45 'E'
    0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0x03, 0x03, 0x03, 0x03, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x46 'F'
    0xFC, 0xFC, 0x03, 0x03, 0x03, 0x03, 0x03, 0x03, 0x0C, 0x0C, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xCC, 0xCC, 0x3C, 0x3C, // 0x47 'G'
    0xFF, 0xFF, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xFF, 0xFF, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, // 0x48 'H'
    0x03, 0x03, 0xFF, 0xFF, 0x03, 0x03, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, // 0x49 'I'
    0x00, 0x00, 0x00, 0x00, 0x03, 0x03, 0xFF, 0xFF, 0x03, 0x03, 0x30, 0x30, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, 0x00, 0x00, // 0x4A 'J'
    0xFF, 0xFF, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x03, 0x03, 0xFC, 0xFC, 0x00, 0x00, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x4B 'K'
    0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, // 0x4C 'L'
    0xFF, 0xFF, 0x0C, 0x0C, 0x30, 0x30, 0x0C, 0x0C, 0xFF, 0xFF, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, // 0x4D 'M'
    0xFF, 0xFF, 0x30, 0x30, 0xC0, 0xC0, 0x00, 0x00, 0xFF, 0xFF, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0xFC, 0xFC, // 0x4E 'N'
    0xFC, 0xFC, 0x03, 0x03, 0x03, 0x03, 0x03, 0x03, 0xFC, 0xFC, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x4F 'O'
    0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x3C, 0x3C, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x50 'P'
    0xFC, 0xFC, 0x03, 0x03, 0x03, 0x03, 0x03, 0x03, 0xFC, 0xFC, 0x3C, 0x3C, 0xC0, 0xC0, 0xCC, 0xCC, 0x30, 0x30, 0xCC, 0xCC, // 0x51 'Q'
    0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x3C, 0x3C, 0xFC, 0xFC, 0x00, 0x00, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x52 'R'
    0x3C, 0x3C, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0x03, 0x03, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x53 'S'
    0x03, 0x03, 0x03, 0x03, 0xFF, 0xFF, 0x03, 0x03, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, // 0x54 'T'
    0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x55 'U'
    0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, // 0x56 'V'
    0xFF, 0xFF, 0x00, 0x00, 0xC0, 0xC0, 0x00, 0x00, 0xFF, 0xFF, 0xFC, 0xFC, 0x30, 0x30, 0x0C, 0x0C, 0x30, 0x30, 0xFC, 0xFC, // 0x57 'W'
    0x0F, 0x0F, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0x0F, 0x0F, 0xF0, 0xF0, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0xF0, 0xF0, // 0x58 'X'
    0x0F, 0x0F, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0x0F, 0x0F, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, // 0x59 'Y'
    0x03, 0x03, 0x03, 0x03, 0xC3, 0xC3, 0x33, 0x33, 0x0F, 0x0F, 0xF0, 0xF0, 0xCC, 0xCC, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, // 0x5A 'Z'
    0xFF, 0xFF, 0x03, 0x03, 0x03, 0x03, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, // 0x5B '['
    0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x30, 0x30, // 0x5C '\\'
    0x03, 0x03, 0x03, 0x03, 0xFF, 0xFF, 0xC0, 0xC0, 0xC0, 0xC0, 0xFC, 0xFC, // 0x5D ']'
    0x30, 0x30, 0x0C, 0x0C, 0x03, 0x03, 0x0C, 0x0C, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x5E '^'
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, // 0x5F '_'
    0x03, 0x03, 0x0C, 0x0C, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x60 '`'
    0x00, 0x00, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xFC, 0xFC, // 0x61 'a'
    0xFF, 0xFF, 0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x62 'b'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x00, 0x00, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, // 0x63 'c'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFF, 0xFF, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xFC, 0xFC, // 0x64 'd'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0x3C, 0x3C, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0x0C, 0x0C, // 0x65 'e'
    0xC0, 0xC0, 0xFC, 0xFC, 0xC3, 0xC3, 0x03, 0x03, 0x0C, 0x0C, 0x00, 0x00, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x66 'f'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xF0, 0xF0, 0x00, 0x00, 0x0C, 0x0C, 0xCC, 0xCC, 0xCC, 0xCC, 0x3C, 0x3C, // 0x67 'g'
    0xFF, 0xFF, 0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, // 0x68 'h'
    0x30, 0x30, 0xF3, 0xF3, 0x00, 0x00, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, // 0x69 'i'
    0x00, 0x00, 0x00, 0x00, 0x30, 0x30, 0xF3, 0xF3, 0x30, 0x30, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x6A 'j'
    0xFF, 0xFF, 0x00, 0x00, 0xC0, 0xC0, 0x30, 0x30, 0xFC, 0xFC, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x6B 'k'
    0x03, 0x03, 0xFF, 0xFF, 0x00, 0x00, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, // 0x6C 'l'
    0xF0, 0xF0, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0x00, 0x00, 0x0C, 0x0C, 0x00, 0x00, 0xFC, 0xFC, // 0x6D 'm'
    0xF0, 0xF0, 0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC, 0xFC, // 0x6E 'n'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, // 0x6F 'o'
    0xF0, 0xF0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x00, 0x00, // 0x70 'p'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xF0, 0xF0, 0x00, 0x00, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0xFC, 0xFC, // 0x71 'q'
    0xF0, 0xF0, 0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0xC0, 0xC0, 0xFC, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x72 'r'
    0xC0, 0xC0, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x00, 0x00, 0xC0, 0xC0, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0x30, 0x30, // 0x73 's'
    0x30, 0x30, 0xFF, 0xFF, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, // 0x74 't'
    0xF0, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0xF0, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0x30, 0x30, 0xFC, 0xFC, // 0x75 'u'
    0xF0, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0xF0, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, // 0x76 'v'
    0xF0, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0xF0, 0x3C, 0x3C, 0xC0, 0xC0, 0x3C, 0x3C, 0xC0, 0xC0, 0x3C, 0x3C, // 0x77 'w'
    0x30, 0x30, 0xC0, 0xC0, 0x00, 0x00, 0xC0, 0xC0, 0x30, 0x30, 0xC0, 0xC0, 0x30, 0x30, 0x0C, 0x0C, 0x30, 0x30, 0xC0, 0xC0, // 0x78 'x'
    0xF0, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0xF0, 0x00, 0x00, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0x3C, 0x3C, // 0x79 'y'
    0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0xF0, 0xF0, 0x30, 0x30, 0xC0, 0xC0, 0xF0, 0xF0, 0xCC, 0xCC, 0xC0, 0xC0, 0xC0, 0xC0, // 0x7A 'z'
    0xC0, 0xC0, 0x3C, 0x3C, 0x03, 0x03, 0x00, 0x00, 0x3C, 0x3C, 0xC0, 0xC0, // 0x7B '{'
    0xFF, 0xFF, 0xFC, 0xFC, // 0x7C '|'
    0x03, 0x03, 0x3C, 0x3C, 0xC0, 0xC0, 0xC0, 0xC0, 0x3C, 0x3C, 0x00, 0x00, // 0x7D '}'
    0xC0, 0xC0, 0x30, 0x30, 0xC0, 0xC0, 0x00, 0x00, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x00, 0x00, // 0x7E '~'
];
