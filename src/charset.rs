// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const BINARY: Charset = Charset(0x1);
    pub const KATAKANA: Charset = Charset(0x2);
    pub const GREEK: Charset = Charset(0x4);
    pub const HEX: Charset = Charset(0x8);
    pub const LETTERS: Charset = Charset(0x10);
    pub const DIGITS: Charset = Charset(0x20);
    pub const SYMBOLS: Charset = Charset(0x40);

    pub const MATRIX: Charset = Charset(0x3);
    pub const NEXUS: Charset = Charset(0x7);
    pub const ASCII: Charset = Charset(0x70);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub const PRESETS: &[(&str, &str)] = &[
    ("auto", "nexus on UTF-8 terminals, ascii otherwise"),
    ("matrix", "binary digits and half-width katakana"),
    ("nexus", "matrix plus greek capitals"),
    ("binary", "0 and 1"),
    ("hex", "0-9 A-F"),
    ("katakana", "half-width katakana"),
    ("greek", "greek capitals"),
    ("ascii", "letters, digits and shell punctuation"),
];

pub fn charset_from_str(name: &str, default_to_ascii: bool) -> Result<Charset, String> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::ASCII
        } else {
            Charset::NEXUS
        }),
        "matrix" => Ok(Charset::MATRIX),
        "nexus" => Ok(Charset::NEXUS),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" => Ok(Charset::HEX),
        "katakana" => Ok(Charset::KATAKANA),
        "greek" => Ok(Charset::GREEK),
        "ascii" => Ok(Charset::ASCII),
        _ => Err(format!("unsupported charset: {} (see --list-charsets)", name)),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

pub fn build_chars(charset: Charset) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    if charset.contains(Charset::BINARY) {
        out.extend(['0', '1']);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }
    if charset.contains(Charset::LETTERS) {
        push_range(&mut out, 0x41, 0x5A);
        push_range(&mut out, 0x61, 0x7A);
    }
    if charset.contains(Charset::DIGITS) && !charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::SYMBOLS) {
        out.extend("$#@%&*+=<>/\\|{}[]".chars());
    }
    if charset.contains(Charset::KATAKANA) {
        push_range(&mut out, 0xFF66, 0xFF9D);
    }
    if charset.contains(Charset::GREEK) {
        out.extend("ΦΧΨΩΔΘΛΞΠΣ".chars());
    }

    if out.is_empty() {
        out.extend(['0', '1']);
    }
    out
}

pub fn parse_user_chars(s: &str) -> Vec<char> {
    let mut out: Vec<char> = s
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();
    out.dedup();
    out
}
