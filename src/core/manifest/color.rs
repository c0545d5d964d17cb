use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An RGBA color parsed from a CSS hex notation.
///
/// Web manifests carry colors as `#RGB`, `#RRGGBB` or `#RRGGBBAA`; the
/// persisted TWA manifest always writes the `#RRGGBB` form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Hex representation with the alpha channel dropped, as stored in
    /// `twa-manifest.json` and the generated Gradle file.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

impl FromStr for Color {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex = input
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color \"{input}\": expected a \"#\" prefix"))?;
        let digits = hex.as_bytes();
        let invalid = || format!("invalid color \"{input}\"");

        match digits.len() {
            // #RGB expands each nibble, e.g. #abc == #aabbcc.
            3 => {
                let mut channels = [0u8; 3];
                for (i, &d) in digits.iter().enumerate() {
                    let n = nibble(d).ok_or_else(invalid)?;
                    channels[i] = n << 4 | n;
                }
                Ok(Color::rgb(channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let mut channels = [0xFFu8; 4];
                for (i, pair) in digits.chunks(2).enumerate() {
                    let hi = nibble(pair[0]).ok_or_else(invalid)?;
                    let lo = nibble(pair[1]).ok_or_else(invalid)?;
                    channels[i] = hi << 4 | lo;
                }
                Ok(Color {
                    r: channels[0],
                    g: channels[1],
                    b: channels[2],
                    a: channels[3],
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
