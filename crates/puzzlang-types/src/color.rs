use std::str::FromStr;

use serde::Serialize;
use strum::{EnumCount, EnumIter, EnumString};

/// Palette colours accepted by name in object definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, EnumCount, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NamedColor {
    Black,
    White,
    #[strum(serialize = "grey", serialize = "gray")]
    Grey,
    #[strum(serialize = "darkgrey", serialize = "darkgray")]
    DarkGrey,
    #[strum(serialize = "lightgrey", serialize = "lightgray")]
    LightGrey,
    Red,
    DarkRed,
    LightRed,
    Brown,
    DarkBrown,
    LightBrown,
    Orange,
    Yellow,
    Green,
    DarkGreen,
    LightGreen,
    Blue,
    LightBlue,
    DarkBlue,
    Purple,
    Pink,
    Transparent,
}

impl NamedColor {
    /// RGB triple from the default palette; `None` for `Transparent`.
    pub const fn rgb(self) -> Option<(u8, u8, u8)> {
        let hex: u32 = match self {
            Self::Black => 0x000000,
            Self::White => 0xFFFFFF,
            Self::Grey => 0x9D9D9D,
            Self::DarkGrey => 0x697175,
            Self::LightGrey => 0xCCCCCC,
            Self::Red => 0xBE2633,
            Self::DarkRed => 0x732930,
            Self::LightRed => 0xE06F8B,
            Self::Brown => 0xA46422,
            Self::DarkBrown => 0x493C2B,
            Self::LightBrown => 0xEEB62F,
            Self::Orange => 0xEB8931,
            Self::Yellow => 0xF7E26B,
            Self::Green => 0x44891A,
            Self::DarkGreen => 0x2F484E,
            Self::LightGreen => 0xA3CE27,
            Self::Blue => 0x1D57F7,
            Self::LightBlue => 0xB2DCEF,
            Self::DarkBlue => 0x1B2632,
            Self::Purple => 0x342A97,
            Self::Pink => 0xDE65E2,
            Self::Transparent => return None,
        };
        Some(((hex >> 16) as u8, (hex >> 8) as u8, hex as u8))
    }
}

/// An object colour: either a palette name or an explicit `#rgb` / `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("unknown colour name: {0}")]
    UnknownName(String),
    #[error("malformed hex colour: {0}")]
    BadHex(String),
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix('#') else {
            return NamedColor::from_str(s)
                .map(Self::Named)
                .map_err(|_| ColorParseError::UnknownName(s.to_string()));
        };
        let bad = || ColorParseError::BadHex(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let digits: Vec<u8> = hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();
        match digits.as_slice() {
            [r, g, b] => Ok(Self::Rgb(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(Self::Rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            _ => Err(bad()),
        }
    }
}

impl Color {
    pub const fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Self::Named(n) => n.rgb(),
            Self::Rgb(r, g, b) => Some((r, g, b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count() {
        assert_eq!(NamedColor::COUNT, 22);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(
            Color::from_str("LIGHTGREEN"),
            Ok(Color::Named(NamedColor::LightGreen))
        );
        assert_eq!(Color::from_str("DarkBlue"), Ok(Color::Named(NamedColor::DarkBlue)));
        assert_eq!(Color::from_str("gray"), Ok(Color::Named(NamedColor::Grey)));
    }

    #[test]
    fn hex_forms() {
        assert_eq!(Color::from_str("#fff"), Ok(Color::Rgb(255, 255, 255)));
        assert_eq!(Color::from_str("#1D57F7"), Ok(Color::Rgb(0x1D, 0x57, 0xF7)));
        assert!(matches!(Color::from_str("#12"), Err(ColorParseError::BadHex(_))));
        assert!(matches!(Color::from_str("#ggg"), Err(ColorParseError::BadHex(_))));
    }

    #[test]
    fn unknown_name() {
        assert!(matches!(
            Color::from_str("chartreuse"),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn transparent_has_no_rgb() {
        assert_eq!(Color::Named(NamedColor::Transparent).rgb(), None);
        assert_eq!(Color::Named(NamedColor::Black).rgb(), Some((0, 0, 0)));
    }
}
