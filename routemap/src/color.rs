//! Colors given by name or hex notation.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Error returned for strings that are neither a known color name nor a hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}', expected a color name like 'red' or hex like '#ff0000'")]
pub struct InvalidColor(pub String);

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque gray.
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with transparency.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Parses a CSS color: one of the CSS3 names (`"red"`, `"slategray"`) or
    /// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`. Names are case-insensitive.
    pub fn parse(value: &str) -> Result<Self, InvalidColor> {
        let trimmed = value.trim();
        let err = || InvalidColor(value.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::try_from_hex(hex).ok_or_else(err);
        }

        palette::named::from_str(&trimmed.to_ascii_lowercase())
            .map(|color| Self::rgb(color.red, color.green, color.blue))
            .ok_or_else(err)
    }

    fn try_from_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            3 | 4 => {
                let short = |i: usize| digit(i).map(|d| d * 17);
                let a = if hex.len() == 4 { short(3)? } else { 255 };
                Some(Self::rgba(short(0)?, short(1)?, short(2)?, a))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { byte(6)? } else { 255 };
                Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
            }
            _ => None,
        }
    }

    /// Converts the color into a pixel value of an RGBA image.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named() {
        assert_eq!(Color::parse("black"), Ok(Color::BLACK));
        assert_eq!(Color::parse("Red"), Ok(Color::RED));
        assert_eq!(Color::parse(" grey "), Ok(Color::GRAY));
        assert_eq!(Color::parse("orange"), Ok(Color::rgb(255, 165, 0)));
    }

    #[test]
    fn full_css_name_set() {
        assert_eq!(Color::parse("coral"), Ok(Color::rgb(255, 127, 80)));
        assert_eq!(Color::parse("salmon"), Ok(Color::rgb(250, 128, 114)));
        assert_eq!(Color::parse("DarkViolet"), Ok(Color::rgb(148, 0, 211)));
        assert_eq!(Color::parse("slategray"), Ok(Color::rgb(112, 128, 144)));
        assert_eq!(Color::parse("slategrey"), Ok(Color::rgb(112, 128, 144)));
    }

    #[test]
    fn hex() {
        assert_eq!(Color::parse("#ff0000"), Ok(Color::RED));
        assert_eq!(Color::parse("#F00"), Ok(Color::RED));
        assert_eq!(Color::parse("#1e90ff"), Ok(Color::rgb(30, 144, 255)));
        assert_eq!(Color::parse("#00000080"), Ok(Color::rgba(0, 0, 0, 128)));
        assert_eq!(Color::parse("#0008"), Ok(Color::rgba(0, 0, 0, 136)));
    }

    #[test]
    fn invalid() {
        assert!(Color::parse("").is_err());
        assert!(Color::parse("notacolor").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gg0000").is_err());
        assert!(Color::parse("#ééé").is_err());
        assert_eq!(
            Color::parse("ff0000"),
            Err(InvalidColor("ff0000".to_string()))
        );
    }

    #[test]
    fn display_round_trips() {
        for value in ["#1e90ff", "#00000080"] {
            let color = Color::parse(value).expect("valid color");
            assert_eq!(color.to_string(), value);
        }
    }
}
