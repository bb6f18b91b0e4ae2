//! sRGB colours as chosen in the debug panel.
//!
//! A [`Color`] keeps the sRGB-encoded components the user picked. Shaders work
//! in linear space and the surface is sRGB, so everything uploaded to the GPU
//! goes through [`Color::to_linear`].

use std::{fmt, str::FromStr};

use crate::error::PortalError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#rrggbb`, `#rgb` or one of the few CSS names the scene uses.
    pub fn parse(value: &str) -> Result<Self, PortalError> {
        let invalid = || PortalError::InvalidColor(value.to_string());
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => (),
        }
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::from_rgb8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // `#abc` expands to `#aabbcc`
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::from_rgb8(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_linear(&self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    /// Clear colour for a render pass on an sRGB surface.
    pub fn to_wgpu(&self) -> wgpu::Color {
        let [r, g, b] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_hex() {
        let c = Color::parse("#ff0000").unwrap();
        assert_eq!(c.to_rgb8(), [255, 0, 0]);
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn parses_short_hex_and_names() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("White").unwrap(), Color::WHITE);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "ff0000", "#ff00", "#gg0000", "#ff00000"] {
            assert!(
                matches!(Color::parse(bad), Err(PortalError::InvalidColor(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn display_round_trips_default_palette() {
        for hex in ["#20072c", "#ddbbec", "#712f7f"] {
            assert_eq!(Color::parse(hex).unwrap().to_string(), hex);
        }
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::WHITE.to_linear(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let mid = Color::from_rgb8(128, 128, 128).to_linear()[0];
        assert!(mid > 0.2 && mid < 0.23);
    }
}
