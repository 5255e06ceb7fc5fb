use std::fmt;

use serde::{Deserialize, Serialize};

/// sRGB colour with components in `[0, 1]`.
/// Deserialises from and serialises to `#rrggbb` strings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            anyhow::bail!("expected a #rrggbb colour, got {:?}", hex);
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| anyhow::anyhow!("invalid colour {:?}: {}", hex, e))
        };

        Ok(Self::from_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Linear-light components, for shading into an sRGB surface
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
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

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

impl TryFrom<String> for Rgb {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_background_green() {
        let rgb = Rgb::from_hex("#001a0a").unwrap();
        assert_eq!(rgb, Rgb::from_u8(0x00, 0x1a, 0x0a));
    }

    #[test]
    fn test_parse_without_hash() {
        let rgb = Rgb::from_hex("88ff88").unwrap();
        assert!((rgb.g - 1.0).abs() < 1e-6);
        assert!((rgb.r - 0x88 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_display_round_trips_hex() {
        assert_eq!(Rgb::from_hex("#88ff88").unwrap().to_string(), "#88ff88");
    }

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(Rgb::new(0.0, 0.0, 0.0).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::new(1.0, 1.0, 1.0).to_linear();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-5));
    }
}
