use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::clear()
    }
}

impl Color {
    pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub const fn clear() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    pub const fn gray(x: f32) -> Self {
        Self::rgb(x, x, x)
    }

    pub const fn black() -> Self {
        Self::gray(0.0)
    }

    pub const fn white() -> Self {
        Self::gray(1.0)
    }

    pub const fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    pub const fn orange() -> Self {
        Self::rgb(1.0, 0.5, 0.0)
    }

    pub const fn yellow() -> Self {
        Self::rgb(1.0, 1.0, 0.0)
    }

    pub const fn green() -> Self {
        Self::rgb(0.0, 1.0, 0.0)
    }

    pub const fn blue() -> Self {
        Self::rgb(0.0, 0.0, 1.0)
    }

    pub const fn indigo() -> Self {
        Self::rgb(0.5, 0.0, 1.0)
    }

    pub const fn purple() -> Self {
        Self::rgb(1.0, 0.0, 1.0)
    }

    pub fn brighten(&self, factor: f32) -> Self {
        Self::rgba(
            self.red * factor,
            self.green * factor,
            self.blue * factor,
            self.alpha,
        )
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { alpha, ..*self }
    }

    pub fn interpolate(&self, other: &Color, weight: f32) -> Self {
        let mix = |a: f32, b: f32| (1.0 - weight) * a + weight * b;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut hex = format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        );
        if self.alpha != 1.0 {
            hex.push_str(&format!("{:02x}", byte(self.alpha)));
        }
        hex
    }

    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (self.red * 255.0).round(),
            (self.green * 255.0).round(),
            (self.blue * 255.0).round(),
            self.alpha
        )
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`, `rgba(...)` or a
    /// CSS color name.
    pub fn parse(value: &str) -> Option<Color> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Some(Color::clear());
        }
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if value.starts_with("rgb") {
            return parse_rgb(value);
        }
        palette::named::from_str(&value.to_ascii_lowercase()).map(|named| {
            let rgb = named.into_format::<f32>();
            Color::rgb(rgb.red, rgb.green, rgb.blue)
        })
    }
}

impl From<Srgba> for Color {
    fn from(c: Srgba) -> Self {
        Self::rgba(c.red, c.green, c.blue, c.alpha)
    }
}

impl From<Color> for Srgba {
    fn from(c: Color) -> Self {
        Srgba::new(c.red, c.green, c.blue, c.alpha)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (rgb, alpha) = match hex.len() {
        3 => {
            let r = channel(&hex[0..1].repeat(2))?;
            let g = channel(&hex[1..2].repeat(2))?;
            let b = channel(&hex[2..3].repeat(2))?;
            (Srgb::new(r, g, b), 255)
        }
        6 | 8 => {
            let r = channel(hex.get(0..2)?)?;
            let g = channel(hex.get(2..4)?)?;
            let b = channel(hex.get(4..6)?)?;
            let a = match hex.get(6..8) {
                Some(a) => channel(a)?,
                None => 255,
            };
            (Srgb::new(r, g, b), a)
        }
        _ => return None,
    };
    let rgb = rgb.into_format::<f32>();
    Some(Color::rgba(rgb.red, rgb.green, rgb.blue, alpha as f32 / 255.0))
}

fn parse_rgb(value: &str) -> Option<Color> {
    let components = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = components.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let component = |s: &str| -> Option<f32> {
        match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0),
            None => s.parse::<f32>().ok().map(|v| v / 255.0),
        }
    };
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f32>().ok()?,
        None => 1.0,
    };
    Some(Color::rgba(
        component(parts[0])?,
        component(parts[1])?,
        component(parts[2])?,
        alpha,
    ))
}
