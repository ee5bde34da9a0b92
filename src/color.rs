use crate::error::ColorError;
use std::fmt;
use std::str::FromStr;

/// sRGB color with channels in `0.0..=1.0`, stored without gamma decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("orange", 0xffa500),
    ("purple", 0x800080),
    ("pink", 0xffc0cb),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xc0c0c0),
    ("gold", 0xffd700),
    ("teal", 0x008080),
    ("navy", 0x000080),
];

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Color::from_rgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Builds a color from hue (degrees, wrapped), saturation and lightness (`0.0..=1.0`)
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Color::new(l, l, l);
        }

        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Color::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn scale(self, factor: f64) -> Self {
        Color::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn multiply(self, other: Color) -> Self {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn add(self, other: Color) -> Self {
        Color::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn lerp(self, other: Color, t: f64) -> Self {
        Color::new(
            crate::math::lerp(self.r, other.r, t),
            crate::math::lerp(self.g, other.g, t),
            crate::math::lerp(self.b, other.b, t),
        )
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Parses the `h, s%, l%` body of an `hsl(...)` style
fn parse_hsl(style: &str, body: &str) -> Result<Color, ColorError> {
    let malformed = || ColorError::MalformedHsl(style.to_string());

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let [hue, saturation, lightness] = parts.as_slice() else {
        return Err(malformed());
    };

    let percent = |s: &str| -> Result<f64, ColorError> {
        s.strip_suffix('%')
            .and_then(|n| n.trim().parse::<f64>().ok())
            .map(|n| n / 100.0)
            .ok_or_else(malformed)
    };

    let hue = hue.parse::<f64>().map_err(|_| malformed())?;
    Ok(Color::from_hsl(hue, percent(saturation)?, percent(lightness)?))
}

impl FromStr for Color {
    type Err = ColorError;

    /// Accepts CSS-like styles: named colors, `#rrggbb`, `0xrrggbb` and `hsl(h, s%, l%)`
    fn from_str(style: &str) -> Result<Self, Self::Err> {
        let style = style.trim();
        let lower = style.to_ascii_lowercase();

        if let Some(body) = lower
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_hsl(style, body);
        }

        if let Some(hex) = lower
            .strip_prefix('#')
            .or_else(|| lower.strip_prefix("0x"))
        {
            if hex.len() != 6 {
                return Err(ColorError::MalformedHex(style.to_string()));
            }
            return u32::from_str_radix(hex, 16)
                .map(Color::from_hex)
                .map_err(|_| ColorError::MalformedHex(style.to_string()));
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, hex)| Color::from_hex(hex))
            .ok_or_else(|| ColorError::Unknown(style.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn parses_named_colors() {
        let orange: Color = "orange".parse().unwrap();
        assert_eq!(orange.to_rgb8(), (255, 165, 0));
        assert_eq!("White".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!("#404040".parse::<Color>().unwrap().to_rgb8(), (64, 64, 64));
        assert_eq!("0xff8000".parse::<Color>().unwrap().to_rgb8(), (255, 128, 0));
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ColorError::MalformedHex(_))
        ));
    }

    #[test]
    fn parses_hsl_styles() {
        let red: Color = "hsl(0, 100%, 50%)".parse().unwrap();
        assert_eq!(red.to_rgb8(), (255, 0, 0));

        let dark = "hsl(240.5, 100%, 10%)".parse::<Color>().unwrap();
        assert_approx_eq!(dark.r, 0.0, 0.01);
        assert_approx_eq!(dark.b, 0.2, 0.01);

        let gray: Color = "hsl(90, 0%, 50%)".parse().unwrap();
        assert_approx_eq!(gray.r, 0.5);
        assert_approx_eq!(gray.g, 0.5);
        assert_approx_eq!(gray.b, 0.5);
    }

    #[test]
    fn rejects_malformed_styles() {
        assert!(matches!(
            "hsl(10, 100, 10%)".parse::<Color>(),
            Err(ColorError::MalformedHsl(_))
        ));
        assert!(matches!(
            "hsl(10, 100%)".parse::<Color>(),
            Err(ColorError::MalformedHsl(_))
        ));
        assert!(matches!(
            "chartreuse-ish".parse::<Color>(),
            Err(ColorError::Unknown(_))
        ));
    }

    #[test]
    fn hue_wraps_around() {
        assert_eq!(Color::from_hsl(360.0, 1.0, 0.5), Color::from_hsl(0.0, 1.0, 0.5));
        assert_eq!(Color::from_hsl(-120.0, 1.0, 0.5).to_rgb8(), (0, 0, 255));
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Color::from_hex(0xffa500).to_string(), "#ffa500");
    }
}
