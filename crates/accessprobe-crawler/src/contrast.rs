//! WCAG colour contrast math.
//!
//! Colours arrive as computed CSS strings (`rgb(0, 0, 0)`, `rgba(…)`,
//! occasionally hex) and are normalised to opaque 8-bit sRGB before the
//! relative-luminance formula is applied.

use std::fmt;

/// AA threshold for normal-size text.
pub const AA_NORMAL_TEXT: f64 = 4.5;
/// AAA threshold for normal-size text.
pub const AAA_NORMAL_TEXT: f64 = 7.0;
/// AA threshold for large text. Not applied to [`meets_aa`]; exposed for consumers.
pub const AA_LARGE_TEXT: f64 = 3.0;
/// AAA threshold for large text. Not applied to [`meets_aaa`]; exposed for consumers.
pub const AAA_LARGE_TEXT: f64 = 4.5;

/// Minimum size (CSS px) for text to count as large on its own.
pub const LARGE_TEXT_PX: f64 = 18.0;
/// Minimum size (CSS px) for bold text to count as large.
pub const LARGE_BOLD_TEXT_PX: f64 = 14.0;

/// Opaque 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Canonical lower-case `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance in `[0, 1]`.
    pub fn relative_luminance(self) -> f64 {
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// sRGB colour with straight alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Composite over an opaque backdrop.
    pub fn over(self, backdrop: Rgb) -> Rgb {
        if self.alpha >= 1.0 {
            return self.rgb;
        }
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f64::from(fg) * a + f64::from(bg) * (1.0 - a)).round() as u8
        };
        Rgb::new(
            mix(self.rgb.r, backdrop.r),
            mix(self.rgb.g, backdrop.g),
            mix(self.rgb.b, backdrop.b),
        )
    }
}

/// sRGB channel to linear light.
fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `(L_lighter + 0.05) / (L_darker + 0.05)`; always `>= 1`.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// Uniform 4.5:1 check, regardless of text size.
pub fn meets_aa(ratio: f64) -> bool {
    ratio >= AA_NORMAL_TEXT
}

/// Uniform 7:1 check, regardless of text size.
pub fn meets_aaa(ratio: f64) -> bool {
    ratio >= AAA_NORMAL_TEXT
}

/// `font_size_px >= 18`, or `>= 14` when bold (keyword or numeric weight >= 700).
pub fn is_large_text(font_size_px: f64, font_weight: &str) -> bool {
    if font_size_px >= LARGE_TEXT_PX {
        return true;
    }
    font_size_px >= LARGE_BOLD_TEXT_PX && is_bold(font_weight)
}

fn is_bold(font_weight: &str) -> bool {
    let weight = font_weight.trim();
    weight.eq_ignore_ascii_case("bold")
        || weight.eq_ignore_ascii_case("bolder")
        || weight.parse::<f64>().is_ok_and(|w| w >= 700.0)
}

/// Parse a computed `font-size` such as `16px`.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse::<f64>()
        .ok()
}

/// Parse the colour syntaxes `getComputedStyle` produces.
///
/// Supports `transparent`, `rgb()`/`rgba()` in comma or space syntax
/// (with optional `/ alpha`, percentages allowed for alpha),
/// `color(srgb r g b [/ alpha])`, and `#rgb`, `#rgba`, `#rrggbb`,
/// `#rrggbbaa`. Returns `None` for anything else, including other colour
/// spaces (`oklch()`, `lab()`, `color(display-p3 …)`).
pub fn parse_css_color(value: &str) -> Option<Rgba> {
    let value = value.trim().to_ascii_lowercase();

    if value == "transparent" {
        return Some(Rgba {
            rgb: Rgb::BLACK,
            alpha: 0.0,
        });
    }
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(inner) = value.strip_prefix("color(srgb ") {
        return parse_srgb_function(inner.strip_suffix(')')?);
    }

    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let (channels, slash_alpha) = match inner.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (inner, None),
    };
    let parts: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let (rgb_parts, alpha_part) = match (parts.len(), slash_alpha) {
        (3, alpha) => (&parts[..3], alpha),
        (4, None) => (&parts[..3], Some(parts[3])),
        _ => return None,
    };

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(rgb_parts) {
        *slot = parse_channel(part)?;
    }
    let alpha = match alpha_part {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };

    Some(Rgba {
        rgb: Rgb::new(channels[0], channels[1], channels[2]),
        alpha,
    })
}

/// Body of `color(srgb …)`: channels are fractions of 1 or percentages.
fn parse_srgb_function(inner: &str) -> Option<Rgba> {
    let (channels, alpha) = match inner.split_once('/') {
        Some((c, a)) => (c, parse_alpha(a.trim())?),
        None => (inner, 1.0),
    };
    let parts: Vec<&str> = channels.split_whitespace().collect();
    let [r, g, b] = parts[..] else {
        return None;
    };
    let unit = |part: &str| -> Option<u8> {
        let v = match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0,
            None => part.parse::<f64>().ok()?,
        };
        Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
    };
    Some(Rgba {
        rgb: Rgb::new(unit(r)?, unit(g)?, unit(b)?),
        alpha,
    })
}

fn parse_channel(part: &str) -> Option<u8> {
    let v = match part.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? * 255.0 / 100.0,
        None => part.parse::<f64>().ok()?,
    };
    Some(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(part: &str) -> Option<f64> {
    let v = match part.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => part.parse::<f64>().ok()?,
    };
    Some(v.clamp(0.0, 1.0))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    if !hex.is_ascii() {
        return None;
    }
    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Rgba {
        rgb: Rgb::new(r, g, b),
        alpha: f64::from(a) / 255.0,
    })
}

/// Resolve a computed foreground/background pair to opaque colours.
///
/// A transparent (or unparseable-but-present-as-`transparent`) background
/// falls back to white; translucent colours are composited, the background
/// over white and the foreground over the resolved background.
pub fn resolve_pair(foreground: &str, background: &str) -> Option<(Rgb, Rgb)> {
    let fg = parse_css_color(foreground)?;
    let bg = match parse_css_color(background) {
        Some(bg) if bg.is_transparent() => Rgb::WHITE,
        Some(bg) => bg.over(Rgb::WHITE),
        None if background.trim().is_empty() => Rgb::WHITE,
        None => return None,
    };
    Some((fg.over(bg), bg))
}

#[cfg(test)]
#[path = "contrast_tests.rs"]
mod tests;
