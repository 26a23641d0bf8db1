use eframe::egui::Color32;
use image::Rgba;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgba<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgba([
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
                255,
            ])
        })
        .collect()
}

/// Parse `#rrggbb` (the `#` is optional).
pub fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

pub fn to_color32(c: Rgba<u8>) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

// ---------------------------------------------------------------------------
// Class palette: class index → colour
// ---------------------------------------------------------------------------

/// Colours for `n` classes: the configured colours first, then generated
/// hues for any classes beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPalette {
    colors: Vec<Rgba<u8>>,
}

impl ClassPalette {
    pub fn new<S: AsRef<str>>(configured: &[S], n: usize) -> Self {
        let mut colors: Vec<Rgba<u8>> = configured
            .iter()
            .filter_map(|hex| {
                let parsed = parse_hex(hex.as_ref());
                if parsed.is_none() {
                    log::warn!("ignoring invalid palette colour {:?}", hex.as_ref());
                }
                parsed
            })
            .take(n)
            .collect();
        if colors.len() < n {
            colors.extend(generate_palette(n - colors.len()));
        }
        ClassPalette { colors }
    }

    /// Colour of the `index`-th class; wraps around for out-of-range indices.
    pub fn color_for(&self, index: usize) -> Rgba<u8> {
        if self.colors.is_empty() {
            return Rgba([128, 128, 128, 255]);
        }
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
