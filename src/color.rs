use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

/// Not survived.
pub const NOT_SURVIVED: Color32 = Color32::from_rgb(0xff, 0x7f, 0x0e);
/// Survived.
pub const SURVIVED: Color32 = Color32::from_rgb(0x2c, 0xa0, 0x2c);

pub const GAUGE_LOW: Color32 = Color32::from_rgb(0xd3, 0xd3, 0xd3);
pub const GAUGE_HIGH: Color32 = Color32::from_rgb(0x90, 0xee, 0x90);
pub const GAUGE_BAR: Color32 = Color32::from_rgb(0x00, 0x00, 0x8b);
pub const GAUGE_THRESHOLD: Color32 = Color32::RED;

/// Cells whose value is undefined (e.g. correlation of a constant column).
pub const MISSING: Color32 = Color32::GRAY;

/// Colour of a survival label (0 / 1).
pub fn class_color(survived: bool) -> Color32 {
    if survived {
        SURVIVED
    } else {
        NOT_SURVIVED
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const BLUE: (u8, u8, u8) = (0x05, 0x30, 0x61);
const WHITE: (u8, u8, u8) = (0xf7, 0xf7, 0xf7);
const RED: (u8, u8, u8) = (0x67, 0x00, 0x1f);
const PALE_BLUE: (u8, u8, u8) = (0xf7, 0xfb, 0xff);
const DEEP_BLUE: (u8, u8, u8) = (0x08, 0x30, 0x6b);

fn linear(rgb: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(rgb.0, rgb.1, rgb.2).into_format::<f32>().into_linear()
}

fn to_color32(c: LinSrgb) -> Color32 {
    let s: Srgb = Srgb::from_linear(c);
    let s: Srgb<u8> = s.into_format();
    Color32::from_rgb(s.red, s.green, s.blue)
}

fn lerp(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    to_color32(linear(from).mix(linear(to), t))
}

/// Red/blue diverging scale for values in [-1, 1]: blue negative, red
/// positive. NaN maps to [`MISSING`].
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return MISSING;
    }
    let v = value.clamp(-1.0, 1.0);
    if v < 0.0 {
        lerp(WHITE, BLUE, -v)
    } else {
        lerp(WHITE, RED, v)
    }
}

/// Sequential blues for `value` within `[0, max]`.
pub fn sequential_blues(value: f64, max: f64) -> Color32 {
    if max <= 0.0 {
        return lerp(PALE_BLUE, DEEP_BLUE, 0.0);
    }
    lerp(PALE_BLUE, DEEP_BLUE, value / max)
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
