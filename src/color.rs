use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

use crate::dashboard::segment::{RiskBand, RiskLabel};

// ---------------------------------------------------------------------------
// Qualitative band palette
// ---------------------------------------------------------------------------

/// ColorBrewer "Set2", one entry per risk band in band order.
const SET2: [Srgb<u8>; 6] = [
    Srgb::new(0x66, 0xc2, 0xa5),
    Srgb::new(0xfc, 0x8d, 0x62),
    Srgb::new(0x8d, 0xa0, 0xcb),
    Srgb::new(0xe7, 0x8a, 0xc3),
    Srgb::new(0xa6, 0xd8, 0x54),
    Srgb::new(0xff, 0xd9, 0x2f),
];

/// Opacity of the overlaid histogram bars.
pub const HISTOGRAM_OPACITY: f32 = 0.7;

fn to_color32(rgb: Srgb<u8>) -> Color32 {
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Colour of a risk band in the funnel and box charts.
pub fn band_color(band: RiskBand) -> Color32 {
    to_color32(SET2[band.index()])
}

/// A lighter fill derived from the band colour, for box bodies.
pub fn band_fill(band: RiskBand) -> Color32 {
    let base: Srgb = SET2[band.index()].into_format();
    let hsl: Hsl = base.into_color();
    let light: Srgb = hsl.lighten(0.35).into_color();
    to_color32(light.into_format())
}

/// Colour of a risk label in the probability histogram.
pub fn label_color(label: RiskLabel) -> Color32 {
    match label {
        RiskLabel::High => Color32::RED,
        RiskLabel::Low => Color32::GREEN,
    }
}

/// Same colour with the histogram opacity applied.
pub fn translucent(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_have_distinct_colours() {
        let colours: Vec<Color32> = RiskBand::ALL.into_iter().map(band_color).collect();
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(band_color(RiskBand::VeryLow), Color32::from_rgb(0x66, 0xc2, 0xa5));
    }

    #[test]
    fn fill_is_lighter_than_outline() {
        for band in RiskBand::ALL {
            let base = band_color(band);
            let fill = band_fill(band);
            let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
            assert!(sum(fill) >= sum(base), "{band}");
        }
    }

    #[test]
    fn translucent_keeps_hue() {
        let c = translucent(Color32::RED, HISTOGRAM_OPACITY);
        assert_eq!(c.a(), 179);
        assert!(c.r() > 0 && c.g() == 0 && c.b() == 0);
    }
}
