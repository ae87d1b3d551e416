//! Colormap sampling.
//!
//! The perceptual maps (viridis and friends) are stored as ten evenly spaced
//! stops and linearly interpolated. The classic maps (cool, hot, ...) are
//! piecewise-linear per channel and evaluated directly.

use crate::config::Colormap;
use image::Rgb;

type Stops = [[u8; 3]; 10];

const VIRIDIS: Stops = [
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b],
    [0xfd, 0xe7, 0x25],
];

const PLASMA: Stops = [
    [0x0d, 0x08, 0x87],
    [0x46, 0x03, 0x9f],
    [0x72, 0x01, 0xa8],
    [0x9c, 0x17, 0x9e],
    [0xbd, 0x37, 0x86],
    [0xd8, 0x57, 0x6b],
    [0xed, 0x79, 0x53],
    [0xfb, 0x9f, 0x3a],
    [0xfd, 0xca, 0x26],
    [0xf0, 0xf9, 0x21],
];

const INFERNO: Stops = [
    [0x00, 0x00, 0x04],
    [0x1b, 0x0c, 0x41],
    [0x4a, 0x0c, 0x6b],
    [0x78, 0x1c, 0x6d],
    [0xa5, 0x2c, 0x60],
    [0xcf, 0x44, 0x46],
    [0xed, 0x69, 0x25],
    [0xfb, 0x9b, 0x06],
    [0xf7, 0xd1, 0x3d],
    [0xfc, 0xff, 0xa4],
];

const MAGMA: Stops = [
    [0x00, 0x00, 0x04],
    [0x18, 0x0f, 0x3d],
    [0x44, 0x0f, 0x76],
    [0x72, 0x1f, 0x81],
    [0x9e, 0x2f, 0x7f],
    [0xcd, 0x40, 0x71],
    [0xf1, 0x60, 0x5d],
    [0xfd, 0x96, 0x68],
    [0xfe, 0xca, 0x8d],
    [0xfc, 0xfd, 0xbf],
];

const CIVIDIS: Stops = [
    [0x00, 0x22, 0x4e],
    [0x12, 0x35, 0x70],
    [0x3b, 0x49, 0x6c],
    [0x57, 0x5d, 0x6d],
    [0x70, 0x71, 0x73],
    [0x8a, 0x86, 0x78],
    [0xa5, 0x9c, 0x74],
    [0xc3, 0xb3, 0x69],
    [0xe1, 0xcc, 0x55],
    [0xfe, 0xe8, 0x38],
];

// Breakpoints of the "hot" map, where red saturates and green saturates.
const HOT_RED_END: f64 = 0.365079;
const HOT_GREEN_END: f64 = 0.746032;

impl Colormap {
    /// Colour at position `t` along the map. `t` is clamped to `[0, 1]`.
    pub fn sample(self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Viridis => from_stops(&VIRIDIS, t),
            Colormap::Plasma => from_stops(&PLASMA, t),
            Colormap::Inferno => from_stops(&INFERNO, t),
            Colormap::Magma => from_stops(&MAGMA, t),
            Colormap::Cividis => from_stops(&CIVIDIS, t),
            Colormap::Cool => from_unit(t, 1.0 - t, 1.0),
            Colormap::Spring => from_unit(1.0, t, 1.0 - t),
            Colormap::Summer => from_unit(t, 0.5 + t / 2.0, 0.4),
            Colormap::Autumn => from_unit(1.0, t, 0.0),
            Colormap::Winter => from_unit(0.0, t, 1.0 - t / 2.0),
            Colormap::Hot => from_unit(
                ramp(&[(0.0, 0.0416), (HOT_RED_END, 1.0), (1.0, 1.0)], t),
                ramp(&[(0.0, 0.0), (HOT_RED_END, 0.0), (HOT_GREEN_END, 1.0), (1.0, 1.0)], t),
                ramp(&[(0.0, 0.0), (HOT_GREEN_END, 0.0), (1.0, 1.0)], t),
            ),
        }
    }
}

fn from_stops(stops: &Stops, t: f64) -> Rgb<u8> {
    let scaled = t * (stops.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (stops[lo], stops[lo + 1]);
    let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
    Rgb([mix(0), mix(1), mix(2)])
}

fn from_unit(r: f64, g: f64, b: f64) -> Rgb<u8> {
    let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([q(r), q(g), q(b)])
}

/// Piecewise-linear interpolation through `(x, y)` control points sorted by x.
fn ramp(points: &[(f64, f64)], t: f64) -> f64 {
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if t <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    points.last().map(|p| p.1).unwrap_or(0.0)
}
