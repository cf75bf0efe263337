//! Black-body fire palette.
//!
//! Colors come from an empirical fit of black-body radiation to RGB over six
//! temperature bands. The gradient runs black, red, yellow, then white, with a
//! short white plateau at the top.

use crate::error::FireError;
use serde::{Deserialize, Serialize};

/// Coldest temperature the fit covers; below it red saturates
pub const MIN_KELVIN: f32 = 965.0;
/// Hottest temperature the fit covers
pub const MAX_KELVIN: f32 = 12000.0;

/// Temperature at the start of the red-to-yellow ramp
pub const RED_KELVIN: f32 = 965.0;
/// Temperature where the ramp turns from yellow toward white
pub const YELLOW_KELVIN: f32 = 3250.0;
/// Temperature at the top of the ramp
pub const WHITE_KELVIN: f32 = 7500.0;

/// Default number of palette entries, one per grid intensity
pub const DEFAULT_PALETTE_SIZE: usize = 256;

// Lower band edges, low to high
const BAND_EDGES: [f32; 5] = [1167.0, 1449.0, 1902.0, 3315.0, 6365.0];

// red = c0 / K + c1 * K + c2
const TEMPS_R: [[f32; 3]; 6] = [
    [2.52432244e+03, -1.06185848e-03, 3.11067539e+00],
    [3.37763626e+03, -4.34581697e-04, 1.64843306e+00],
    [4.10671449e+03, -8.61949938e-05, 6.41423749e-01],
    [4.66849800e+03, 2.85655028e-05, 1.29075375e-01],
    [4.60124770e+03, 2.89727618e-05, 1.48001316e-01],
    [3.78765709e+03, 9.36026367e-06, 3.98995841e-01],
];

// green = c0 / K + c1 * K + c2
const TEMPS_G: [[f32; 3]; 6] = [
    [-7.50343014e+02, 3.15679613e-04, 4.73464526e-01],
    [-1.00402363e+03, 1.29189794e-04, 9.08181524e-01],
    [-1.22075471e+03, 2.56245413e-05, 1.20753416e+00],
    [-1.42546105e+03, -4.01730887e-05, 1.44002695e+00],
    [-1.18134453e+03, -2.18913373e-05, 1.30656109e+00],
    [-5.00279505e+02, -4.59745390e-06, 1.09090465e+00],
];

// blue = ((c0 * K + c1) * K + c2) * K + c3
const TEMPS_B: [[f32; 4]; 6] = [
    [0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
    [-2.02524603e-11, 1.79435860e-07, -2.60561875e-04, -1.41761141e-02],
    [-2.22463426e-13, -1.55078698e-08, 3.81675160e-04, -7.30646033e-01],
    [6.72595954e-13, -2.73059993e-08, 4.24068546e-04, -7.52204323e-01],
];

// Saturated channels outside the fitted domain
const BELOW_RANGE: [f32; 3] = [4.70366907, 0.0, 0.0];
const ABOVE_RANGE: [f32; 3] = [0.826270103, 0.994478524, 1.56626022];

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise multiply, rounded and clamped
    pub fn scale(self, factor: f32) -> Rgb {
        let channel = |c: u8| (f32::from(c) * factor).round_ties_even().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Gray of the same intensity on every channel
    pub const fn gray(value: u8) -> Rgb {
        Rgb::new(value, value, value)
    }
}

/// Approximate the color of a black body at `kelvin`
pub fn color_temperature_to_rgb(kelvin: f32) -> Rgb {
    let rgb = if kelvin >= MAX_KELVIN {
        ABOVE_RANGE
    } else if kelvin < MIN_KELVIN {
        BELOW_RANGE
    } else {
        let band = BAND_EDGES.iter().filter(|&&edge| kelvin >= edge).count();
        let r = TEMPS_R[band];
        let g = TEMPS_G[band];
        let b = TEMPS_B[band];

        let inv = 1.0 / kelvin;
        [
            r[0] * inv + r[1] * kelvin + r[2],
            g[0] * inv + g[1] * kelvin + g[2],
            ((b[0] * kelvin + b[1]) * kelvin + b[2]) * kelvin + b[3],
        ]
    };

    Rgb::new(to_channel(rgb[0]), to_channel(rgb[1]), to_channel(rgb[2]))
}

fn to_channel(normalized: f32) -> u8 {
    (normalized * 255.0).round_ties_even().clamp(0.0, 255.0) as u8
}

fn lerp(t: f32, from: f32, to: f32) -> f32 {
    t * (to - from) + from
}

/// Intensity-indexed color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::fire(DEFAULT_PALETTE_SIZE).unwrap_or_else(|_| Self::grayscale())
    }
}

impl Palette {
    /// Build the black, red, yellow, white fire gradient with `size` entries.
    ///
    /// The first third fades in from black to the first red; the last twelfth
    /// runs from yellow to white. Index 0 is always black and the last index
    /// always white.
    pub fn fire(size: usize) -> Result<Self, FireError> {
        if size < 2 {
            return Err(FireError::InvalidPaletteSize(size));
        }

        let fade_to_black = size / 3;
        let fade_to_white = size - (size as f32 / 12.0).round_ties_even() as usize;
        let mut colors = vec![Rgb::BLACK; size];

        // Red to yellow; the end index is rewritten by the next segment
        let red_span = (fade_to_white - fade_to_black) as f32;
        for i in fade_to_black..=fade_to_white.min(size - 1) {
            let t = (i - fade_to_black) as f32 / red_span;
            colors[i] = color_temperature_to_rgb(lerp(t, RED_KELVIN, YELLOW_KELVIN));
        }

        let white_span = (size - fade_to_white) as f32;
        for i in fade_to_white..size {
            let t = (i - fade_to_white) as f32 / white_span;
            colors[i] = color_temperature_to_rgb(lerp(t, YELLOW_KELVIN, WHITE_KELVIN));
        }

        let first_flame = colors[fade_to_black];
        for i in 1..fade_to_black {
            colors[i] = first_flame.scale(i as f32 / fade_to_black as f32);
        }

        colors[0] = Rgb::BLACK;
        colors[size - 1] = Rgb::WHITE;

        Ok(Self { colors })
    }

    /// 256 gray levels, intensity mapped straight to brightness
    pub fn grayscale() -> Self {
        Self {
            colors: (0..=u8::MAX).map(Rgb::gray).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color for a grid intensity.
    ///
    /// Palettes shorter than 256 entries are sampled proportionally so every
    /// intensity still maps to a color.
    pub fn color(&self, intensity: u8) -> Rgb {
        let len = self.colors.len();
        if len == 0 {
            return Rgb::gray(intensity);
        }
        let idx = if len == 256 {
            intensity as usize
        } else {
            intensity as usize * (len - 1) / u8::MAX as usize
        };
        self.colors[idx]
    }
}
