use image::Rgb;

/// D65 reference white used to normalise XYZ before the Lab transform
const REFERENCE_WHITE: [f64; 3] = [0.95047, 1.0, 1.08883];

/// Linear sRGB to XYZ matrix (D65)
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

const LAB_EPSILON: f64 = 0.008856;
const LAB_KAPPA: f64 = 7.787;

/// A color in CIE-Lab space
///
/// Lab values are derived on demand from an sRGB triple and never stored
/// alongside pixel data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    /// Lightness, roughly 0 to 100
    pub l: f64,
    /// Green to red axis
    pub a: f64,
    /// Blue to yellow axis
    pub b: f64,
}

impl Lab {
    /// Chroma, the distance from the neutral axis
    #[inline]
    pub fn chroma(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// CIE94 color difference (graphic arts weights) from `self` to `other`
    ///
    /// The chroma and hue weights are taken from `self`, so the result is only
    /// symmetric when both colors have the same chroma. The flood fill passes
    /// the candidate pixel as `self` and the reference color as `other`.
    pub fn delta_e(&self, other: &Lab) -> f64 {
        let delta_l = self.l - other.l;
        let delta_a = self.a - other.a;
        let delta_b = self.b - other.b;

        let c1 = self.chroma();
        let c2 = other.chroma();
        let delta_c = c1 - c2;

        let delta_h_sq = delta_a * delta_a + delta_b * delta_b - delta_c * delta_c;
        let delta_h = if delta_h_sq < 0.0 {
            0.0
        } else {
            delta_h_sq.sqrt()
        };

        let sc = 1.0 + 0.045 * c1;
        let sh = 1.0 + 0.015 * c1;

        let term_c = delta_c / sc;
        let term_h = delta_h / sh;
        let sum = delta_l * delta_l + term_c * term_c + term_h * term_h;
        if sum < 0.0 {
            0.0
        } else {
            sum.sqrt()
        }
    }
}

impl From<Rgb<u8>> for Lab {
    fn from(rgb: Rgb<u8>) -> Self {
        rgb_to_lab(rgb)
    }
}

/// Converts an sRGB color to CIE-Lab
///
/// # Examples
///
/// ```
/// use backdrop_mask::rgb_to_lab;
/// use image::Rgb;
///
/// let white = rgb_to_lab(Rgb([255, 255, 255]));
/// assert!((white.l - 100.0).abs() < 0.01);
/// ```
pub fn rgb_to_lab(rgb: Rgb<u8>) -> Lab {
    let Rgb([red, green, blue]) = rgb;
    let linear = [
        srgb_to_linear(red),
        srgb_to_linear(green),
        srgb_to_linear(blue),
    ];

    let [x, y, z] = [0, 1, 2].map(|row| {
        let [mr, mg, mb] = SRGB_TO_XYZ[row];
        let value = linear[0] * mr + linear[1] * mg + linear[2] * mb;
        lab_f(value / REFERENCE_WHITE[row])
    });

    Lab {
        l: 116.0 * y - 16.0,
        a: 500.0 * (x - y),
        b: 200.0 * (y - z),
    }
}

/// Perceptual distance between two sRGB colors
///
/// This is the only similarity measure used by the flood fill; fuzz
/// thresholds are expressed in the same unit (roughly 0 to 100).
///
/// # Examples
///
/// ```
/// use backdrop_mask::color_distance;
/// use image::Rgb;
///
/// let red = Rgb([255, 0, 0]);
/// assert_eq!(color_distance(red, red), 0.0);
/// assert!(color_distance(red, Rgb([0, 0, 255])) > 50.0);
/// ```
pub fn color_distance(first: Rgb<u8>, second: Rgb<u8>) -> f64 {
    rgb_to_lab(first).delta_e(&rgb_to_lab(second))
}

#[inline]
fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + 16.0 / 116.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_rgb_to_lab_black_and_white() {
        let black = rgb_to_lab(Rgb([0, 0, 0]));
        assert_close(black.l, 0.0, 1e-9);
        assert_close(black.a, 0.0, 1e-9);
        assert_close(black.b, 0.0, 1e-9);

        let white = rgb_to_lab(Rgb([255, 255, 255]));
        assert_close(white.l, 100.0, 0.01);
        assert_close(white.a, 0.0, 0.05);
        assert_close(white.b, 0.0, 0.05);
    }

    #[test]
    fn test_rgb_to_lab_primaries() {
        let red = rgb_to_lab(Rgb([255, 0, 0]));
        assert_close(red.l, 53.24, 0.05);
        assert_close(red.a, 80.09, 0.1);
        assert_close(red.b, 67.20, 0.1);

        let blue = rgb_to_lab(Rgb([0, 0, 255]));
        assert_close(blue.l, 32.30, 0.05);
        assert!(blue.b < -100.0);
    }

    #[test]
    fn test_dark_channels_use_linear_segment() {
        // 10/255 is below the sRGB gamma threshold
        let lab = rgb_to_lab(Rgb([10, 10, 10]));
        assert!(lab.l > 0.0 && lab.l < 5.0);
    }

    #[test]
    fn test_color_distance_identity() {
        for rgb in [
            Rgb([0, 0, 0]),
            Rgb([255, 255, 255]),
            Rgb([12, 200, 77]),
            Rgb([255, 0, 0]),
        ] {
            assert_eq!(color_distance(rgb, rgb), 0.0);
        }
    }

    #[test]
    fn test_color_distance_black_white() {
        assert_close(
            color_distance(Rgb([0, 0, 0]), Rgb([255, 255, 255])),
            100.0,
            0.05,
        );
    }

    #[test]
    fn test_color_distance_symmetric_for_neutral_colors() {
        let pairs = [
            (Rgb([0, 0, 0]), Rgb([128, 128, 128])),
            (Rgb([40, 40, 40]), Rgb([230, 230, 230])),
        ];
        for (first, second) in pairs {
            assert_close(
                color_distance(first, second),
                color_distance(second, first),
                1e-3,
            );
        }
    }

    #[test]
    fn test_color_distance_weights_by_first_chroma() {
        let red = Rgb([255, 0, 0]);
        let gray = Rgb([128, 128, 128]);
        // Saturated first argument shrinks the chroma term
        assert!(color_distance(red, gray) < color_distance(gray, red));
    }

    #[test]
    fn test_delta_e_clamps_negative_hue_term() {
        let lab = Lab {
            l: 50.0,
            a: 3.0,
            b: 4.0,
        };
        let scaled = Lab {
            l: 50.0,
            a: 6.0,
            b: 8.0,
        };
        // Same hue angle: only the chroma term contributes
        let expected: f64 = (5.0 - 10.0) / (1.0 + 0.045 * 5.0);
        assert_close(lab.delta_e(&scaled), expected.abs(), 1e-9);
    }
}
