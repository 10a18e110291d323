//! Colormaps mapping normalised values in `[0, 1]` to RGB.

/// Linear RGB triple with channels in `[0, 1]`.
pub type Rgb = [f64; 3];

/// ColorBrewer "RdBu" anchors, red at 0 and blue at 1.
const RDBU: [[u8; 3]; 11] = [
    [0x67, 0x00, 0x1f],
    [0xb2, 0x18, 0x2b],
    [0xd6, 0x60, 0x4d],
    [0xf4, 0xa5, 0x82],
    [0xfd, 0xdb, 0xc7],
    [0xf7, 0xf7, 0xf7],
    [0xd1, 0xe5, 0xf0],
    [0x92, 0xc5, 0xde],
    [0x43, 0x93, 0xc3],
    [0x21, 0x66, 0xac],
    [0x05, 0x30, 0x61],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// White at 0, black at 1.
    Binary,
    /// Diverging red (0), white (0.5), blue (1).
    RdBu,
}

impl Colormap {
    pub fn map(self, value: f64) -> Rgb {
        let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        match self {
            Colormap::Binary => [1.0 - v; 3],
            Colormap::RdBu => interpolate_anchors(&RDBU, v),
        }
    }
}

fn interpolate_anchors(anchors: &[[u8; 3]], v: f64) -> Rgb {
    let segments = (anchors.len() - 1) as f64;
    let x = v * segments;
    let lo = (x.floor() as usize).min(anchors.len() - 2);
    let t = x - lo as f64;
    let (a, b) = (anchors[lo], anchors[lo + 1]);
    let mut rgb = [0.0; 3];
    for c in 0..3 {
        rgb[c] = ((1.0 - t) * a[c] as f64 + t * b[c] as f64) / 255.0;
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binary_endpoints() {
        assert_eq!(Colormap::Binary.map(0.0), [1.0; 3]);
        assert_eq!(Colormap::Binary.map(1.0), [0.0; 3]);
        assert_eq!(Colormap::Binary.map(0.25), [0.75; 3]);
    }

    #[test]
    fn test_rdbu_anchors() {
        let red = Colormap::RdBu.map(0.0);
        assert_relative_eq!(red[0], 103.0 / 255.0, epsilon = 1e-12);
        assert_relative_eq!(red[2], 31.0 / 255.0, epsilon = 1e-12);

        let white = Colormap::RdBu.map(0.5);
        assert!(white.iter().all(|&c| (c - 247.0 / 255.0).abs() < 1e-12));

        let blue = Colormap::RdBu.map(1.0);
        assert_relative_eq!(blue[0], 5.0 / 255.0, epsilon = 1e-12);
        assert_relative_eq!(blue[2], 97.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(Colormap::RdBu.map(-3.0), Colormap::RdBu.map(0.0));
        assert_eq!(Colormap::Binary.map(f64::NAN), [1.0; 3]);
    }
}
