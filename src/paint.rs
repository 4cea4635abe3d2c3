//! Recolouring capability for visual entities
//!
//! Anything that carries a tint implements [`Paintable`]; callers recolour
//! through the trait instead of probing for material fields.

/// An entity whose colour can be replaced or shifted
pub trait Paintable {
    /// Apply `f` to every colour the entity carries (linear RGB, 0-1)
    fn recolor(&mut self, f: &dyn Fn([f32; 3]) -> [f32; 3]);

    /// Replace every colour with `color`
    fn paint(&mut self, color: [f32; 3]) {
        self.recolor(&|_| color);
    }

    /// Shift hue, saturation and lightness (hue wraps, the rest clamp)
    fn offset_hsl(&mut self, dh: f32, ds: f32, dl: f32) {
        self.recolor(&|rgb| {
            let [h, s, l] = rgb_to_hsl(rgb);
            hsl_to_rgb([
                (h + dh).rem_euclid(1.0),
                (s + ds).clamp(0.0, 1.0),
                (l + dl).clamp(0.0, 1.0),
            ])
        });
    }
}

/// RGB (0-1) to HSL (0-1)
pub fn rgb_to_hsl([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f32::EPSILON {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    [h / 6.0, s, l]
}

/// HSL (0-1) to RGB (0-1)
pub fn hsl_to_rgb([h, s, l]: [f32; 3]) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Swatch([f32; 3]);

    impl Paintable for Swatch {
        fn recolor(&mut self, f: &dyn Fn([f32; 3]) -> [f32; 3]) {
            self.0 = f(self.0);
        }
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_hsl_round_trip_primaries() {
        for rgb in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.2, 0.4, 0.9], [0.5, 0.5, 0.5]] {
            assert!(close(hsl_to_rgb(rgb_to_hsl(rgb)), rgb), "{rgb:?}");
        }
    }

    #[test]
    fn test_paint_replaces_color() {
        let mut swatch = Swatch([0.1, 0.2, 0.3]);
        swatch.paint([1.0, 1.0, 0.0]);
        assert_eq!(swatch.0, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_offset_hsl_lightens() {
        let mut swatch = Swatch([0.4, 0.2, 0.2]);
        let before = rgb_to_hsl(swatch.0);
        swatch.offset_hsl(0.05, 0.1, 0.1);
        let after = rgb_to_hsl(swatch.0);
        assert!((after[2] - (before[2] + 0.1)).abs() < 1e-4);
        assert!((after[0] - (before[0] + 0.05)).abs() < 1e-4);
    }
}
