//! Mapping from the optimizer's search domain to canvas pixels.

use crate::error::PlaybackError;

/// Shared lower/upper limit of both search coordinates. Always `min < max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainBounds {
    min: f64,
    max: f64,
}

impl DomainBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, PlaybackError> {
        if !(min.is_finite() && max.is_finite()) || max <= min {
            return Err(PlaybackError::DegenerateBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl TryFrom<(f64, f64)> for DomainBounds {
    type Error = PlaybackError;

    fn try_from((min, max): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

/// Canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A surface paired with the domain drawn onto it.
///
/// Pixel y grows downward, so domain `min` maps to the bottom edge and `max` to the top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub size: SurfaceSize,
    pub bounds: DomainBounds,
}

impl Viewport {
    pub fn new(size: SurfaceSize, bounds: DomainBounds) -> Self {
        Self { size, bounds }
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let span = self.bounds.span();
        let px = (x - self.bounds.min) / span * self.size.width;
        let py = self.size.height - (y - self.bounds.min) / span * self.size.height;
        (px, py)
    }

    /// Whether a pixel lies on the surface (edges included).
    pub fn contains_pixel(&self, px: f64, py: f64) -> bool {
        (0.0..=self.size.width).contains(&px) && (0.0..=self.size.height).contains(&py)
    }
}

/// One-shot form of [`Viewport::to_pixel`].
pub fn transform(
    x: f64,
    y: f64,
    bounds: (f64, f64),
    size: SurfaceSize,
) -> Result<(f64, f64), PlaybackError> {
    let bounds = DomainBounds::try_from(bounds)?;
    Ok(Viewport::new(size, bounds).to_pixel(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn corners_map_to_canvas_corners() {
        let size = SurfaceSize::new(400.0, 300.0);
        for bounds in [(-10.0, 10.0), (-5.12, 5.12), (-5.0, 10.0), (0.0, 1.0)] {
            let (lo, hi) = bounds;
            assert!(close(transform(lo, lo, bounds, size).unwrap(), (0.0, 300.0)));
            assert!(close(transform(hi, hi, bounds, size).unwrap(), (400.0, 0.0)));
            assert!(close(transform(lo, hi, bounds, size).unwrap(), (0.0, 0.0)));
        }
    }

    #[test]
    fn centre_maps_to_centre() {
        let vp = Viewport::new(
            SurfaceSize::new(200.0, 100.0),
            DomainBounds::new(-10.0, 10.0).unwrap(),
        );
        assert!(close(vp.to_pixel(0.0, 0.0), (100.0, 50.0)));
    }

    #[test]
    fn mapping_is_monotonic() {
        let vp = Viewport::new(
            SurfaceSize::new(640.0, 480.0),
            DomainBounds::new(-600.0, 600.0).unwrap(),
        );
        let mut prev = vp.to_pixel(-600.0, -600.0);
        for i in 1..=100 {
            let v = -600.0 + 12.0 * i as f64;
            let p = vp.to_pixel(v, v);
            assert!(p.0 > prev.0, "x not increasing at {v}");
            assert!(p.1 < prev.1, "y not decreasing at {v}");
            prev = p;
        }
    }

    #[test]
    fn points_inside_the_domain_land_on_the_surface() {
        let vp = Viewport::new(
            SurfaceSize::new(300.0, 300.0),
            DomainBounds::new(-5.0, 10.0).unwrap(),
        );
        for &(x, y) in &[(-5.0, 10.0), (2.5, 2.5), (9.99, -4.99), (0.0, 0.0)] {
            let (px, py) = vp.to_pixel(x, y);
            assert!(vp.contains_pixel(px, py), "({x}, {y}) -> ({px}, {py})");
        }
        let (px, py) = vp.to_pixel(11.0, 0.0);
        assert!(!vp.contains_pixel(px, py));
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        for (lo, hi) in [(3.0, 3.0), (5.0, -5.0), (f64::NAN, 1.0), (0.0, f64::INFINITY)] {
            let err = DomainBounds::new(lo, hi).unwrap_err();
            assert!(matches!(err, PlaybackError::DegenerateBounds { .. }));
        }
        let size = SurfaceSize::new(10.0, 10.0);
        assert!(transform(0.0, 0.0, (1.0, 1.0), size).is_err());
    }
}
