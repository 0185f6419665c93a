/// Smallest side a compressed image is allowed to shrink to.
pub const MIN_DIMENSION: u32 = 100;
/// Largest side a compressed image is allowed to keep.
pub const MAX_DIMENSION: u32 = 4000;

/// Output dimensions for size-targeted compression.
pub struct SizeCalculator;

impl SizeCalculator {
    /// Scale both sides by `sqrt(target_mb / original_mb)`, then clamp.
    ///
    /// The floor clamp runs first: if either side ends up below
    /// [`MIN_DIMENSION`], the image is rescaled from its original aspect ratio so
    /// the smaller side is exactly [`MIN_DIMENSION`]. The ceiling clamp runs
    /// second and wins: if either side exceeds [`MAX_DIMENSION`], the larger side
    /// becomes [`MAX_DIMENSION`]. For extreme aspect ratios this can leave the
    /// smaller side below the floor again.
    pub fn compute_dimensions(
        orig_width: u32,
        orig_height: u32,
        target_mb: f64,
        original_mb: f64,
    ) -> (u32, u32) {
        if orig_width == 0 || orig_height == 0 {
            return (orig_width, orig_height);
        }

        let ratio = if target_mb > 0.0 && original_mb > 0.0 {
            (target_mb / original_mb).sqrt()
        } else {
            1.0
        };

        let aspect = orig_width as f64 / orig_height as f64;
        let min = MIN_DIMENSION as f64;
        let max = MAX_DIMENSION as f64;

        let mut width = (orig_width as f64 * ratio).floor();
        let mut height = (orig_height as f64 * ratio).floor();

        if width < min || height < min {
            if aspect >= 1.0 {
                height = min;
                width = (min * aspect).floor();
            } else {
                width = min;
                height = (min / aspect).floor();
            }
        }

        if width > max || height > max {
            if aspect >= 1.0 {
                width = max;
                height = (max / aspect).floor();
            } else {
                height = max;
                width = (max * aspect).floor();
            }
        }

        (width.max(1.0) as u32, height.max(1.0) as u32)
    }
}
