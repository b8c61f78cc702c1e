//! Square-kernel convolution.
//!
//! # Kernels
//!
//! - [`Kernel::sharpen`] - 4-neighbour sharpen, fills alpha to opaque
//! - [`Kernel::identity`] - Pass-through (useful for testing edge policy)
//! - [`Kernel::box_blur`] - Simple average
//! - [`Kernel::edge_detect`] - Laplacian
//! - [`Kernel::emboss`] - Directional relief
//!
//! # Edges
//!
//! With the default [`EdgePolicy::Truncate`] a kernel cell that falls
//! outside the buffer contributes nothing. Border pixels therefore sum
//! fewer terms than interior pixels; a sharpen kernel brightens them and a
//! blur darkens them. [`EdgePolicy::Clamp`] repeats the nearest edge pixel
//! instead.
//!
//! # Alpha
//!
//! R, G and B are written as the rounded, clamped weighted sum. Alpha is
//! `acc + alpha_blend_factor * (255 - acc)` before clamping, so a factor of
//! 1 makes every output pixel opaque and 0 leaves the convolved alpha.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_ops::filter::{convolve, Kernel};
//!
//! let src = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
//! let sharp = convolve(&src, &Kernel::sharpen()).unwrap();
//! assert_eq!(sharp.get(1, 1).unwrap(), [255, 255, 255, 255]);
//! ```

use crate::{OpsError, OpsResult};
use pixops_core::{PixelBuffer, CHANNELS};
use tracing::{debug, trace};

/// How kernel cells outside the buffer are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Out-of-buffer cells contribute nothing.
    #[default]
    Truncate,
    /// Out-of-buffer cells read the nearest edge pixel.
    Clamp,
}

impl EdgePolicy {
    /// Maps a possibly out-of-range source index to a buffer index, or
    /// `None` if the cell should be skipped.
    #[inline]
    fn resolve(self, i: i64, len: u32) -> Option<usize> {
        match self {
            EdgePolicy::Truncate => (i >= 0 && i < len as i64).then_some(i as usize),
            EdgePolicy::Clamp => Some(i.clamp(0, len as i64 - 1) as usize),
        }
    }
}

impl std::str::FromStr for EdgePolicy {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.to_lowercase().as_str() {
            "truncate" | "skip" | "zero" => Ok(EdgePolicy::Truncate),
            "clamp" | "extend" => Ok(EdgePolicy::Clamp),
            other => Err(OpsError::InvalidParameter(format!("unknown edge policy '{other}'"))),
        }
    }
}

/// Square convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Row-major weights, `size * size` entries.
    pub weights: Vec<f32>,
    /// Side length (must be odd).
    pub size: usize,
    /// How far convolved alpha is pushed toward opaque, in [0, 1].
    pub alpha_blend_factor: f32,
}

impl Kernel {
    /// Creates a kernel, validating its shape.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidKernel`] if `size` is even or zero, if
    /// `weights.len() != size * size`, if a weight is not finite, or if
    /// `alpha_blend_factor` is outside [0, 1].
    pub fn new(weights: Vec<f32>, size: usize, alpha_blend_factor: f32) -> OpsResult<Self> {
        let kernel = Self {
            weights,
            size,
            alpha_blend_factor,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Creates a kernel whose size is inferred from the weight count.
    ///
    /// ```rust
    /// use pixops_ops::filter::Kernel;
    ///
    /// let k = Kernel::from_weights(vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0], 1.0).unwrap();
    /// assert_eq!(k, Kernel::sharpen());
    /// assert!(Kernel::from_weights(vec![1.0; 8], 0.0).is_err());
    /// ```
    pub fn from_weights(weights: Vec<f32>, alpha_blend_factor: f32) -> OpsResult<Self> {
        let size = (weights.len() as f64).sqrt().round() as usize;
        if size * size != weights.len() {
            return Err(OpsError::InvalidKernel(format!(
                "{} weights do not form a square kernel",
                weights.len()
            )));
        }
        Self::new(weights, size, alpha_blend_factor)
    }

    /// Checks the kernel invariants.
    pub fn validate(&self) -> OpsResult<()> {
        if self.size == 0 || self.size % 2 == 0 {
            return Err(OpsError::InvalidKernel(format!(
                "kernel size must be odd, got {}",
                self.size
            )));
        }
        if self.weights.len() != self.size * self.size {
            return Err(OpsError::InvalidKernel(format!(
                "kernel data size {} doesn't match {}x{}",
                self.weights.len(),
                self.size,
                self.size
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite()) {
            return Err(OpsError::InvalidKernel("kernel weights must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.alpha_blend_factor) {
            return Err(OpsError::InvalidKernel(format!(
                "alpha blend factor {} outside [0, 1]",
                self.alpha_blend_factor
            )));
        }
        Ok(())
    }

    /// The sharpen kernel `[0,-1,0, -1,5,-1, 0,-1,0]` with alpha blend 1.
    ///
    /// Weights sum to 1, so flat regions are unchanged.
    pub fn sharpen() -> Self {
        Self {
            weights: vec![
                0.0, -1.0, 0.0,
                -1.0, 5.0, -1.0,
                0.0, -1.0, 0.0,
            ],
            size: 3,
            alpha_blend_factor: 1.0,
        }
    }

    /// Pass-through kernel of the given size (made odd), alpha blend 0.
    pub fn identity(size: usize) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size };
        let mut weights = vec![0.0; size * size];
        weights[size * size / 2] = 1.0;
        Self {
            weights,
            size,
            alpha_blend_factor: 0.0,
        }
    }

    /// Box blur (simple average) of the given size (made odd), alpha blend 0.
    pub fn box_blur(size: usize) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size };
        let count = size * size;
        Self {
            weights: vec![1.0 / count as f32; count],
            size,
            alpha_blend_factor: 0.0,
        }
    }

    /// Laplacian edge detection, alpha blend 1.
    pub fn edge_detect() -> Self {
        Self {
            weights: vec![
                0.0, -1.0, 0.0,
                -1.0, 4.0, -1.0,
                0.0, -1.0, 0.0,
            ],
            size: 3,
            alpha_blend_factor: 1.0,
        }
    }

    /// Emboss, alpha blend 1.
    pub fn emboss() -> Self {
        Self {
            weights: vec![
                -2.0, -1.0, 0.0,
                -1.0, 1.0, 1.0,
                0.0, 1.0, 2.0,
            ],
            size: 3,
            alpha_blend_factor: 1.0,
        }
    }

    /// Returns this kernel with a different alpha blend factor.
    pub fn with_alpha_blend(mut self, alpha_blend_factor: f32) -> OpsResult<Self> {
        self.alpha_blend_factor = alpha_blend_factor;
        self.validate()?;
        Ok(self)
    }

    /// Returns the kernel radius, `size / 2`.
    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Looks up a kernel by name (`sharpen`, `identity`, `box`, `edge`, `emboss`).
    pub fn named(name: &str) -> OpsResult<Self> {
        match name.to_lowercase().as_str() {
            "sharpen" => Ok(Self::sharpen()),
            "identity" => Ok(Self::identity(3)),
            "box" | "blur" => Ok(Self::box_blur(3)),
            "edge" | "laplacian" => Ok(Self::edge_detect()),
            "emboss" => Ok(Self::emboss()),
            other => Err(OpsError::InvalidKernel(format!("unknown kernel '{other}'"))),
        }
    }
}

/// Rounds and clamps an accumulator to a sample.
#[inline]
fn to_sample(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convolves one output row.
///
/// `out` is `width * 4` samples for row `y`. Shared with the parallel
/// path, which hands each row to a different worker.
pub(crate) fn convolve_row(
    src: &PixelBuffer,
    kernel: &Kernel,
    edge: EdgePolicy,
    y: u32,
    out: &mut [u8],
) {
    let (width, height) = src.dimensions();
    let samples = src.samples();
    let size = kernel.size;
    let half = kernel.radius() as i64;

    for x in 0..width {
        let mut acc = [0.0f32; CHANNELS];

        for ky in 0..size {
            let Some(sy) = edge.resolve(y as i64 + ky as i64 - half, height) else {
                continue;
            };
            for kx in 0..size {
                let Some(sx) = edge.resolve(x as i64 + kx as i64 - half, width) else {
                    continue;
                };
                let w = kernel.weights[ky * size + kx];
                if w == 0.0 {
                    continue;
                }
                let idx = (sy * width as usize + sx) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += samples[idx + c] as f32 * w;
                }
            }
        }

        let o = x as usize * CHANNELS;
        out[o] = to_sample(acc[0]);
        out[o + 1] = to_sample(acc[1]);
        out[o + 2] = to_sample(acc[2]);
        out[o + 3] = to_sample(acc[3] + kernel.alpha_blend_factor * (255.0 - acc[3]));
    }
}

/// Convolves `src` with `kernel` using [`EdgePolicy::Truncate`].
///
/// # Errors
///
/// [`OpsError::InvalidKernel`] if the kernel fails [`Kernel::validate`].
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> OpsResult<PixelBuffer> {
    convolve_with(src, kernel, EdgePolicy::Truncate)
}

/// Convolves `src` with `kernel` using the given edge policy.
///
/// # Example
///
/// ```rust
/// use pixops_core::PixelBuffer;
/// use pixops_ops::filter::{convolve_with, EdgePolicy, Kernel};
///
/// let src = PixelBuffer::filled(8, 8, [90, 90, 90, 255]);
/// let k = Kernel::box_blur(3);
/// let clamped = convolve_with(&src, &k, EdgePolicy::Clamp).unwrap();
/// assert_eq!(clamped.get(0, 0).unwrap(), [90, 90, 90, 255]);
/// let truncated = convolve_with(&src, &k, EdgePolicy::Truncate).unwrap();
/// assert_eq!(truncated.get(0, 0).unwrap(), [40, 40, 40, 113]);
/// ```
pub fn convolve_with(src: &PixelBuffer, kernel: &Kernel, edge: EdgePolicy) -> OpsResult<PixelBuffer> {
    trace!(width = src.width(), height = src.height(), size = kernel.size, ?edge, "convolve");
    kernel.validate()?;

    if src.is_empty() {
        return Ok(src.clone());
    }
    debug!(radius = kernel.radius(), alpha_blend = kernel.alpha_blend_factor, "Applying kernel");

    let row_len = src.row_len();
    let mut out = vec![0u8; src.samples().len()];
    for (y, row) in out.chunks_exact_mut(row_len).enumerate() {
        convolve_row(src, kernel, edge, y as u32, row);
    }

    Ok(PixelBuffer::from_samples(src.width(), src.height(), out)?)
}

/// Applies [`Kernel::sharpen`].
pub fn sharpen(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    convolve(src, &Kernel::sharpen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            [(x * 31 + y * 7) as u8, (y * 29) as u8, ((x ^ y) * 13) as u8, (x * 40 + 15) as u8]
        })
    }

    #[test]
    fn test_kernel_even_size_rejected() {
        let err = Kernel::new(vec![0.0; 4], 2, 0.0).unwrap_err();
        assert!(matches!(err, OpsError::InvalidKernel(_)));
        assert!(Kernel::new(vec![], 0, 0.0).is_err());
    }

    #[test]
    fn test_kernel_weight_count_rejected() {
        assert!(matches!(
            Kernel::new(vec![1.0; 8], 3, 0.0),
            Err(OpsError::InvalidKernel(_))
        ));
    }

    #[test]
    fn test_kernel_blend_and_weights_validated() {
        assert!(Kernel::new(vec![1.0; 9], 3, 1.5).is_err());
        assert!(Kernel::new(vec![1.0; 9], 3, -0.1).is_err());
        let mut w = vec![0.0; 9];
        w[4] = f32::NAN;
        assert!(Kernel::new(w, 3, 0.0).is_err());
        assert!(Kernel::sharpen().with_alpha_blend(2.0).is_err());
    }

    #[test]
    fn test_named_kernels_are_valid() {
        for name in ["sharpen", "identity", "box", "edge", "emboss"] {
            Kernel::named(name).unwrap().validate().unwrap();
        }
        assert!(Kernel::named("nope").is_err());
        Kernel::box_blur(4).validate().unwrap();
        assert_eq!(Kernel::identity(4).size, 5);
    }

    #[test]
    fn test_kernel_weight_sums() {
        // Brightness-preserving kernels sum to one
        for kernel in [Kernel::box_blur(3), Kernel::box_blur(7), Kernel::sharpen(), Kernel::emboss(), Kernel::identity(5)] {
            assert_abs_diff_eq!(kernel.weights.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
        assert_abs_diff_eq!(Kernel::edge_detect().weights.iter().sum::<f32>(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_convolve_even_kernel_literal_fails() {
        let bad = Kernel {
            weights: vec![0.25; 4],
            size: 2,
            alpha_blend_factor: 0.0,
        };
        for w in [1, 3, 8] {
            let src = ramp(w, w);
            assert!(matches!(convolve(&src, &bad), Err(OpsError::InvalidKernel(_))));
        }
    }

    #[test]
    fn test_sharpen_white_4x4() {
        let src = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
        let out = sharpen(&src).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        for (_, _, px) in out.pixels() {
            assert_eq!(px, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_sharpen_edge_bias() {
        // Flat 100: interior sums 5 terms, edges 4, corners 3.
        let src = PixelBuffer::filled(3, 3, [100, 100, 100, 0]);
        let out = sharpen(&src).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), [100, 100, 100, 255]);
        assert_eq!(out.get(1, 0).unwrap(), [200, 200, 200, 255]);
        // 500 - 200 = 300, clamped
        assert_eq!(out.get(0, 0).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_truncate_vs_clamp() {
        let src = PixelBuffer::filled(5, 5, [10, 10, 10, 10]);
        let ones = Kernel::new(vec![1.0; 9], 3, 0.0).unwrap();

        let t = convolve_with(&src, &ones, EdgePolicy::Truncate).unwrap();
        assert_eq!(t.get(2, 2).unwrap(), [90, 90, 90, 90]);
        assert_eq!(t.get(2, 0).unwrap(), [60, 60, 60, 60]);
        assert_eq!(t.get(0, 0).unwrap(), [40, 40, 40, 40]);

        let c = convolve_with(&src, &ones, EdgePolicy::Clamp).unwrap();
        for (_, _, px) in c.pixels() {
            assert_eq!(px, [90, 90, 90, 90]);
        }
    }

    #[test]
    fn test_identity_reproduces_interior() {
        let src = ramp(9, 7);
        let out = convolve(&src, &Kernel::identity(3)).unwrap();
        for y in 1..6 {
            for x in 1..8 {
                assert_eq!(out.get(x, y).unwrap(), src.get(x, y).unwrap());
            }
        }
    }

    #[test]
    fn test_identity_5x5() {
        let src = ramp(6, 6);
        let out = convolve(&src, &Kernel::identity(5)).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_alpha_blend_factor() {
        let src = PixelBuffer::filled(3, 3, [50, 50, 50, 100]);
        let half = Kernel::identity(3).with_alpha_blend(0.5).unwrap();
        let out = convolve(&src, &half).unwrap();
        // 100 + 0.5 * 155 = 177.5
        assert_eq!(out.get(1, 1).unwrap(), [50, 50, 50, 178]);

        let full = Kernel::identity(3).with_alpha_blend(1.0).unwrap();
        let out = convolve(&src, &full).unwrap();
        assert_eq!(out.get(0, 2).unwrap()[3], 255);
    }

    #[test]
    fn test_rgb_clamped_below_zero() {
        let src = PixelBuffer::filled(3, 3, [100, 100, 100, 255]);
        let neg = Kernel::new(vec![-1.0], 1, 0.0).unwrap();
        let out = convolve(&src, &neg).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_convolve_leaves_source() {
        let src = ramp(4, 4);
        let before = src.clone();
        let _ = sharpen(&src).unwrap();
        assert_eq!(src, before);
    }

    #[test]
    fn test_convolve_empty() {
        let src = PixelBuffer::with_dimensions(0, 0);
        assert!(sharpen(&src).unwrap().is_empty());
    }

    #[test]
    fn test_edge_policy_parse() {
        assert_eq!("clamp".parse::<EdgePolicy>().unwrap(), EdgePolicy::Clamp);
        assert_eq!("Truncate".parse::<EdgePolicy>().unwrap(), EdgePolicy::Truncate);
        assert!("mirror".parse::<EdgePolicy>().is_err());
    }
}
