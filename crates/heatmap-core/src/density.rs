//! Gaussian kernel density estimation over a voxel grid.
//!
//! Every voxel receives `sum_p exp(-|c - p|^2 / (2 sigma^2))` where `c` is
//! the voxel center. The kernel is not normalized, so a point sitting exactly
//! on a voxel center contributes `1.0`. There is no spatial truncation.
//!
//! Cost is `O(voxels * points)`. Callers are expected to bound both.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::Result;
use crate::field::ScalarField;
use crate::grid::VoxelGrid;

/// Below this many voxels the CPU estimator stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 1024;

/// Computes a density field from a point set.
///
/// Implementations block until the whole field is available.
pub trait DensityEstimator: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Computes the density of `points` at every voxel of `grid`.
    ///
    /// An empty point set yields an all-zero field.
    fn estimate(&self, grid: &VoxelGrid, points: &[Vec3]) -> Result<ScalarField>;
}

/// Returns the kernel weight for a squared distance.
#[inline]
#[must_use]
pub fn gaussian_weight(distance_sq: f32, inv_two_sigma_sq: f32) -> f32 {
    (-distance_sq * inv_two_sigma_sq).exp()
}

/// Returns `1 / (2 sigma^2)`.
#[inline]
#[must_use]
pub fn inv_two_sigma_sq(sigma: f32) -> f32 {
    1.0 / (2.0 * sigma * sigma)
}

/// Sums the kernel of every point at `center`, in input order.
#[inline]
fn density_at(center: Vec3, points: &[Vec3], inv_two_sigma_sq: f32) -> f32 {
    points
        .iter()
        .map(|p| gaussian_weight(center.distance_squared(*p), inv_two_sigma_sq))
        .sum()
}

/// Multi-threaded CPU estimator.
///
/// Voxels are independent, so the field is split across the rayon pool
/// with no shared mutable state. Each voxel sums its points in input order,
/// which makes the result bit-reproducible for a given point order
/// regardless of thread count.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDensityEstimator;

impl CpuDensityEstimator {
    /// Creates a new CPU estimator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DensityEstimator for CpuDensityEstimator {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn estimate(&self, grid: &VoxelGrid, points: &[Vec3]) -> Result<ScalarField> {
        let mut field = ScalarField::for_grid(grid);
        if field.is_empty() || points.is_empty() {
            return Ok(field);
        }

        let k = inv_two_sigma_sq(grid.sigma());
        let fill = |idx: usize, value: &mut f32| {
            *value = density_at(grid.voxel_center_at(idx), points, k);
        };

        let values = field.values_mut();
        if values.len() >= PARALLEL_THRESHOLD {
            values
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, value)| fill(idx, value));
        } else {
            for (idx, value) in values.iter_mut().enumerate() {
                fill(idx, value);
            }
        }

        log::debug!(
            "cpu density: {} voxels x {} points",
            field.len(),
            points.len()
        );
        Ok(field)
    }
}
