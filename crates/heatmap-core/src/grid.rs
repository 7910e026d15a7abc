//! Voxel lattice over an axis-aligned bounding region.
//!
//! A grid is described by a center, half-extents and a per-axis resolution.
//! Values live at voxel (cell) centers, never on the region boundary.

use glam::{IVec3, UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

/// User-facing grid description.
///
/// The resolution is signed so that bad input coming from configuration
/// files can be represented and rejected by [`GridSettings::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Center of the bounding region.
    pub center: Vec3,
    /// Half of the region size along each axis.
    pub half_extents: Vec3,
    /// Number of voxels along each axis.
    pub resolution: IVec3,
    /// Standard deviation of the Gaussian kernel, in world units.
    pub sigma: f32,
}

impl GridSettings {
    /// Creates grid settings from a center and half-extents.
    pub fn new(center: Vec3, half_extents: Vec3, resolution: IVec3, sigma: f32) -> Self {
        Self {
            center,
            half_extents,
            resolution,
            sigma,
        }
    }

    /// Creates grid settings from a center and a full box size.
    pub fn from_bounds(center: Vec3, size: Vec3, resolution: IVec3, sigma: f32) -> Self {
        Self::new(center, size * 0.5, resolution, sigma)
    }

    /// Checks the settings and returns the validated grid.
    ///
    /// Fails if any resolution component is negative or if sigma is not a
    /// positive finite number. A zero component is accepted and yields a
    /// grid with no voxels.
    pub fn validate(&self) -> Result<VoxelGrid> {
        if self.resolution.cmplt(IVec3::ZERO).any() {
            return Err(HeatmapError::NegativeResolution(self.resolution));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(HeatmapError::InvalidSigma(self.sigma));
        }
        let resolution = self.resolution.as_uvec3();
        let voxel_count =
            checked_voxel_count(resolution).ok_or(HeatmapError::GridTooLarge(resolution))?;
        Ok(VoxelGrid {
            center: self.center,
            size: self.half_extents * 2.0,
            resolution,
            voxel_count,
            sigma: self.sigma,
        })
    }
}

/// Returns `nx * ny * nz`, or `None` if that many `f32` values cannot be
/// allocated.
#[must_use]
pub fn checked_voxel_count(resolution: UVec3) -> Option<usize> {
    let count = (resolution.x as usize)
        .checked_mul(resolution.y as usize)?
        .checked_mul(resolution.z as usize)?;
    let max = isize::MAX as usize / std::mem::size_of::<f32>();
    (count <= max).then_some(count)
}

/// A validated voxel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    center: Vec3,
    size: Vec3,
    resolution: UVec3,
    voxel_count: usize,
    sigma: f32,
}

impl VoxelGrid {
    /// Returns the region center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Returns the full region size (twice the half-extents).
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Returns the number of voxels along each axis.
    #[must_use]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    /// Returns the Gaussian standard deviation.
    #[must_use]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Returns the minimum and maximum corners of the region.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.size * 0.5;
        (self.center - half, self.center + half)
    }

    /// Returns the total number of voxels.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Returns true when at least one axis has zero voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxel_count() == 0
    }

    /// Flattens a 3D voxel index to a linear index (x fastest).
    #[must_use]
    pub fn flatten_index(&self, x: u32, y: u32, z: u32) -> usize {
        let nx = self.resolution.x as usize;
        let ny = self.resolution.y as usize;
        x as usize + y as usize * nx + z as usize * nx * ny
    }

    /// Unflattens a linear index to a 3D voxel index.
    #[must_use]
    pub fn unflatten_index(&self, idx: usize) -> UVec3 {
        let nx = self.resolution.x as usize;
        let ny = self.resolution.y as usize;
        let x = idx % nx;
        let y = (idx / nx) % ny;
        let z = idx / (nx * ny);
        UVec3::new(x as u32, y as u32, z as u32)
    }

    /// Returns the world-space center of voxel `(x, y, z)`.
    #[must_use]
    pub fn voxel_center(&self, x: u32, y: u32, z: u32) -> Vec3 {
        let res = self.resolution.as_vec3();
        let t = (Vec3::new(x as f32, y as f32, z as f32) + 0.5) / res - 0.5;
        self.center + t * self.size
    }

    /// Returns the world-space center of the voxel at a linear index.
    #[must_use]
    pub fn voxel_center_at(&self, idx: usize) -> Vec3 {
        let v = self.unflatten_index(idx);
        self.voxel_center(v.x, v.y, v.z)
    }
}
