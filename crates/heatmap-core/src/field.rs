//! Dense scalar fields sampled at voxel centers.

use glam::UVec3;

use crate::error::{HeatmapError, Result};
use crate::grid::{checked_voxel_count, VoxelGrid};

/// A dense 3D array of `f32` values, x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    dims: UVec3,
    values: Vec<f32>,
}

impl ScalarField {
    /// Creates a zero-filled field.
    ///
    /// Fails with [`HeatmapError::GridTooLarge`] if `dims` cannot be held.
    pub fn zeros(dims: UVec3) -> Result<Self> {
        let len = Self::len_for(dims)?;
        Ok(Self {
            dims,
            values: vec![0.0; len],
        })
    }

    /// Creates a zero-filled field covering a validated grid.
    #[must_use]
    pub fn for_grid(grid: &VoxelGrid) -> Self {
        Self {
            dims: grid.resolution(),
            values: vec![0.0; grid.voxel_count()],
        }
    }

    /// Wraps existing values, checking the length against `dims`.
    pub fn from_values(dims: UVec3, values: Vec<f32>) -> Result<Self> {
        let expected = Self::len_for(dims)?;
        if values.len() != expected {
            return Err(HeatmapError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { dims, values })
    }

    fn len_for(dims: UVec3) -> Result<usize> {
        checked_voxel_count(dims).ok_or(HeatmapError::GridTooLarge(dims))
    }

    /// Returns the dimensions of the field.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the field has no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the raw values mutably.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Consumes the field and returns its values.
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Returns the linear index of voxel `(x, y, z)`.
    #[must_use]
    pub fn index_of(&self, x: u32, y: u32, z: u32) -> usize {
        let nx = self.dims.x as usize;
        let ny = self.dims.y as usize;
        x as usize + y as usize * nx + z as usize * nx * ny
    }

    /// Returns the 3D index of a linear index.
    #[must_use]
    pub fn coords_of(&self, idx: usize) -> UVec3 {
        let nx = self.dims.x as usize;
        let ny = self.dims.y as usize;
        UVec3::new(
            (idx % nx) as u32,
            ((idx / nx) % ny) as u32,
            (idx / (nx * ny)) as u32,
        )
    }

    /// Gets the value at voxel `(x, y, z)`, or `None` outside the field.
    #[must_use]
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        if x >= self.dims.x || y >= self.dims.y || z >= self.dims.z {
            return None;
        }
        self.values.get(self.index_of(x, y, z)).copied()
    }

    /// Returns the largest value, or `0.0` for a field without voxels.
    ///
    /// The stored values are left untouched; this is metadata for the
    /// renderer's normalization.
    #[must_use]
    pub fn max_value(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Returns the linear index of the largest value.
    #[must_use]
    pub fn argmax(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    /// Iterates over the values divided by `max`.
    ///
    /// A non-positive `max` yields zeros.
    pub fn normalized(&self, max: f32) -> impl Iterator<Item = f32> + '_ {
        let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
        self.values.iter().map(move |v| v * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_checks_length() {
        let dims = UVec3::new(2, 2, 2);
        assert!(ScalarField::from_values(dims, vec![0.0; 8]).is_ok());
        let err = ScalarField::from_values(dims, vec![0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            HeatmapError::SizeMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_unaddressable_dims_rejected() {
        let dims = UVec3::new(1 << 21, 1 << 21, 1 << 22);
        assert!(matches!(
            ScalarField::from_values(dims, Vec::new()),
            Err(HeatmapError::GridTooLarge(_))
        ));
        assert!(matches!(
            ScalarField::zeros(dims),
            Err(HeatmapError::GridTooLarge(_))
        ));
    }

    #[test]
    fn test_index_layout() {
        let values: Vec<f32> = (0..24).map(|i| i as f32).collect();
        let field = ScalarField::from_values(UVec3::new(2, 3, 4), values).unwrap();
        assert_eq!(field.get(1, 0, 0), Some(1.0));
        assert_eq!(field.get(0, 1, 0), Some(2.0));
        assert_eq!(field.get(0, 0, 1), Some(6.0));
        assert_eq!(field.get(2, 0, 0), None);
        assert_eq!(field.coords_of(field.index_of(1, 2, 3)), UVec3::new(1, 2, 3));
    }

    #[test]
    fn test_max_value() {
        let field = ScalarField::from_values(UVec3::new(3, 1, 1), vec![0.5, 2.0, 1.0]).unwrap();
        assert_eq!(field.max_value(), 2.0);
        assert_eq!(field.argmax(), Some(1));
        assert_eq!(field.values(), &[0.5, 2.0, 1.0]);

        let empty = ScalarField::zeros(UVec3::new(4, 0, 4)).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.max_value(), 0.0);
        assert_eq!(empty.argmax(), None);
    }

    #[test]
    fn test_normalized_does_not_mutate() {
        let field = ScalarField::from_values(UVec3::new(2, 1, 1), vec![1.0, 4.0]).unwrap();
        let normalized: Vec<f32> = field.normalized(field.max_value()).collect();
        assert_eq!(normalized, vec![0.25, 1.0]);
        assert_eq!(field.values(), &[1.0, 4.0]);

        let zeros: Vec<f32> = field.normalized(0.0).collect();
        assert_eq!(zeros, vec![0.0, 0.0]);
    }
}
