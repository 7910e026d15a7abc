//! Color gradients and their fixed-resolution lookup tables.

use std::collections::HashMap;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

/// Default number of entries in a colormap lookup table.
pub const COLORMAP_RESOLUTION: usize = 256;

/// How colors between two stops are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GradientMode {
    /// Linear interpolation between neighbouring stops.
    #[default]
    Blend,
    /// Use the color of the next stop without blending.
    Fixed,
}

/// A single gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub position: f32,
    /// Linear RGBA color.
    pub color: Vec4,
}

impl ColorStop {
    /// Creates a new stop.
    pub fn new(position: f32, color: Vec4) -> Self {
        Self { position, color }
    }
}

/// A continuous color gradient defined by ordered stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColormap")]
pub struct Colormap {
    name: String,
    stops: Vec<ColorStop>,
    mode: GradientMode,
}

/// Unchecked form used while deserializing.
#[derive(Deserialize)]
struct RawColormap {
    name: String,
    stops: Vec<ColorStop>,
    #[serde(default)]
    mode: GradientMode,
}

impl TryFrom<RawColormap> for Colormap {
    type Error = HeatmapError;

    fn try_from(raw: RawColormap) -> Result<Self> {
        Self::with_mode(raw.name, raw.stops, raw.mode)
    }
}

impl Colormap {
    /// Creates a blended colormap.
    ///
    /// Stops are sorted by position; stops sharing a position keep their
    /// input order. Fails if there are no stops or a position is outside
    /// `[0, 1]`.
    pub fn new(name: impl Into<String>, stops: Vec<ColorStop>) -> Result<Self> {
        Self::with_mode(name, stops, GradientMode::Blend)
    }

    /// Creates a colormap with an explicit gradient mode.
    pub fn with_mode(
        name: impl Into<String>,
        mut stops: Vec<ColorStop>,
        mode: GradientMode,
    ) -> Result<Self> {
        let name = name.into();
        if stops.is_empty() {
            return Err(HeatmapError::InvalidColormap(format!(
                "'{name}' has no color stops"
            )));
        }
        if let Some(bad) = stops
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.position))
        {
            return Err(HeatmapError::InvalidColormap(format!(
                "'{name}' has a stop at {} outside [0, 1]",
                bad.position
            )));
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { name, stops, mode })
    }

    /// Creates a blended colormap from evenly spaced opaque colors.
    pub fn evenly_spaced(name: impl Into<String>, colors: &[Vec3]) -> Result<Self> {
        let n = colors.len().saturating_sub(1).max(1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, c)| ColorStop::new(i as f32 / n, c.extend(1.0)))
            .collect();
        Self::new(name, stops)
    }

    /// Returns the colormap name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sorted stops.
    #[must_use]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Returns the gradient mode.
    #[must_use]
    pub fn mode(&self) -> GradientMode {
        self.mode
    }

    /// Evaluates the gradient at `t`, clamped to `[0, 1]`.
    ///
    /// Outside the first and last stop the end colors are held.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> Vec4 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        // first.position < t < last.position, so 1 <= upper < len
        let upper = self.stops.partition_point(|s| s.position < t);
        let hi = self.stops[upper];
        match self.mode {
            GradientMode::Fixed => hi.color,
            GradientMode::Blend => {
                let lo = self.stops[upper - 1];
                let span = hi.position - lo.position;
                if span <= f32::EPSILON {
                    hi.color
                } else {
                    lo.color.lerp(hi.color, (t - lo.position) / span)
                }
            }
        }
    }
}

/// A colormap sampled at evenly spaced positions.
///
/// Entry `i` holds the gradient at `i / (len - 1)`, so the renderer can
/// index it directly by normalized heat.
#[derive(Debug, Clone, PartialEq)]
pub struct ColormapLut {
    colors: Vec<Vec4>,
}

impl ColormapLut {
    /// Samples `colormap` into `resolution` entries.
    pub fn sample(colormap: &Colormap, resolution: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(HeatmapError::InvalidColormapResolution);
        }
        let denom = resolution.saturating_sub(1).max(1) as f32;
        let colors = (0..resolution)
            .map(|i| {
                let t = if resolution == 1 { 0.0 } else { i as f32 / denom };
                colormap.evaluate(t)
            })
            .collect();
        Ok(Self { colors })
    }

    /// Samples `colormap` at [`COLORMAP_RESOLUTION`].
    pub fn sample_default(colormap: &Colormap) -> Result<Self> {
        Self::sample(colormap, COLORMAP_RESOLUTION)
    }

    /// Returns the sampled colors.
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a successfully sampled table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Packs the colors as RGBA8 texels.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.colors
            .iter()
            .flat_map(|c| {
                let c = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
                [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
            })
            .collect()
    }
}

/// Registry of named colormaps.
#[derive(Default)]
pub struct ColormapRegistry {
    colormaps: HashMap<String, Colormap>,
}

impl ColormapRegistry {
    /// Name of the preset used when nothing else is configured.
    pub const DEFAULT: &'static str = "heat";

    /// Creates a registry with the built-in presets.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        let presets = [
            // Transparent blue to opaque red
            Colormap::new(
                "heat",
                vec![
                    ColorStop::new(0.0, Vec4::new(0.0, 0.0, 1.0, 0.0)),
                    ColorStop::new(0.25, Vec4::new(0.0, 1.0, 1.0, 0.25)),
                    ColorStop::new(0.5, Vec4::new(0.0, 1.0, 0.0, 0.5)),
                    ColorStop::new(0.75, Vec4::new(1.0, 1.0, 0.0, 0.75)),
                    ColorStop::new(1.0, Vec4::new(1.0, 0.0, 0.0, 1.0)),
                ],
            ),
            Colormap::evenly_spaced("grayscale", &[Vec3::ZERO, Vec3::ONE]),
            Colormap::evenly_spaced(
                "viridis",
                &[
                    Vec3::new(0.267, 0.004, 0.329),
                    Vec3::new(0.282, 0.140, 0.457),
                    Vec3::new(0.253, 0.265, 0.529),
                    Vec3::new(0.206, 0.371, 0.553),
                    Vec3::new(0.163, 0.471, 0.558),
                    Vec3::new(0.127, 0.566, 0.550),
                    Vec3::new(0.134, 0.658, 0.517),
                    Vec3::new(0.266, 0.749, 0.440),
                    Vec3::new(0.477, 0.821, 0.318),
                    Vec3::new(0.741, 0.873, 0.150),
                    Vec3::new(0.993, 0.906, 0.144),
                ],
            ),
            Colormap::evenly_spaced(
                "reds",
                &[
                    Vec3::new(1.000, 0.961, 0.941),
                    Vec3::new(0.988, 0.733, 0.631),
                    Vec3::new(0.984, 0.416, 0.290),
                    Vec3::new(0.796, 0.094, 0.114),
                    Vec3::new(0.404, 0.000, 0.051),
                ],
            ),
            Colormap::evenly_spaced(
                "coolwarm",
                &[
                    Vec3::new(0.230, 0.299, 0.754),
                    Vec3::new(0.552, 0.690, 0.996),
                    Vec3::new(0.866, 0.866, 0.866),
                    Vec3::new(0.956, 0.604, 0.486),
                    Vec3::new(0.706, 0.016, 0.150),
                ],
            ),
            Colormap::evenly_spaced(
                "rainbow",
                &[
                    Vec3::new(0.5, 0.0, 1.0),
                    Vec3::new(0.0, 0.0, 1.0),
                    Vec3::new(0.0, 1.0, 1.0),
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                ],
            ),
        ];

        for preset in presets {
            match preset {
                Ok(colormap) => self.register(colormap),
                Err(e) => log::error!("built-in colormap rejected: {e}"),
            }
        }
    }

    /// Registers a colormap, replacing any with the same name.
    pub fn register(&mut self, colormap: Colormap) {
        self.colormaps.insert(colormap.name.clone(), colormap);
    }

    /// Gets a colormap by name.
    pub fn get(&self, name: &str) -> Option<&Colormap> {
        self.colormaps.get(name)
    }

    /// Gets a colormap by name or reports which one is missing.
    pub fn require(&self, name: &str) -> Result<&Colormap> {
        self.get(name)
            .ok_or_else(|| HeatmapError::ColormapNotFound(name.to_string()))
    }

    /// Returns all colormap names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colormaps.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn black_to_white() -> Colormap {
        Colormap::new(
            "bw",
            vec![
                ColorStop::new(0.0, Vec4::new(0.0, 0.0, 0.0, 1.0)),
                ColorStop::new(1.0, Vec4::ONE),
            ],
        )
        .unwrap()
    }

    fn luminance(c: Vec4) -> f32 {
        0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
    }

    #[test]
    fn test_empty_colormap_rejected() {
        let err = Colormap::new("none", Vec::new()).unwrap_err();
        assert!(matches!(err, HeatmapError::InvalidColormap(_)));
    }

    #[test]
    fn test_out_of_range_stop_rejected() {
        let err = Colormap::new("bad", vec![ColorStop::new(1.5, Vec4::ONE)]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_stops_sorted() {
        let cm = Colormap::new(
            "unsorted",
            vec![
                ColorStop::new(1.0, Vec4::ONE),
                ColorStop::new(0.0, Vec4::ZERO),
            ],
        )
        .unwrap();
        assert_eq!(cm.stops()[0].position, 0.0);
        assert_eq!(cm.evaluate(0.5), Vec4::splat(0.5));
    }

    #[test]
    fn test_evaluate_holds_end_colors() {
        let cm = Colormap::new(
            "inner",
            vec![
                ColorStop::new(0.25, Vec4::new(1.0, 0.0, 0.0, 1.0)),
                ColorStop::new(0.75, Vec4::new(0.0, 0.0, 1.0, 1.0)),
            ],
        )
        .unwrap();
        assert_eq!(cm.evaluate(0.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(cm.evaluate(1.0), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(cm.evaluate(-3.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        let mid = cm.evaluate(0.5);
        assert!((mid - Vec4::new(0.5, 0.0, 0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_fixed_mode_steps() {
        let cm = Colormap::with_mode(
            "steps",
            vec![
                ColorStop::new(0.0, Vec4::ZERO),
                ColorStop::new(0.5, Vec4::splat(0.5)),
                ColorStop::new(1.0, Vec4::ONE),
            ],
            GradientMode::Fixed,
        )
        .unwrap();
        assert_eq!(cm.evaluate(0.1), Vec4::splat(0.5));
        assert_eq!(cm.evaluate(0.6), Vec4::ONE);
    }

    #[test]
    fn test_two_entry_lut_is_exact() {
        let lut = ColormapLut::sample(&black_to_white(), 2).unwrap();
        assert_eq!(
            lut.colors(),
            &[Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::ONE]
        );
    }

    #[test]
    fn test_single_entry_lut_uses_start() {
        let lut = ColormapLut::sample(&black_to_white(), 1).unwrap();
        assert_eq!(lut.colors(), &[Vec4::new(0.0, 0.0, 0.0, 1.0)]);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(
            ColormapLut::sample(&black_to_white(), 0),
            Err(HeatmapError::InvalidColormapResolution)
        ));
    }

    #[test]
    fn test_default_lut_luminance_increases() {
        let lut = ColormapLut::sample_default(&black_to_white()).unwrap();
        assert_eq!(lut.len(), COLORMAP_RESOLUTION);
        for pair in lut.colors().windows(2) {
            assert!(luminance(pair[1]) > luminance(pair[0]));
        }
    }

    #[test]
    fn test_rgba8_packing() {
        let lut = ColormapLut::sample(&black_to_white(), 2).unwrap();
        assert_eq!(lut.to_rgba8(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"name":"x","stops":[{"position":1.0,"color":[1,1,1,1]},{"position":0.0,"color":[0,0,0,1]}]}"#;
        let cm: Colormap = serde_json::from_str(json).unwrap();
        assert_eq!(cm.mode(), GradientMode::Blend);
        assert_eq!(cm.stops()[0].position, 0.0);

        let empty = r#"{"name":"x","stops":[]}"#;
        assert!(serde_json::from_str::<Colormap>(empty).is_err());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = ColormapRegistry::new();
        assert!(registry.get(ColormapRegistry::DEFAULT).is_some());
        assert!(registry.get("viridis").is_some());
        assert!(matches!(
            registry.require("nope"),
            Err(HeatmapError::ColormapNotFound(_))
        ));
        assert_eq!(registry.names().count(), 6);
    }

    proptest! {
        #[test]
        fn prop_lut_endpoints_and_order(resolution in 2usize..600) {
            let lut = ColormapLut::sample(&black_to_white(), resolution).unwrap();
            prop_assert_eq!(lut.len(), resolution);
            prop_assert_eq!(lut.colors()[0], Vec4::new(0.0, 0.0, 0.0, 1.0));
            prop_assert_eq!(lut.colors()[resolution - 1], Vec4::ONE);
            for pair in lut.colors().windows(2) {
                prop_assert!(luminance(pair[1]) >= luminance(pair[0]));
            }
        }
    }
}
