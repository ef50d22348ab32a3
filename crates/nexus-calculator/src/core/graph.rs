//! Function sampling for graphing mode

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::backend::CompiledExpression;
use crate::core::Value;

/// Invalid sampling range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    /// Step must be positive and finite
    #[error("Graph step must be positive, got {0}")]
    InvalidStep(f64),
    /// End must not precede start
    #[error("Graph range is empty: start {start} is after end {end}")]
    Empty {
        /// Range start
        start: f64,
        /// Range end
        end: f64,
    },
}

/// Sampling range for the x axis, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphRange {
    /// First x value
    pub start: f64,
    /// Last x value
    pub end: f64,
    /// Distance between samples
    pub step: f64,
}

impl Default for GraphRange {
    fn default() -> Self {
        Self {
            start: -10.0,
            end: 10.0,
            step: 0.5,
        }
    }
}

impl GraphRange {
    /// Checks that the range yields at least one sample
    pub fn validate(&self) -> Result<(), RangeError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(RangeError::InvalidStep(self.step));
        }
        if !(self.start.is_finite() && self.end.is_finite()) || self.start > self.end {
            return Err(RangeError::Empty {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of samples in the range
    #[must_use]
    pub fn sample_count(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        // Tolerance keeps 20 / 0.5 from landing just below 40
        ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1
    }

    /// Sample positions, computed as `start + i * step` so error does not accumulate
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count()).map(move |i| self.start + i as f64 * self.step)
    }
}

/// One plotted point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
}

/// The plotted function
///
/// Regenerated in full for every graph request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotSeries {
    points: Vec<PlotPoint>,
    visible: bool,
}

impl PlotSeries {
    /// Creates an empty, hidden series
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples `compiled` over `range`, keeping finite numeric results, and shows the series
    pub fn generate<C: CompiledExpression>(&mut self, compiled: &C, range: &GraphRange) {
        self.points = range
            .samples()
            .filter_map(|x| match compiled.evaluate_at(x) {
                Ok(Value::Number(y)) if y.is_finite() => Some(PlotPoint { x, y }),
                _ => None,
            })
            .collect();
        self.visible = true;
    }

    /// Removes all points and hides the series
    pub fn clear(&mut self) {
        self.points.clear();
        self.visible = false;
    }

    /// Returns the points in x order
    #[must_use]
    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    /// Returns true if the series should be drawn
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `(x_min, x_max, y_min, y_max)`, or None when empty
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.x, first.y, first.y),
            |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
        ))
    }

    /// Points as `(x, y)` tuples, the shape chart widgets take
    #[must_use]
    pub fn as_tuples(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }

    /// Serializes the points to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::core::backend::{MathBackend, NativeBackend};

    // ===== GraphRange tests =====

    #[test]
    fn test_default_range_has_41_samples() {
        let range = GraphRange::default();
        assert_eq!(range.sample_count(), 41);
        let xs: Vec<f64> = range.samples().collect();
        assert_eq!(xs.first(), Some(&-10.0));
        assert_eq!(xs[20], 0.0);
        assert_eq!(xs.last(), Some(&10.0));
    }

    #[test]
    fn test_inexact_step_reaches_end() {
        let range = GraphRange {
            start: 0.0,
            end: 1.0,
            step: 0.1,
        };
        assert_eq!(range.sample_count(), 11);
    }

    #[test]
    fn test_single_point_range() {
        let range = GraphRange {
            start: 2.0,
            end: 2.0,
            step: 1.0,
        };
        assert_eq!(range.samples().collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn test_invalid_ranges() {
        let bad_step = GraphRange {
            step: 0.0,
            ..GraphRange::default()
        };
        assert_eq!(bad_step.validate(), Err(RangeError::InvalidStep(0.0)));
        assert_eq!(bad_step.sample_count(), 0);

        let reversed = GraphRange {
            start: 5.0,
            end: -5.0,
            step: 1.0,
        };
        assert!(matches!(reversed.validate(), Err(RangeError::Empty { .. })));
    }

    // ===== PlotSeries tests =====

    #[test]
    fn test_generate_parabola() {
        let compiled = NativeBackend::new().compile("x^2", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(&compiled, &GraphRange::default());

        assert!(series.is_visible());
        assert_eq!(series.points().len(), 41);
        for p in series.points() {
            assert_eq!(p.y, p.x * p.x);
        }
    }

    #[test]
    fn test_generate_drops_non_finite_samples() {
        let compiled = NativeBackend::new().compile("1 / x", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(&compiled, &GraphRange::default());
        assert_eq!(series.points().len(), 40);
        assert!(series.points().iter().all(|p| p.x != 0.0));
    }

    #[test]
    fn test_generate_drops_failed_samples() {
        let compiled = NativeBackend::new().compile("sqrt(x)", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(&compiled, &GraphRange::default());
        assert_eq!(series.points().len(), 21);
    }

    #[test]
    fn test_generate_replaces_previous_points() {
        let backend = NativeBackend::new();
        let mut series = PlotSeries::new();
        series.generate(&backend.compile("x", "x").unwrap(), &GraphRange::default());
        series.generate(
            &backend.compile("sqrt(x)", "x").unwrap(),
            &GraphRange::default(),
        );
        assert_eq!(series.points().len(), 21);
    }

    #[test]
    fn test_clear_hides() {
        let compiled = NativeBackend::new().compile("x", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(&compiled, &GraphRange::default());
        series.clear();
        assert!(!series.is_visible());
        assert!(series.points().is_empty());
        assert_eq!(series.bounds(), None);
    }

    #[test]
    fn test_bounds_and_tuples() {
        let compiled = NativeBackend::new().compile("x^2", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(&compiled, &GraphRange::default());
        assert_eq!(series.bounds(), Some((-10.0, 10.0, 0.0, 100.0)));
        assert_eq!(series.as_tuples()[0], (-10.0, 100.0));
    }

    #[test]
    fn test_points_json() {
        let compiled = NativeBackend::new().compile("2x", "x").unwrap();
        let mut series = PlotSeries::new();
        series.generate(
            &compiled,
            &GraphRange {
                start: 0.0,
                end: 1.0,
                step: 1.0,
            },
        );
        assert_eq!(
            series.to_json().unwrap(),
            r#"[{"x":0.0,"y":0.0},{"x":1.0,"y":2.0}]"#
        );
    }
}
