//! Search space definitions, random sampling and the `[0, 1]` encoding used
//! by surrogate models.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::SpaceError;

/// Sampling prior of a real dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Prior {
    #[default]
    Uniform,
    /// Sampled uniformly in log-space then exponentiated.
    LogUniform,
}

/// A single dimension of the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Human-readable name (e.g. "learning_rate").
    pub name: String,
    pub kind: DimensionKind,
}

/// Describes the values a dimension can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionKind {
    /// Continuous range [low, high].
    Real { low: f64, high: f64, prior: Prior },
    /// Integer range [low, high] inclusive.
    Integer { low: i64, high: i64 },
    /// Unordered categorical choices.
    Categorical { categories: Vec<serde_json::Value> },
}

/// One coordinate of a candidate point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Untagged: integral JSON numbers read back as `Int`, others as `Float`.
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
}

impl ParameterValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Json(v) => v.as_f64(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// A candidate point: one value per search dimension, in dimension order.
pub type Point = Vec<ParameterValue>;

/// The full search space: an ordered list of dimensions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    pub dimensions: Vec<Dimension>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self {
            dimensions: Vec::new(),
        }
    }

    pub fn add_real(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            kind: DimensionKind::Real {
                low,
                high,
                prior: Prior::Uniform,
            },
        });
        self
    }

    pub fn add_log_uniform(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            kind: DimensionKind::Real {
                low,
                high,
                prior: Prior::LogUniform,
            },
        });
        self
    }

    pub fn add_int(mut self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            kind: DimensionKind::Integer { low, high },
        });
        self
    }

    pub fn add_choice(mut self, name: impl Into<String>, categories: Vec<serde_json::Value>) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            kind: DimensionKind::Categorical { categories },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Check that every dimension describes a non-empty set of values.
    pub fn validate(&self) -> Result<(), SpaceError> {
        if self.dimensions.is_empty() {
            return Err(SpaceError::Empty);
        }

        for dim in &self.dimensions {
            match &dim.kind {
                DimensionKind::Real { low, high, prior } => {
                    // The width must be finite too, or uniform sampling overflows.
                    if !(high - low).is_finite() || low >= high {
                        return Err(SpaceError::InvalidBounds {
                            name: dim.name.clone(),
                            low: *low,
                            high: *high,
                        });
                    }
                    if *prior == Prior::LogUniform && *low <= 0.0 {
                        return Err(SpaceError::NonPositiveLogBound {
                            name: dim.name.clone(),
                            low: *low,
                        });
                    }
                }
                DimensionKind::Integer { low, high } => {
                    if low >= high || high.checked_sub(*low).is_none() {
                        return Err(SpaceError::InvalidBounds {
                            name: dim.name.clone(),
                            low: *low as f64,
                            high: *high as f64,
                        });
                    }
                }
                DimensionKind::Categorical { categories } => {
                    if categories.is_empty() {
                        return Err(SpaceError::EmptyCategories {
                            name: dim.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Draw one point uniformly (log-uniformly for log priors).
    ///
    /// Assumes the space has passed [`SearchSpace::validate`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        self.dimensions
            .iter()
            .map(|dim| match &dim.kind {
                DimensionKind::Real {
                    low,
                    high,
                    prior: Prior::Uniform,
                } => ParameterValue::Float(rng.gen_range(*low..=*high)),
                DimensionKind::Real {
                    low,
                    high,
                    prior: Prior::LogUniform,
                } => {
                    let log_val: f64 = rng.gen_range(low.ln()..=high.ln());
                    // exp(ln(high)) can overshoot by an ulp
                    ParameterValue::Float(log_val.exp().clamp(*low, *high))
                }
                DimensionKind::Integer { low, high } => {
                    ParameterValue::Int(rng.gen_range(*low..=*high))
                }
                DimensionKind::Categorical { categories } => {
                    let idx = rng.gen_range(0..categories.len());
                    ParameterValue::Json(categories[idx].clone())
                }
            })
            .collect()
    }

    /// Check that `point` has one in-range value of the right kind per dimension.
    pub fn validate_point(&self, point: &[ParameterValue]) -> Result<(), SpaceError> {
        if point.len() != self.dimensions.len() {
            return Err(SpaceError::DimensionMismatch {
                expected: self.dimensions.len(),
                actual: point.len(),
            });
        }

        for (dim, value) in self.dimensions.iter().zip(point) {
            let in_range = match (&dim.kind, value) {
                (DimensionKind::Real { low, high, .. }, ParameterValue::Float(v)) => {
                    v.is_finite() && v >= low && v <= high
                }
                (DimensionKind::Real { .. }, _) => {
                    return Err(type_mismatch(dim, "float", value));
                }
                (DimensionKind::Integer { low, high }, ParameterValue::Int(v)) => {
                    v >= low && v <= high
                }
                (DimensionKind::Integer { .. }, _) => {
                    return Err(type_mismatch(dim, "integer", value));
                }
                (DimensionKind::Categorical { .. }, _) => category_index(dim, value).is_some(),
            };

            if !in_range {
                return Err(SpaceError::OutOfBounds {
                    name: dim.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Width of the encoded vector produced by [`SearchSpace::transform`].
    pub fn transformed_len(&self) -> usize {
        self.dimensions
            .iter()
            .map(|dim| match &dim.kind {
                DimensionKind::Categorical { categories } => categories.len(),
                _ => 1,
            })
            .sum()
    }

    /// Encode a point into the unit hypercube.
    ///
    /// Numeric dimensions map linearly (in log-space for log priors) onto
    /// `[0, 1]`; categorical dimensions are one-hot encoded.
    pub fn transform(&self, point: &[ParameterValue]) -> Result<Vec<f64>, SpaceError> {
        self.validate_point(point)?;

        let mut encoded = Vec::with_capacity(self.transformed_len());
        for (dim, value) in self.dimensions.iter().zip(point) {
            match &dim.kind {
                DimensionKind::Real { low, high, prior } => {
                    let v = value.as_f64().unwrap_or(*low);
                    let t = match prior {
                        Prior::Uniform => (v - low) / (high - low),
                        Prior::LogUniform => (v.ln() - low.ln()) / (high.ln() - low.ln()),
                    };
                    encoded.push(t.clamp(0.0, 1.0));
                }
                DimensionKind::Integer { low, high } => {
                    let v = value.as_i64().unwrap_or(*low);
                    encoded.push((v - low) as f64 / (high - low) as f64);
                }
                DimensionKind::Categorical { categories } => {
                    let hot = category_index(dim, value);
                    encoded.extend((0..categories.len()).map(|i| {
                        if Some(i) == hot {
                            1.0
                        } else {
                            0.0
                        }
                    }));
                }
            }
        }

        Ok(encoded)
    }
}

fn type_mismatch(dim: &Dimension, expected: &'static str, value: &ParameterValue) -> SpaceError {
    SpaceError::TypeMismatch {
        name: dim.name.clone(),
        expected,
        value: value.to_string(),
    }
}

/// Position of `value` among a categorical dimension's categories.
fn category_index(dim: &Dimension, value: &ParameterValue) -> Option<usize> {
    let DimensionKind::Categorical { categories } = &dim.kind else {
        return None;
    };
    categories.iter().position(|c| match value {
        ParameterValue::Json(v) => c == v,
        ParameterValue::Int(v) => c.as_i64() == Some(*v),
        ParameterValue::Float(v) => c.as_f64() == Some(*v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_space() -> SearchSpace {
        SearchSpace::new()
            .add_int("max_depth", 1, 5)
            .add_log_uniform("learning_rate", 1e-5, 1.0)
            .add_real("subsample", 0.5, 1.0)
            .add_choice(
                "loss",
                vec![serde_json::json!("squared_error"), serde_json::json!("huber")],
            )
    }

    #[test]
    fn search_space_builder_chain() {
        let space = sample_space();
        assert_eq!(space.len(), 4);
        assert!(space.validate().is_ok());
        assert_eq!(space.transformed_len(), 5);
    }

    #[test]
    fn empty_space_is_rejected() {
        assert_eq!(SearchSpace::new().validate(), Err(SpaceError::Empty));
    }

    #[test]
    fn inverted_and_log_bounds_are_rejected() {
        let inverted = SearchSpace::new().add_real("x", 1.0, 0.0);
        assert!(matches!(
            inverted.validate(),
            Err(SpaceError::InvalidBounds { .. })
        ));

        let log_zero = SearchSpace::new().add_log_uniform("lr", 0.0, 1.0);
        assert!(matches!(
            log_zero.validate(),
            Err(SpaceError::NonPositiveLogBound { .. })
        ));

        let infinite = SearchSpace::new().add_real("x", 0.0, f64::INFINITY);
        assert!(matches!(
            infinite.validate(),
            Err(SpaceError::InvalidBounds { .. })
        ));

        let no_choices = SearchSpace::new().add_choice("c", vec![]);
        assert!(matches!(
            no_choices.validate(),
            Err(SpaceError::EmptyCategories { .. })
        ));
    }

    #[test]
    fn overflowing_widths_are_rejected() {
        let wide_real = SearchSpace::new().add_real("x", -1e308, 1e308);
        assert_eq!(
            wide_real.validate(),
            Err(SpaceError::InvalidBounds {
                name: "x".to_string(),
                low: -1e308,
                high: 1e308
            })
        );

        let wide_int = SearchSpace::new().add_int("k", i64::MIN, i64::MAX);
        assert!(matches!(
            wide_int.validate(),
            Err(SpaceError::InvalidBounds { .. })
        ));

        // Widest spans that still fit are accepted and usable.
        let widest = SearchSpace::new()
            .add_real("x", -1e307, 1e307)
            .add_int("k", 0, i64::MAX);
        assert!(widest.validate().is_ok());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let point = widest.sample(&mut rng);
        let encoded = widest.transform(&point).unwrap();
        assert!(encoded.iter().all(|t| (0.0..=1.0).contains(t)));
    }

    #[test]
    fn samples_respect_bounds() {
        let space = sample_space();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..200 {
            let point = space.sample(&mut rng);
            assert!(space.validate_point(&point).is_ok(), "bad point {point:?}");

            let lr = point[1].as_f64().unwrap();
            assert!((1e-5..=1.0).contains(&lr), "lr out of bounds: {lr}");
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let space = sample_space();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);

        let first: Vec<Point> = (0..10).map(|_| space.sample(&mut a)).collect();
        let second: Vec<Point> = (0..10).map(|_| space.sample(&mut b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn validate_point_reports_mismatches() {
        let space = SearchSpace::new().add_int("n", 1, 3).add_real("x", 0.0, 1.0);

        assert_eq!(
            space.validate_point(&[ParameterValue::Int(1)]),
            Err(SpaceError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            space.validate_point(&[ParameterValue::Float(1.0), ParameterValue::Float(0.5)]),
            Err(SpaceError::TypeMismatch { .. })
        ));
        assert!(matches!(
            space.validate_point(&[ParameterValue::Int(4), ParameterValue::Float(0.5)]),
            Err(SpaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn transform_maps_into_unit_cube() {
        let space = sample_space();
        let point = vec![
            ParameterValue::Int(3),
            ParameterValue::Float(1e-3),
            ParameterValue::Float(0.75),
            ParameterValue::Json(serde_json::json!("huber")),
        ];

        let encoded = space.transform(&point).unwrap();
        assert_eq!(encoded.len(), 5);
        assert!((encoded[0] - 0.5).abs() < 1e-12);
        assert!((encoded[1] - 0.4).abs() < 1e-12);
        assert!((encoded[2] - 0.5).abs() < 1e-12);
        assert_eq!(&encoded[3..], &[0.0, 1.0]);
    }

    #[test]
    fn parameter_value_serialization_is_untagged() {
        let point = vec![
            ParameterValue::Int(3),
            ParameterValue::Float(0.5),
            ParameterValue::Json(serde_json::json!("huber")),
        ];
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"[3,0.5,"huber"]"#);

        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
