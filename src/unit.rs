use rand::Rng;
use rand_distr::{Distribution, Uniform};
use thiserror::Error;

pub fn default_bias() -> f64 {
    1.0
}

/// ```math
/// X \sim U(\text{min}, \text{max})
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRange {
    min: f64,
    max: f64,
}
impl WeightRange {
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidRangeError> {
        // `Uniform` needs a finite width
        if !(max - min).is_finite() || max < min {
            return Err(InvalidRangeError { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<f64> {
        if self.min == self.max {
            return vec![self.min; len];
        }
        let uniform = Uniform::new(self.min, self.max);
        (0..len).map(|_| uniform.sample(rng)).collect()
    }
}
impl Default for WeightRange {
    fn default() -> Self {
        Self {
            min: -0.5,
            max: 0.5,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("Invalid weight range [{min}, {max})")]
pub struct InvalidRangeError {
    pub min: f64,
    pub max: f64,
}

/// A single neuron
///
/// Only the owning layer writes the per-pass scalars.
#[derive(Debug, Clone)]
pub struct Unit {
    weights: Vec<f64>,
    bias: f64,
    /// the output of the last feed-forward pass
    activation: f64,
    /// the activation derivative expressed at `activation`
    activation_derivative: f64,
    /// $\delta$
    propagated_error: f64,
}
impl Unit {
    /// - `range`: `[min, max)` of the initial weights; `[-0.5, 0.5)` if `None`
    /// - `bias`: `1.0` if `None`
    pub fn new(
        weight_count: usize,
        bias: Option<f64>,
        range: Option<(f64, f64)>,
    ) -> Result<Unit, InvalidRangeError> {
        let mut rng = rand::thread_rng();
        Self::new_with_rng(weight_count, bias, range, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        weight_count: usize,
        bias: Option<f64>,
        range: Option<(f64, f64)>,
        rng: &mut R,
    ) -> Result<Unit, InvalidRangeError> {
        let range = match range {
            Some((min, max)) => WeightRange::new(min, max)?,
            None => WeightRange::default(),
        };
        Ok(Self::with_params(
            range.sample(weight_count, rng),
            bias.unwrap_or_else(default_bias),
        ))
    }

    pub fn with_params(weights: Vec<f64>, bias: f64) -> Unit {
        Self {
            weights,
            bias,
            activation: 0.,
            activation_derivative: 0.,
            propagated_error: 0.,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }
    pub fn bias(&self) -> f64 {
        self.bias
    }
    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }
    pub fn activation(&self) -> f64 {
        self.activation
    }
    pub fn activation_derivative(&self) -> f64 {
        self.activation_derivative
    }
    pub fn propagated_error(&self) -> f64 {
        self.propagated_error
    }

    pub(crate) fn set_activation(&mut self, activation: f64, derivative: f64) {
        self.activation = activation;
        self.activation_derivative = derivative;
    }
    pub(crate) fn set_propagated_error(&mut self, propagated_error: f64) {
        self.propagated_error = propagated_error;
    }
    pub(crate) fn weights_and_bias_mut(&mut self) -> (&mut [f64], &mut f64) {
        (&mut self.weights, &mut self.bias)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn default_range_and_bias() {
        let mut rng = StdRng::seed_from_u64(0);
        let unit = Unit::new_with_rng(64, None, None, &mut rng).unwrap();
        assert_eq!(unit.weights().len(), 64);
        assert!(unit.weights().iter().all(|w| (-0.5..0.5).contains(w)));
        assert_eq!(unit.bias(), 1.0);
    }

    #[test]
    fn custom_range() {
        let unit = Unit::new(128, Some(-3.0), Some((2.0, 2.5))).unwrap();
        assert!(unit.weights().iter().all(|w| (2.0..2.5).contains(w)));
        assert_eq!(unit.bias(), -3.0);
    }

    #[test]
    fn zero_weights() {
        let unit = Unit::new(0, None, None).unwrap();
        assert!(unit.weights().is_empty());
    }

    #[test]
    fn degenerate_range() {
        let unit = Unit::new(3, None, Some((0.25, 0.25))).unwrap();
        assert_eq!(unit.weights(), &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn invalid_range() {
        let err = Unit::new(3, None, Some((1.0, -1.0))).unwrap_err();
        assert_eq!(err, InvalidRangeError { min: 1.0, max: -1.0 });
        assert!(WeightRange::new(f64::NAN, 1.0).is_err());
        assert!(WeightRange::new(0.0, f64::INFINITY).is_err());
        assert!(WeightRange::new(-f64::MAX, f64::MAX).is_err());
        assert!(Unit::new(2, None, Some((-f64::MAX, f64::MAX))).is_err());
        assert!(WeightRange::new(-f64::MAX / 2., f64::MAX / 2.).is_ok());
    }
}
