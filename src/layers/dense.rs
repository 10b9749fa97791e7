use std::num::NonZeroUsize;

use rand::Rng;
use thiserror::Error;

use crate::unit::{InvalidRangeError, Unit};

use super::activation::ActivationFunctions;

#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// the unit count of the preceding layer, or the pattern length for the first layer
    pub inputs: usize,
    pub depth: NonZeroUsize,
    pub activation: ActivationFunctions,
    /// `[min, max)`; `[-0.5, 0.5)` if `None`
    pub weight_range: Option<(f64, f64)>,
    /// `1.0` if `None`
    pub bias: Option<f64>,
}
impl LayerConfig {
    pub fn new(
        inputs: usize,
        depth: NonZeroUsize,
        activation: impl Into<ActivationFunctions>,
    ) -> Self {
        Self {
            inputs,
            depth,
            activation: activation.into(),
            weight_range: None,
            bias: None,
        }
    }
}

/// A fully-connected layer
///
/// ```math
/// a_n = f(\sum_i w_{n,i} x_i + b_n)
/// ```
#[derive(Debug, Clone)]
pub struct Layer {
    units: Vec<Unit>,
    inputs: usize,
    activation: ActivationFunctions,
}
impl Layer {
    fn check_rep(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for unit in &self.units {
            assert_eq!(unit.weights().len(), self.inputs);
        }
    }

    pub fn new(config: LayerConfig) -> Result<Layer, InvalidRangeError> {
        let mut rng = rand::thread_rng();
        Self::new_with_rng(config, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        config: LayerConfig,
        rng: &mut R,
    ) -> Result<Layer, InvalidRangeError> {
        let units = (0..config.depth.get())
            .map(|_| Unit::new_with_rng(config.inputs, config.bias, config.weight_range, rng))
            .collect::<Result<Vec<Unit>, _>>()?;
        let this = Self {
            units,
            inputs: config.inputs,
            activation: config.activation,
        };
        this.check_rep();
        Ok(this)
    }

    /// Build a layer from units with fixed parameters
    pub fn from_units(
        units: Vec<Unit>,
        activation: impl Into<ActivationFunctions>,
    ) -> Result<Layer, ShapeMismatchError> {
        let Some(first) = units.first() else {
            return Err(ShapeMismatchError::NoUnits);
        };
        let inputs = first.weights().len();
        if units.iter().any(|unit| unit.weights().len() != inputs) {
            return Err(ShapeMismatchError::UnequalWeights);
        }
        let this = Self {
            units,
            inputs,
            activation: activation.into(),
        };
        this.check_rep();
        Ok(this)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }
    /// The weights and bias of unit `n`
    ///
    /// The weight slice keeps the layer's input width.
    pub fn params_mut(&mut self, n: usize) -> Option<(&mut [f64], &mut f64)> {
        self.units.get_mut(n).map(Unit::weights_and_bias_mut)
    }
    pub fn len(&self) -> usize {
        self.units.len()
    }
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
    /// Input width
    pub fn inputs(&self) -> usize {
        self.inputs
    }
    pub fn activation_functions(&self) -> &ActivationFunctions {
        &self.activation
    }
    pub fn activations(&self) -> impl Iterator<Item = f64> + '_ {
        self.units.iter().map(Unit::activation)
    }

    pub fn feed_forward(&mut self, preceding: &Layer) -> Result<(), ShapeMismatchError> {
        if preceding.len() != self.inputs {
            return Err(ShapeMismatchError::PrecedingLayer {
                expected: self.inputs,
                actual: preceding.len(),
            });
        }
        self.activate(|i| preceding.units[i].activation());
        Ok(())
    }

    pub fn feed_forward_from_input(&mut self, pattern: &[f64]) -> Result<(), ShapeMismatchError> {
        if pattern.len() != self.inputs {
            return Err(ShapeMismatchError::Pattern {
                expected: self.inputs,
                actual: pattern.len(),
            });
        }
        self.activate(|i| pattern[i]);
        Ok(())
    }

    fn activate(&mut self, input: impl Fn(usize) -> f64) {
        let activation = self.activation;
        for unit in &mut self.units {
            let sum: f64 = unit
                .weights()
                .iter()
                .enumerate()
                .map(|(i, w)| input(i) * w)
                .sum();
            let a = activation.activate(sum + unit.bias());
            unit.set_activation(a, activation.derivative(a));
        }
    }

    /// ```math
    /// \delta_n = f'(a_n) \sum_k w_{k,n} \delta_k
    /// ```
    ///
    /// - $k$: the units of `following`
    pub fn backpropagate_error(&mut self, following: &Layer) -> Result<(), ShapeMismatchError> {
        if following.inputs != self.len() {
            return Err(ShapeMismatchError::FollowingLayer {
                expected: self.len(),
                actual: following.inputs,
            });
        }
        for (n, unit) in self.units.iter_mut().enumerate() {
            let sum: f64 = following
                .units
                .iter()
                .map(|k| k.weights()[n] * k.propagated_error())
                .sum();
            unit.set_propagated_error(sum * unit.activation_derivative());
        }
        Ok(())
    }

    /// Return the sum of squared errors of the presented pattern
    ///
    /// ```math
    /// \delta_n = (a_n - t_n) f'(a_n)
    /// ```
    pub fn backpropagate_output_error(
        &mut self,
        targets: &[f64],
    ) -> Result<f64, ShapeMismatchError> {
        if targets.len() != self.len() {
            return Err(ShapeMismatchError::Target {
                expected: self.len(),
                actual: targets.len(),
            });
        }
        let mut sum_squared_error = 0.;
        for (unit, target) in self.units.iter_mut().zip(targets.iter().copied()) {
            let output_error = unit.activation() - target;
            unit.set_propagated_error(output_error * unit.activation_derivative());
            sum_squared_error += output_error.powi(2);
        }
        Ok(sum_squared_error)
    }

    /// `step_size`: learning rate
    pub fn update_weights(
        &mut self,
        preceding: &Layer,
        step_size: f64,
    ) -> Result<(), ShapeMismatchError> {
        if preceding.len() != self.inputs {
            return Err(ShapeMismatchError::PrecedingLayer {
                expected: self.inputs,
                actual: preceding.len(),
            });
        }
        self.descend(|i| preceding.units[i].activation(), step_size);
        Ok(())
    }

    /// `step_size`: learning rate
    pub fn update_weights_from_input(
        &mut self,
        pattern: &[f64],
        step_size: f64,
    ) -> Result<(), ShapeMismatchError> {
        if pattern.len() != self.inputs {
            return Err(ShapeMismatchError::Pattern {
                expected: self.inputs,
                actual: pattern.len(),
            });
        }
        self.descend(|i| pattern[i], step_size);
        Ok(())
    }

    /// ```math
    /// w_{n,i} \leftarrow w_{n,i} - \eta x_i \delta_n
    /// ```
    fn descend(&mut self, input: impl Fn(usize) -> f64, step_size: f64) {
        for unit in &mut self.units {
            let delta = unit.propagated_error();
            let (weights, bias) = unit.weights_and_bias_mut();
            for (i, w) in weights.iter_mut().enumerate() {
                *w -= step_size * input(i) * delta;
            }
            *bias -= step_size * delta;
        }
        self.check_rep();
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeMismatchError {
    #[error("Network has no layers")]
    NoLayers,
    #[error("Layer has no units")]
    NoUnits,
    #[error("Units of a layer have weight vectors of different lengths")]
    UnequalWeights,
    #[error("Layer {layer} expects {expected} inputs but the preceding layer has {actual} units")]
    LayerInputs {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Layer expects {expected} inputs but the preceding layer has {actual} units")]
    PrecedingLayer { expected: usize, actual: usize },
    #[error("Layer has {expected} units but the following layer expects {actual} inputs")]
    FollowingLayer { expected: usize, actual: usize },
    #[error("Pattern length {actual} does not match input width {expected}")]
    Pattern { expected: usize, actual: usize },
    #[error("Target length {actual} does not match output width {expected}")]
    Target { expected: usize, actual: usize },
}
