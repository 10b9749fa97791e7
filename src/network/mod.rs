use tracing::debug;

use crate::{
    layers::dense::{Layer, ShapeMismatchError},
    sample::TrainSample,
};

pub mod train;

pub use train::{TrainConfig, TrainError, TrainReport};

const _: fn() = || {
    fn assert_send<T: Sync + Send + 'static>() {}
    assert_send::<Network>();
};

/// Layers in forward order
///
/// Layer $i$ reads the activations of layer $i - 1$; layer $0$ reads the input pattern.
#[derive(Debug, Clone, Default)]
pub struct Network {
    layers: Vec<Layer>,
}
impl Network {
    pub fn new() -> Network {
        Self::default()
    }

    /// Shapes are checked on [`Self::feed_forward`] and [`Self::train`], not here
    pub fn add_layer(&mut self, layer: Layer) {
        debug!(
            index = self.layers.len(),
            inputs = layer.inputs(),
            units = layer.len(),
            "add layer"
        );
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }
    pub fn output_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }
    pub fn input_width(&self) -> Option<usize> {
        self.layers.first().map(Layer::inputs)
    }

    /// The activations of the output layer after the last feed-forward pass
    pub fn outputs(&self) -> Vec<f64> {
        self.output_layer()
            .map(|layer| layer.activations().collect())
            .unwrap_or_default()
    }

    /// Check that every layer reads as many inputs as its preceding layer has units
    pub fn check_shape(&self) -> Result<(), ShapeMismatchError> {
        if self.layers.is_empty() {
            return Err(ShapeMismatchError::NoLayers);
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            let (preceding, this) = (&pair[0], &pair[1]);
            if this.inputs() != preceding.len() {
                return Err(ShapeMismatchError::LayerInputs {
                    layer: i + 1,
                    expected: this.inputs(),
                    actual: preceding.len(),
                });
            }
        }
        Ok(())
    }

    fn check_pattern(&self, pattern: &[f64]) -> Result<(), ShapeMismatchError> {
        self.check_shape()?;
        let expected = self.input_width().unwrap_or_default();
        if pattern.len() != expected {
            return Err(ShapeMismatchError::Pattern {
                expected,
                actual: pattern.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_sample(&self, sample: &TrainSample) -> Result<(), ShapeMismatchError> {
        self.check_pattern(sample.input())?;
        let expected = self.output_layer().map(Layer::len).unwrap_or_default();
        if sample.target().len() != expected {
            return Err(ShapeMismatchError::Target {
                expected,
                actual: sample.target().len(),
            });
        }
        Ok(())
    }

    /// Results are read from [`Self::outputs`] or [`Self::output_layer`]
    pub fn feed_forward(&mut self, pattern: &[f64]) -> Result<(), ShapeMismatchError> {
        self.check_pattern(pattern)?;
        self.forward(pattern)
    }

    fn forward(&mut self, pattern: &[f64]) -> Result<(), ShapeMismatchError> {
        let Some(first) = self.layers.first_mut() else {
            return Err(ShapeMismatchError::NoLayers);
        };
        first.feed_forward_from_input(pattern)?;
        for i in 1..self.layers.len() {
            let (preceding, rest) = self.layers.split_at_mut(i);
            rest[0].feed_forward(&preceding[i - 1])?;
        }
        Ok(())
    }

    /// Return the outputs of the output layer
    pub fn evaluate(&mut self, pattern: &[f64]) -> Result<Vec<f64>, ShapeMismatchError> {
        self.feed_forward(pattern)?;
        Ok(self.outputs())
    }

    /// ```math
    /// E = \frac{1}{2} \sum_n (a_n - t_n)^2
    /// ```
    ///
    /// The weights are left untouched.
    pub fn compute_error(&mut self, sample: &TrainSample) -> Result<f64, ShapeMismatchError> {
        self.check_sample(sample)?;
        self.forward(sample.input())?;
        let sum_squared_error: f64 = self
            .outputs()
            .into_iter()
            .zip(sample.target().iter().copied())
            .map(|(a, t)| (a - t).powi(2))
            .sum();
        Ok(0.5 * sum_squared_error)
    }

    /// The mean of [`Self::compute_error`] over `samples`
    pub fn compute_avg_error(&mut self, samples: &[TrainSample]) -> Result<f64, TrainError> {
        if samples.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let mut avg = 0.;
        for sample in samples {
            avg += self.compute_error(sample)? / samples.len() as f64;
        }
        Ok(avg)
    }

    /// Return the fraction of `samples` judged accurate
    pub fn accuracy(
        &mut self,
        samples: &[TrainSample],
        accurate: impl Fn(AccurateFnParams<'_>) -> bool,
    ) -> Result<f64, TrainError> {
        if samples.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let mut accurate_count = 0;
        for sample in samples {
            self.check_sample(sample)?;
            let outputs = self.evaluate(sample.input())?;
            let params = AccurateFnParams {
                inputs: sample.input(),
                targets: sample.target(),
                outputs,
            };
            if accurate(params) {
                accurate_count += 1;
            }
        }
        Ok(accurate_count as f64 / samples.len() as f64)
    }
}

#[derive(Debug, Clone)]
pub struct AccurateFnParams<'a> {
    pub inputs: &'a [f64],
    pub targets: &'a [f64],
    pub outputs: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crate::{
        layers::{activation::Activation, dense::LayerConfig},
        unit::Unit,
    };

    use super::*;

    fn layer(inputs: usize, depth: usize) -> Layer {
        let depth = NonZeroUsize::new(depth).unwrap();
        Layer::new(LayerConfig::new(inputs, depth, Activation::Sigmoid)).unwrap()
    }

    #[test]
    fn empty_network() {
        let mut network = Network::new();
        assert_eq!(
            network.feed_forward(&[1.0]).unwrap_err(),
            ShapeMismatchError::NoLayers
        );
        assert!(network.outputs().is_empty());
    }

    #[test]
    fn layer_chaining() {
        let mut network = Network::new();
        network.add_layer(layer(2, 3));
        network.add_layer(layer(4, 1));
        assert_eq!(
            network.check_shape().unwrap_err(),
            ShapeMismatchError::LayerInputs {
                layer: 1,
                expected: 4,
                actual: 3
            }
        );
        assert!(network.feed_forward(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn pattern_and_target_width() {
        let mut network = Network::new();
        network.add_layer(layer(2, 3));
        network.add_layer(layer(3, 1));
        assert_eq!(network.input_width(), Some(2));
        assert_eq!(
            network.feed_forward(&[0.0, 1.0, 2.0]).unwrap_err(),
            ShapeMismatchError::Pattern {
                expected: 2,
                actual: 3
            }
        );
        let sample = TrainSample::new(vec![0.0, 1.0], vec![1.0, 0.0]);
        assert_eq!(
            network.compute_error(&sample).unwrap_err(),
            ShapeMismatchError::Target {
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(network.evaluate(&[0.0, 1.0]).unwrap().len(), 1);
    }

    #[test]
    fn compute_error() {
        let mut network = Network::new();
        network.add_layer(
            Layer::from_units(vec![Unit::with_params(vec![0.0], 0.0)], Activation::Sigmoid)
                .unwrap(),
        );
        let sample = TrainSample::new(vec![3.0], vec![1.0]);
        assert_eq!(network.compute_error(&sample).unwrap(), 0.5 * 0.25);
        let samples = [sample, TrainSample::new(vec![3.0], vec![0.5])];
        assert_eq!(network.compute_avg_error(&samples).unwrap(), 0.0625);
        assert!(matches!(
            network.compute_avg_error(&[]),
            Err(TrainError::EmptyDataset)
        ));
    }
}
