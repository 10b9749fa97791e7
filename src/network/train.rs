use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use strict_num::FiniteF64;
use thiserror::Error;
use tracing::{info, info_span, trace, warn};

use crate::{layers::dense::ShapeMismatchError, sample::TrainSample};

use super::Network;

#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// learning rate
    pub step_size: f64,
    /// training stops once the mean squared error of an epoch is at most this
    pub target_error: f64,
    /// unbounded if `None`
    pub max_epochs: Option<NonZeroUsize>,
    /// epochs between progress reports; none if `None`
    pub report_interval: Option<NonZeroUsize>,
}
impl TrainConfig {
    pub fn new(step_size: f64, target_error: f64) -> Self {
        Self {
            step_size,
            target_error,
            max_epochs: None,
            report_interval: NonZeroUsize::new(1_000),
        }
    }

    pub fn with_max_epochs(mut self, max_epochs: NonZeroUsize) -> Self {
        self.max_epochs = Some(max_epochs);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub epochs: usize,
    /// mean squared error of the last epoch
    pub error: f64,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Empty dataset")]
    EmptyDataset,
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(#[from] ShapeMismatchError),
    #[error("Error {error} still above the target after {epochs} epochs")]
    NonConvergence { epochs: usize, error: f64 },
    #[error("Error is not finite at epoch {epoch}")]
    NonFiniteError { epoch: usize },
}

impl Network {
    /// Return the number of epochs executed
    ///
    /// Loops until the mean squared error reaches `target_error`.
    ///
    /// `step_size`: learning rate
    pub fn train(
        &mut self,
        samples: &[TrainSample],
        step_size: f64,
        target_error: f64,
    ) -> Result<usize, TrainError> {
        let config = TrainConfig::new(step_size, target_error);
        self.train_with(samples, &config).map(|report| report.epochs)
    }

    pub fn train_with(
        &mut self,
        samples: &[TrainSample],
        config: &TrainConfig,
    ) -> Result<TrainReport, TrainError> {
        if samples.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        for sample in samples {
            self.check_sample(sample)?;
        }
        let span = info_span!(
            "train",
            samples = samples.len(),
            step_size = config.step_size,
            target_error = config.target_error
        );
        let _enter = span.enter();

        let mut progress_printer = ProgressPrinter::new(config.report_interval);
        let mut epochs = 0;
        loop {
            let mut global_error = 0.;
            for sample in samples {
                global_error += 0.5 * self.backpropagate(sample, config.step_size)?;
            }
            let error = global_error / samples.len() as f64;
            epochs += 1;
            trace!(epoch = epochs, error);

            if FiniteF64::new(error).is_none() {
                warn!(epoch = epochs, error, "error is not finite");
                return Err(TrainError::NonFiniteError { epoch: epochs });
            }
            progress_printer.print_progress(epochs, error);
            if error <= config.target_error {
                info!(epochs, error, "converged");
                return Ok(TrainReport { epochs, error });
            }
            if let Some(max_epochs) = config.max_epochs {
                if max_epochs.get() <= epochs {
                    warn!(epochs, error, "epoch limit reached");
                    return Err(TrainError::NonConvergence { epochs, error });
                }
            }
        }
    }

    /// Feed `sample` forward, propagate its error back and update every weight once
    ///
    /// Return the sum of squared errors of `sample` before the update.
    pub fn train_step(
        &mut self,
        sample: &TrainSample,
        step_size: f64,
    ) -> Result<f64, ShapeMismatchError> {
        self.check_sample(sample)?;
        self.backpropagate(sample, step_size)
    }

    fn backpropagate(
        &mut self,
        sample: &TrainSample,
        step_size: f64,
    ) -> Result<f64, ShapeMismatchError> {
        self.forward(sample.input())?;
        let Some(output) = self.layers.last_mut() else {
            return Err(ShapeMismatchError::NoLayers);
        };
        let sum_squared_error = output.backpropagate_output_error(sample.target())?;

        // Every error term must be derived from the weights before this step
        for i in (0..self.layers.len() - 1).rev() {
            let (this, following) = self.layers.split_at_mut(i + 1);
            this[i].backpropagate_error(&following[0])?;
        }

        let Some((first, _)) = self.layers.split_first_mut() else {
            return Err(ShapeMismatchError::NoLayers);
        };
        first.update_weights_from_input(sample.input(), step_size)?;
        for i in 1..self.layers.len() {
            let (preceding, rest) = self.layers.split_at_mut(i);
            rest[0].update_weights(&preceding[i - 1], step_size)?;
        }
        Ok(sum_squared_error)
    }
}

struct ProgressPrinter {
    interval: Option<NonZeroUsize>,
    now: Instant,
}
impl ProgressPrinter {
    pub fn new(interval: Option<NonZeroUsize>) -> Self {
        Self {
            interval,
            now: Instant::now(),
        }
    }

    fn print_progress(&mut self, epoch: usize, error: f64) {
        let Some(interval) = self.interval else {
            return;
        };
        if epoch % interval.get() != 0 {
            return;
        }
        let elapsed = human_duration(self.now.elapsed());
        self.now = Instant::now();
        info!(epoch, error, %elapsed, "progress");
    }
}

fn human_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();
    let scales = [
        (60. * 60., "h"),
        (60., "min"),
        (1., "s"),
        (1e-3, "ms"),
        (1e-6, "us"),
    ];
    for (scale, unit) in scales {
        let value = seconds / scale;
        if 1. < value {
            return format!("{value:.2} {unit}");
        }
    }
    let nanoseconds = seconds * 1e9;
    format!("{nanoseconds:.2} ns")
}
