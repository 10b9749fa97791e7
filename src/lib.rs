pub mod layers;
pub mod network;
pub mod sample;
#[cfg(test)]
mod tests;
pub mod unit;

pub use layers::{
    activation::{Activation, ActivationFunctions, UnknownActivationError},
    dense::{Layer, LayerConfig, ShapeMismatchError},
};
pub use network::{AccurateFnParams, Network, TrainConfig, TrainError, TrainReport};
pub use sample::TrainSample;
pub use unit::{InvalidRangeError, Unit, WeightRange};
