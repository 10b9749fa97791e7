use std::num::NonZeroUsize;

use anyhow::{bail, Context};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use crate::{
    layers::{
        activation::Activation,
        dense::{Layer, LayerConfig},
    },
    network::{AccurateFnParams, Network, TrainConfig, TrainError, TrainReport},
    sample::TrainSample,
};


pub const AND: &str = "[
    (input: [0.0, 0.0], target: [0.0]),
    (input: [0.0, 1.0], target: [0.0]),
    (input: [1.0, 0.0], target: [0.0]),
    (input: [1.0, 1.0], target: [1.0]),
]";

pub const XOR: &str = "[
    (input: [0.0, 0.0], target: [0.0]),
    (input: [0.0, 1.0], target: [1.0]),
    (input: [1.0, 0.0], target: [1.0]),
    (input: [1.0, 1.0], target: [0.0]),
]";

#[derive(Debug, Deserialize)]
struct SampleRecord {
    input: Vec<f64>,
    target: Vec<f64>,
}

pub fn read_samples(ron: &str) -> anyhow::Result<Vec<TrainSample>> {
    let records: Vec<SampleRecord> = ron::from_str(ron).context("parse samples")?;
    Ok(records
        .into_iter()
        .map(|r| TrainSample::new(r.input, r.target))
        .collect())
}

pub fn binary_accurate(params: AccurateFnParams<'_>) -> bool {
    assert_eq!(params.outputs.len(), params.targets.len());
    params
        .outputs
        .iter()
        .zip(params.targets)
        .all(|(output, target)| (0.5 < *output) == (0.5 < *target))
}

/// `sizes[0]`: input width
pub fn network(sizes: &[usize], activations: &[Activation], rng: &mut StdRng) -> Network {
    assert_eq!(sizes.len(), activations.len() + 1);
    let mut network = Network::new();
    for (i, activation) in activations.iter().copied().enumerate() {
        let depth = NonZeroUsize::new(sizes[i + 1]).unwrap();
        let layer = Layer::new_with_rng(LayerConfig::new(sizes[i], depth, activation), rng).unwrap();
        network.add_layer(layer);
    }
    network
}

/// Some initial weights settle in a local minimum; retry with other seeds
pub fn train_until_converged(
    sizes: &[usize],
    activations: &[Activation],
    samples: &[TrainSample],
    config: &TrainConfig,
) -> anyhow::Result<(Network, TrainReport)> {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut network = network(sizes, activations, &mut rng);
        match network.train_with(samples, config) {
            Ok(report) => return Ok((network, report)),
            Err(TrainError::NonConvergence { .. }) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    bail!("no seed converged")
}
