use core::{fmt, str::FromStr};

use thiserror::Error;

/// A pure pair of scalar functions
///
/// `derivative` takes the output of `value`, not the pre-activation sum.
#[derive(Debug, Clone, Copy)]
pub struct ActivationFunctions {
    value: fn(f64) -> f64,
    derivative: fn(f64) -> f64,
}
impl ActivationFunctions {
    pub fn new(value: fn(f64) -> f64, derivative: fn(f64) -> f64) -> Self {
        Self { value, derivative }
    }

    pub fn activate(&self, x: f64) -> f64 {
        (self.value)(x)
    }

    /// `activation`: the output of [`Self::activate`]
    pub fn derivative(&self, activation: f64) -> f64 {
        (self.derivative)(activation)
    }
}
impl From<Activation> for ActivationFunctions {
    fn from(value: Activation) -> Self {
        value.functions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Step,
    Sigmoid,
    Tanh,
}
impl Activation {
    pub fn functions(&self) -> ActivationFunctions {
        match self {
            Activation::Step => ActivationFunctions::new(step, step_derivative),
            Activation::Sigmoid => ActivationFunctions::new(sigmoid, sigmoid_derivative),
            Activation::Tanh => ActivationFunctions::new(tanh, tanh_derivative),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Step => "step",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "hyperbolicTangent",
        }
    }
}
impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for Activation {
    type Err = UnknownActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "step" => Activation::Step,
            "sigmoid" => Activation::Sigmoid,
            "hyperbolicTangent" | "tanh" => Activation::Tanh,
            _ => return Err(UnknownActivationError(s.to_owned())),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown activation function: {0}")]
pub struct UnknownActivationError(pub String);

/// ```math
/// f(x) = \begin{cases} 1 & x \ge 0 \\ 0 & x < 0 \end{cases}
/// ```
pub fn step(x: f64) -> f64 {
    if x >= 0. {
        1.
    } else {
        0.
    }
}

/// Stand-in for a derivative that is zero almost everywhere
pub fn step_derivative(_activation: f64) -> f64 {
    1.
}

/// ```math
/// f(x) = \frac{1}{1 + e^{-x}}
/// ```
pub fn sigmoid(x: f64) -> f64 {
    // Prevent `inf / inf` for large positive `x`
    if x >= 0. {
        1. / (1. + (-x).exp())
    } else {
        let exp = x.exp();
        exp / (exp + 1.)
    }
}

/// ```math
/// f'(x) = s (1 - s)
/// ```
pub fn sigmoid_derivative(s: f64) -> f64 {
    s * (1. - s)
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

/// ```math
/// f'(x) = 1 - t^2
/// ```
pub fn tanh_derivative(t: f64) -> f64 {
    1. - t.powi(2)
}
