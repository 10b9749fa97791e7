/// An input pattern paired with the expected outputs
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSample {
    input: Vec<f64>,
    target: Vec<f64>,
}
impl TrainSample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }
    pub fn target(&self) -> &[f64] {
        &self.target
    }
}
impl From<(Vec<f64>, Vec<f64>)> for TrainSample {
    fn from((input, target): (Vec<f64>, Vec<f64>)) -> Self {
        Self::new(input, target)
    }
}
