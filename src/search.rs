extern crate fnv;
extern crate rand;

use fnv::FnvHashMap;
use rand::{Rng, SeedableRng, XorShiftRng};

/// Sampling rule for a single hyperparameter.
#[derive(Clone, Debug)]
pub enum ParamRange {
    /// Uniform integers, both bounds inclusive.
    Int { low: u64, high: u64 },
    /// Log-uniform continuous values in [low, high).
    LogUniform { low: f64, high: f64 },
}

/// Declared bounds per hyperparameter. The declaration order is kept so that
/// a seeded study proposes the same points in the same order.
#[derive(Clone, Debug)]
pub struct SearchSpace {
    params: Vec<(String, ParamRange)>,
}

impl SearchSpace {

    pub fn new() -> Self {
        SearchSpace { params: Vec::new() }
    }

    pub fn with_int(mut self, name: &str, low: u64, high: u64) -> Self {
        self.params.push((name.to_string(), ParamRange::Int { low, high }));
        self
    }

    pub fn with_log_uniform(mut self, name: &str, low: f64, high: f64) -> Self {
        self.params.push((name.to_string(), ParamRange::LogUniform { low, high }));
        self
    }

    pub fn params(&self) -> &[(String, ParamRange)] {
        &self.params
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Int(u64),
    Float(f64),
}

impl ParamValue {

    pub fn as_int(&self) -> u64 {
        match *self {
            ParamValue::Int(value) => value,
            ParamValue::Float(value) => value as u64,
        }
    }

    pub fn as_float(&self) -> f64 {
        match *self {
            ParamValue::Int(value) => value as f64,
            ParamValue::Float(value) => value,
        }
    }
}

/// One sampled hyperparameter point.
pub type HyperParams = FnvHashMap<String, ParamValue>;

/// A recorded hyperparameter point together with its objective value.
#[derive(Clone, Debug)]
pub struct Trial {
    pub params: HyperParams,
    pub value: f64,
}

/// Black-box search strategy over a declared search space, run under a
/// maximize direction: propose a point, have the caller report its objective
/// value, keep the full history to identify the best point. Points are
/// sampled independently at random.
pub struct Study {
    rng: XorShiftRng,
    trials: Vec<Trial>,
}

impl Study {

    pub fn new_maximize() -> Self {
        Study { rng: rand::weak_rng(), trials: Vec::new() }
    }

    pub fn with_seed(seed: [u32; 4]) -> Self {
        Study { rng: XorShiftRng::from_seed(seed), trials: Vec::new() }
    }

    pub fn propose(&mut self, space: &SearchSpace) -> HyperParams {

        let mut params: HyperParams =
            FnvHashMap::with_capacity_and_hasher(space.params().len(), Default::default());

        for &(ref name, ref range) in space.params() {

            let value = match *range {
                ParamRange::Int { low, high } =>
                    ParamValue::Int(self.rng.gen_range(low, high + 1)),
                ParamRange::LogUniform { low, high } =>
                    ParamValue::Float(self.rng.gen_range(low.ln(), high.ln()).exp()),
            };

            params.insert(name.clone(), value);
        }

        params
    }

    pub fn record(&mut self, params: HyperParams, value: f64) {
        self.trials.push(Trial { params, value });
    }

    pub fn num_trials(&self) -> usize {
        self.trials.len()
    }

    /// The trial with the strictly highest objective value. Ties are resolved
    /// in favor of the earliest recorded trial.
    pub fn best(&self) -> Option<&Trial> {

        let mut best: Option<&Trial> = None;

        for trial in self.trials.iter() {
            let is_better = match best {
                Some(current) => trial.value > current.value,
                None => true,
            };
            if is_better {
                best = Some(trial);
            }
        }

        best
    }
}
