extern crate csv;
extern crate fnv;
extern crate rand;
extern crate scoped_pool;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

use std::time::Instant;

use fnv::FnvHashMap;

pub mod bpr;
pub mod eval;
pub mod expomf;
pub mod io;
pub mod linalg;
pub mod model;
pub mod ranking;
pub mod search;
pub mod stats;
pub mod types;
pub mod utils;
pub mod wmf;
mod usage_tests;

use eval::{Evaluator, Metric};
use io::Dataset;
use model::ModelKind;
use search::{HyperParams, SearchSpace, Study, Trial};
use stats::Summary;

/// Ranking cutoff used by the validation and test evaluators.
pub const CUTOFF_K: usize = 5;

/// Immutable run configuration, passed explicitly instead of being read from
/// ambient process state.
#[derive(Clone, Debug)]
pub struct TuneConfig {
    pub num_components: usize,
    pub num_threads: usize,
    pub num_trials: usize,
    /// Number of repeated test evaluations after the final retrain.
    pub confirmation_runs: usize,
}

impl TuneConfig {

    pub fn new(num_components: usize, num_threads: usize, num_trials: usize) -> Self {
        TuneConfig {
            num_components,
            num_threads,
            num_trials,
            confirmation_runs: 5,
        }
    }
}

/// Per-model result of a tuning run: the winning hyperparameter point, its
/// validation objective, and the confirmation statistics on the test split.
pub struct TuneOutcome {
    pub model: &'static str,
    pub best_params: HyperParams,
    pub best_objective: f64,
    pub metrics: FnvHashMap<String, Summary>,
}

/// The sequential search loop: exactly `num_trials` cycles of proposing a
/// point, computing its objective value and reporting it back to the study,
/// followed by selecting the best recorded trial.
pub fn run_study<F>(
    study: &mut Study,
    space: &SearchSpace,
    num_trials: usize,
    mut objective: F,
) -> Trial
    where F: FnMut(&HyperParams) -> f64 {

    for trial in 0..num_trials {

        let params = study.propose(space);

        let trial_start = Instant::now();
        let value = objective(&params);
        let duration = utils::to_millis(trial_start.elapsed());

        println!("trial {}/{}: objective {:.5}, {}ms", trial + 1, num_trials, value, duration);

        study.record(params, value);
    }

    study.best().unwrap().clone()
}

/// The confirmation phase: exactly `num_runs` repeated evaluations, reduced
/// to per-metric mean and standard deviation.
pub fn confirm<G>(num_runs: usize, mut evaluate: G) -> FnvHashMap<String, Summary>
    where G: FnMut() -> FnvHashMap<String, f64> {

    let mut per_metric: FnvHashMap<String, Vec<f64>> = FnvHashMap::default();

    for _ in 0..num_runs {
        for (metric, value) in evaluate().into_iter() {
            per_metric.entry(metric).or_insert_with(Vec::new).push(value);
        }
    }

    per_metric.into_iter()
        .map(|(metric, values)| (metric, stats::describe(&values)))
        .collect()
}

/// Tunes a single model variant: a fixed-budget search against the
/// validation split, then one retrain with the best point and repeated
/// evaluation on the test split.
pub fn tune_model(kind: ModelKind, data: &Dataset, config: &TuneConfig) -> TuneOutcome {

    let space = kind.search_space();
    let mut study = Study::new_maximize();

    let valid_evaluator = Evaluator::new(&data.valid, &data.train, CUTOFF_K, vec![Metric::Dcg]);
    let objective_label = Metric::Dcg.label(CUTOFF_K);

    let num_components = config.num_components;
    let num_threads = config.num_threads;

    let best = run_study(&mut study, &space, config.num_trials, |params| {

        let num_epochs = params["epochs"].as_int() as usize;

        let mut model = kind.build(params, num_components);
        model.fit(&data.train, data.num_items, num_epochs, num_threads);

        valid_evaluator.evaluate(&model.score())[objective_label.as_str()]
    });

    println!(
        "{}: best {} {:.5} with parameters {}",
        kind.name(),
        objective_label,
        best.value,
        serde_json::to_string(&best.params).unwrap(),
    );

    let test_evaluator = Evaluator::new(&data.test, &data.train, CUTOFF_K, Metric::all());

    let mut model = kind.build(&best.params, num_components);
    let num_epochs = best.params["epochs"].as_int() as usize;
    model.fit(&data.train, data.num_items, num_epochs, num_threads);

    let scores = model.score();
    let metrics = confirm(config.confirmation_runs, || test_evaluator.evaluate(&scores));

    TuneOutcome {
        model: kind.name(),
        best_params: best.params,
        best_objective: best.value,
        metrics,
    }
}

/// Tunes all three model variants in turn and reports their summaries.
pub fn tune_all(data: &Dataset, config: &TuneConfig) -> Vec<TuneOutcome> {

    ModelKind::all().iter()
        .map(|kind| {
            println!("Tuning {} for {} trials", kind.name(), config.num_trials);

            let outcome = tune_model(*kind, data, config);
            println!("{}", io::summary_as_json(outcome.model, &outcome.metrics));

            outcome
        })
        .collect()
}


#[cfg(test)]
mod tests {

    use fnv::FnvHashMap;

    use super::{confirm, run_study};
    use search::{SearchSpace, Study};

    #[test]
    fn study_runs_exactly_the_requested_number_of_trials() {

        let space = SearchSpace::new().with_int("epochs", 1, 10);
        let mut study = Study::with_seed([7, 11, 13, 17]);

        let mut num_calls = 0;
        run_study(&mut study, &space, 3, |_| {
            num_calls += 1;
            0.5
        });

        assert_eq!(num_calls, 3);
        assert_eq!(study.num_trials(), 3);
    }

    #[test]
    fn the_strictly_best_trial_wins() {

        let space = SearchSpace::new().with_log_uniform("alpha", 1e-5, 1e-1);
        let mut study = Study::with_seed([3, 5, 7, 9]);

        let values = [0.3, 0.9, 0.4, 0.6];
        let mut proposed = Vec::new();

        let best = run_study(&mut study, &space, 4, |params| {
            proposed.push(params.clone());
            values[proposed.len() - 1]
        });

        assert_eq!(best.value, 0.9);
        assert_eq!(best.params, proposed[1]);
    }

    #[test]
    fn equal_objectives_resolve_to_the_earliest_trial() {

        let space = SearchSpace::new().with_log_uniform("alpha", 1e-5, 1e-1);
        let mut study = Study::with_seed([21, 23, 25, 27]);

        let values = [0.5, 0.7, 0.7, 0.3];
        let mut proposed = Vec::new();

        let best = run_study(&mut study, &space, 4, |params| {
            proposed.push(params.clone());
            values[proposed.len() - 1]
        });

        assert_eq!(best.value, 0.7);
        assert_eq!(best.params, proposed[1]);
    }

    #[test]
    fn confirmation_runs_exactly_the_requested_number_of_evaluations() {

        let reported = [0.10, 0.12, 0.11, 0.13, 0.09];
        let mut num_calls = 0;

        let summaries = confirm(5, || {
            let mut run = FnvHashMap::default();
            run.insert(String::from("DCG@5"), reported[num_calls]);
            num_calls += 1;
            run
        });

        assert_eq!(num_calls, 5);

        let summary = &summaries["DCG@5"];
        assert!((summary.mean - 0.11).abs() < 1e-10);
        assert!((summary.std - 0.0158113883).abs() < 1e-6);
    }
}
