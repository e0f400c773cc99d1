/**
 * RecoTune
 * Copyright (C) 2020 The recotune developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

extern crate getopts;
extern crate num_cpus;
extern crate recotune;

use std::env;
use std::error::Error;

use getopts::Options;

use recotune::io;
use recotune::{TuneConfig, tune_all};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of interactions \
        between users and items. The input file must contain a user and item pair per line, \
        separated by a tab; additional columns such as ratings or timestamps are ignored.",
        "PATH");
    opts.optopt("c", "num_components", "Number of latent factors per user and item, fixed across \
        all trials and models (optional, defaults to 20).", "NUMBER");
    opts.optopt("t", "threads", "Number of worker threads used while training a single model \
        (optional, defaults to 8; 0 means one thread per available core).", "NUMBER");
    opts.optopt("n", "trials", "Number of hyperparameter search trials per model (optional, \
        defaults to 50).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    if !matches.opt_present("i") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        );
    }

    let interactions_path = matches.opt_str("i").unwrap();

    let num_components: usize = match matches.opt_get_default("c", 20) {
        Ok(num_components) => num_components,
        Err(failure) => {
            let hint = format!("Problem with option 'c': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let num_threads: usize = match matches.opt_get_default("t", 8) {
        Ok(0) => num_cpus::get(),
        Ok(num_threads) => num_threads,
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let num_trials: usize = match matches.opt_get_default("n", 50) {
        Ok(num_trials) => num_trials,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let config = TuneConfig::new(num_components, num_threads, num_trials);

    tune_models(&interactions_path, &config).unwrap();
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
}

fn tune_models(
    interactions_path: &str,
    config: &TuneConfig,
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} to build the interaction dataset", interactions_path);

    let data = io::load_dataset(interactions_path)?;

    println!(
        "Found {} users and {} items ({} train / {} validation / {} test interactions).",
        data.num_users,
        data.num_items,
        num_observed(&data.train),
        num_observed(&data.valid),
        num_observed(&data.test),
    );

    let outcomes = tune_all(&data, config);

    let columns: Vec<_> = outcomes.iter()
        .map(|outcome| (outcome.model, &outcome.metrics))
        .collect();

    println!("\n{}", io::format_summary_table(&columns));

    Ok(())
}

fn num_observed(matrix: &recotune::types::SparseBinaryMatrix) -> usize {
    matrix.iter().map(|items| items.len()).sum()
}
