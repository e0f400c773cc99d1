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

extern crate fnv;

use std::cmp;

use fnv::{FnvHashMap, FnvHashSet};

use ranking;
use types::{DenseMatrix, SparseBinaryMatrix};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Metric {
    Dcg,
    Recall,
    Map,
}

impl Metric {

    pub fn all() -> Vec<Metric> {
        vec![Metric::Dcg, Metric::Recall, Metric::Map]
    }

    pub fn label(&self, k: usize) -> String {
        match *self {
            Metric::Dcg => format!("DCG@{}", k),
            Metric::Recall => format!("Recall@{}", k),
            Metric::Map => format!("MAP@{}", k),
        }
    }

    fn compute(&self, ranked_items: &[u32], holdout: &FnvHashSet<u32>, k: usize) -> f64 {
        match *self {

            Metric::Dcg => {
                ranked_items.iter().enumerate()
                    .filter(|&(_, item)| holdout.contains(item))
                    .map(|(position, _)| 1.0 / ((position + 2) as f64).log2())
                    .sum()
            },

            Metric::Recall => {
                let num_hits = ranked_items.iter()
                    .filter(|&item| holdout.contains(item))
                    .count();

                num_hits as f64 / holdout.len() as f64
            },

            Metric::Map => {
                let mut num_hits = 0;
                let mut precision_sum = 0.0;

                for (position, item) in ranked_items.iter().enumerate() {
                    if holdout.contains(item) {
                        num_hits += 1;
                        precision_sum += num_hits as f64 / (position + 1) as f64;
                    }
                }

                precision_sum / cmp::min(k, holdout.len()) as f64
            },
        }
    }
}

/// Scores a predicted score matrix against a held-out split, averaging each
/// metric over all users with a non-empty holdout row. Items from the
/// training split never enter the candidate ranking.
pub struct Evaluator<'a> {
    holdout: &'a SparseBinaryMatrix,
    train: &'a SparseBinaryMatrix,
    k: usize,
    metrics: Vec<Metric>,
}

impl<'a> Evaluator<'a> {

    pub fn new(
        holdout: &'a SparseBinaryMatrix,
        train: &'a SparseBinaryMatrix,
        k: usize,
        metrics: Vec<Metric>,
    ) -> Self {
        Evaluator { holdout, train, k, metrics }
    }

    pub fn evaluate(&self, predicted: &DenseMatrix) -> FnvHashMap<String, f64> {

        let mut totals = vec![0.0; self.metrics.len()];
        let mut num_scored_users = 0;

        for (user, holdout_items) in self.holdout.iter().enumerate() {

            if holdout_items.is_empty() {
                continue;
            }

            let ranked_items = ranking::top_k(&predicted[user], &self.train[user], self.k);

            for (index, metric) in self.metrics.iter().enumerate() {
                totals[index] += metric.compute(&ranked_items, holdout_items, self.k);
            }

            num_scored_users += 1;
        }

        self.metrics.iter().enumerate()
            .map(|(index, metric)| {
                let average = if num_scored_users == 0 {
                    0.0
                } else {
                    totals[index] / num_scored_users as f64
                };
                (metric.label(self.k), average)
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {

    use fnv::FnvHashSet;

    use eval::{Evaluator, Metric};

    fn observed(items: &[u32]) -> FnvHashSet<u32> {
        items.iter().cloned().collect()
    }

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-6
    }

    #[test]
    fn metrics_averaged_over_all_users() {

        /* User 0 holds out item 2, which ranks first among its candidates.
           User 1 holds out item 0, which ranks last. */
        let holdout = vec![observed(&[2]), observed(&[0])];
        let train = vec![observed(&[0]), observed(&[])];

        let predicted = vec![
            vec![9.0, 1.0, 8.0, 0.0],
            vec![5.0, 6.0, 7.0, 8.0],
        ];

        let evaluator = Evaluator::new(&holdout, &train, 5, Metric::all());
        let result = evaluator.evaluate(&predicted);

        let expected_dcg_user_1 = 1.0 / 5.0_f64.log2();
        assert!(close_enough_to(result["DCG@5"], (1.0 + expected_dcg_user_1) / 2.0));
        assert!(close_enough_to(result["Recall@5"], 1.0));
        assert!(close_enough_to(result["MAP@5"], (1.0 + 0.25) / 2.0));
    }

    #[test]
    fn training_items_are_never_ranked() {

        let holdout = vec![observed(&[1])];
        // Item 0 scores highest but belongs to the training split
        let train = vec![observed(&[0])];

        let predicted = vec![vec![10.0, 5.0, 6.0]];

        let evaluator = Evaluator::new(&holdout, &train, 1, vec![Metric::Dcg]);
        let result = evaluator.evaluate(&predicted);

        // With item 0 excluded, item 2 ranks first and the held-out item 1 misses the cutoff
        assert!(close_enough_to(result["DCG@1"], 0.0));
    }

    #[test]
    fn users_without_holdout_are_skipped() {

        let holdout = vec![observed(&[]), observed(&[1])];
        let train = vec![observed(&[0]), observed(&[])];

        let predicted = vec![
            vec![1.0, 2.0],
            vec![0.0, 3.0],
        ];

        let evaluator = Evaluator::new(&holdout, &train, 2, vec![Metric::Recall]);
        let result = evaluator.evaluate(&predicted);

        // Only the second user contributes to the average
        assert!(close_enough_to(result["Recall@2"], 1.0));
    }
}
