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

#[cfg(test)]
mod tests {

    use fnv::FnvHashSet;

    use super::super::{tune_all, TuneConfig};
    use io;
    use io::Dataset;

    fn observed(items: &[u32]) -> FnvHashSet<u32> {
        items.iter().cloned().collect()
    }

    #[test]
    fn programmatic_usage() {

        /* A tiny synthetic benchmark: three users and four items, with
           disjoint train/validation/test splits over the same universe. */
        let dataset = Dataset {
            train: vec![observed(&[0, 1]), observed(&[1, 2]), observed(&[2, 3])],
            valid: vec![observed(&[2]), observed(&[3]), observed(&[0])],
            test: vec![observed(&[3]), observed(&[0]), observed(&[1])],
            num_users: 3,
            num_items: 4,
        };

        /* A single trial per model with a single worker thread and five
           latent factors keeps the run small. The confirmation phase still
           performs its five repeated test evaluations per model. */
        let config = TuneConfig::new(5, 1, 1);

        let outcomes = tune_all(&dataset, &config);

        /* One outcome per model variant, in a fixed order. */
        let names: Vec<&str> = outcomes.iter().map(|outcome| outcome.model).collect();
        assert_eq!(names, vec!["BPR", "ExpoMF", "WMF"]);

        /* Every model reports confirmation statistics for all three metrics
           at the configured cutoff. */
        for outcome in outcomes.iter() {
            assert!(outcome.metrics.contains_key("DCG@5"));
            assert!(outcome.metrics.contains_key("Recall@5"));
            assert!(outcome.metrics.contains_key("MAP@5"));
            assert!(outcome.best_params.contains_key("epochs"));
        }

        /* The combined table lists the three model names as its columns. */
        let columns: Vec<_> = outcomes.iter()
            .map(|outcome| (outcome.model, &outcome.metrics))
            .collect();

        let table = io::format_summary_table(&columns);
        let header = table.lines().next().unwrap();

        for name in names.iter() {
            assert!(header.contains(name));
        }
    }
}
