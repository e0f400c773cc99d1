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

extern crate csv;
extern crate fnv;
extern crate rand;
extern crate serde;
extern crate serde_json;

use std;
use std::cmp;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Write;

use fnv::{FnvHashMap, FnvHashSet};
use rand::{Rng, SeedableRng, XorShiftRng};

use stats::{DataDictionary, Summary};
use types;
use types::SparseBinaryMatrix;

/// Fixed seed for the train/validation/test split, so that repeated runs on
/// the same input file tune against the same partition.
pub const SPLIT_SEED: [u32; 4] = [0x9E37_79B9, 0x243F_6A88, 0xB7E1_5162, 0x8AED_2A6A];

/// The benchmark interaction data, partitioned into disjoint splits over one
/// shared user×item universe.
pub struct Dataset {
    pub train: SparseBinaryMatrix,
    pub valid: SparseBinaryMatrix,
    pub test: SparseBinaryMatrix,
    pub num_users: usize,
    pub num_items: usize,
}

/// Reads a CSV input file. We expect NO headers, and a user-item tuple at the
/// start of each line with tab separation. Additional columns (ratings,
/// timestamps) are ignored, so the MovieLens `u.data` layout works as-is.
pub fn csv_reader(file: &str) -> Result<csv::Reader<std::fs::File>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(file)?;

    Ok(reader)
}

pub fn interactions_from_csv<R>(reader: &mut csv::Reader<R>) -> Vec<(String, String)>
    where R: std::io::Read {

    reader.records()
        .filter_map(Result::ok)
        .filter_map(|record| {
            match (record.get(0), record.get(1)) {
                (Some(user), Some(item)) => Some((user.to_string(), item.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Reads an interactions file and derives the three splits with the fixed
/// split seed.
pub fn load_dataset(file: &str) -> Result<Dataset, Box<dyn Error>> {

    let mut reader = csv_reader(file)?;
    let raw_interactions = interactions_from_csv(&mut reader);

    let data_dict = DataDictionary::from(raw_interactions.iter());

    let interactions: Vec<(u32, u32)> = raw_interactions.iter()
        .map(|&(ref user, ref item)| (*data_dict.user_index(user), *data_dict.item_index(item)))
        .collect();

    Ok(split_interactions(
        &interactions,
        data_dict.num_users(),
        data_dict.num_items(),
        SPLIT_SEED,
    ))
}

/// Partitions the observed interactions per user: roughly a tenth each into
/// the test and validation splits, the remainder into train. Users with
/// fewer than three distinct items keep their whole history in train. Every
/// observed pair lands in exactly one split.
pub fn split_interactions(
    interactions: &[(u32, u32)],
    num_users: usize,
    num_items: usize,
    seed: [u32; 4],
) -> Dataset {

    let mut per_user: Vec<Vec<u32>> = vec![Vec::new(); num_users];
    let mut seen = FnvHashSet::default();

    for &(user, item) in interactions.iter() {
        if seen.insert((user, item)) {
            per_user[user as usize].push(item);
        }
    }

    let mut rng = XorShiftRng::from_seed(seed);

    let mut train = types::new_sparse_binary_matrix(num_users);
    let mut valid = types::new_sparse_binary_matrix(num_users);
    let mut test = types::new_sparse_binary_matrix(num_users);

    for (user, items) in per_user.iter_mut().enumerate() {

        if items.len() < 3 {
            for &item in items.iter() {
                train[user].insert(item);
            }
            continue;
        }

        rng.shuffle(items);

        let num_held_out = cmp::max(1, items.len() / 10);

        for (position, &item) in items.iter().enumerate() {
            if position < num_held_out {
                test[user].insert(item);
            } else if position < 2 * num_held_out {
                valid[user].insert(item);
            } else {
                train[user].insert(item);
            }
        }
    }

    Dataset { train, valid, test, num_users, num_items }
}

/// Struct used for JSON serialization of per-model summaries. Field names
/// will be used in JSON.
#[derive(Serialize)]
struct ModelSummary<'a> {
    model: &'a str,
    metrics: &'a FnvHashMap<String, Summary>,
}

/// One JSON line per tuned model, mirroring how the best parameters are
/// reported during the search.
pub fn summary_as_json(model: &str, metrics: &FnvHashMap<String, Summary>) -> String {
    json!(ModelSummary { model, metrics }).to_string()
}

/// The final combined table: one row per metric, one column per model, each
/// cell holding mean and standard deviation over the confirmation runs.
pub fn format_summary_table(columns: &[(&str, &FnvHashMap<String, Summary>)]) -> String {

    let metric_labels: BTreeSet<&String> = columns.iter()
        .flat_map(|&(_, metrics)| metrics.keys())
        .collect();

    let mut table = String::new();

    write!(table, "{:<10}", "metric").unwrap();
    for &(model, _) in columns.iter() {
        write!(table, "{:>24}", model).unwrap();
    }
    table.push('\n');

    for label in metric_labels.iter() {
        write!(table, "{:<10}", label).unwrap();

        for &(_, metrics) in columns.iter() {
            let cell = match metrics.get(*label) {
                Some(summary) => format!("{:.5} +/- {:.5}", summary.mean, summary.std),
                None => String::from("-"),
            };
            write!(table, "{:>24}", cell).unwrap();
        }
        table.push('\n');
    }

    table
}


#[cfg(test)]
mod tests {

    use std::env;
    use std::fs;
    use std::fs::File;
    use std::io::Write;

    use fnv::FnvHashMap;

    use io;
    use stats::Summary;

    #[test]
    fn interactions_from_tab_separated_file() {

        let path = env::temp_dir().join("recotune_interactions_test.tsv");

        {
            let mut file = File::create(&path).unwrap();
            write!(file, "alice\tapple\t5\t881250949\n").unwrap();
            write!(file, "alice\tdog\t3\t881250950\n").unwrap();
            write!(file, "bob\tapple\n").unwrap();
            write!(file, "charles\tpony\n").unwrap();
        }

        let mut reader = io::csv_reader(path.to_str().unwrap()).unwrap();
        let interactions = io::interactions_from_csv(&mut reader);

        fs::remove_file(&path).ok();

        assert_eq!(interactions.len(), 4);
        assert_eq!(interactions[0], (String::from("alice"), String::from("apple")));
        assert_eq!(interactions[2], (String::from("bob"), String::from("apple")));
    }

    #[test]
    fn splits_are_disjoint_and_cover_the_history() {

        // 12 users with 10 distinct items each
        let mut interactions = Vec::new();
        for user in 0..12_u32 {
            for offset in 0..10_u32 {
                interactions.push((user, (user + offset) % 15));
                // duplicates must not leak an item into two splits
                interactions.push((user, (user + offset) % 15));
            }
        }

        let dataset = io::split_interactions(&interactions, 12, 15, [5, 6, 7, 8]);

        assert_eq!(dataset.num_users, 12);
        assert_eq!(dataset.num_items, 15);

        for user in 0..12 {
            let train = &dataset.train[user];
            let valid = &dataset.valid[user];
            let test = &dataset.test[user];

            assert_eq!(train.len(), 8);
            assert_eq!(valid.len(), 1);
            assert_eq!(test.len(), 1);

            assert!(train.is_disjoint(valid));
            assert!(train.is_disjoint(test));
            assert!(valid.is_disjoint(test));
        }
    }

    #[test]
    fn users_with_tiny_histories_stay_in_train() {

        let interactions = vec![(0, 3), (0, 7)];

        let dataset = io::split_interactions(&interactions, 1, 8, [5, 6, 7, 8]);

        assert_eq!(dataset.train[0].len(), 2);
        assert!(dataset.valid[0].is_empty());
        assert!(dataset.test[0].is_empty());
    }

    #[test]
    fn summary_table_lists_models_as_columns() {

        let mut bpr_metrics = FnvHashMap::default();
        bpr_metrics.insert(String::from("DCG@5"), Summary { mean: 0.11, std: 0.01 });

        let mut wmf_metrics = FnvHashMap::default();
        wmf_metrics.insert(String::from("DCG@5"), Summary { mean: 0.14, std: 0.02 });

        let columns = vec![("BPR", &bpr_metrics), ("WMF", &wmf_metrics)];
        let table = io::format_summary_table(&columns);

        let header = table.lines().next().unwrap();
        assert!(header.contains("metric"));
        assert!(header.contains("BPR"));
        assert!(header.contains("WMF"));

        let dcg_row = table.lines().nth(1).unwrap();
        assert!(dcg_row.contains("DCG@5"));
        assert!(dcg_row.contains("0.11000 +/- 0.01000"));
        assert!(dcg_row.contains("0.14000 +/- 0.02000"));
    }
}
