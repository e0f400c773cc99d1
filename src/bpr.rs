extern crate rand;
extern crate scoped_pool;

use std::cmp;
use std::sync::Mutex;

use rand::Rng;
use scoped_pool::Pool;

use linalg;
use model;
use model::Model;
use types::{DenseMatrix, DenseVector, SparseBinaryMatrix};

/// Pairwise ranking model trained with stochastic gradient descent: for every
/// observed user-item pair we sample an unobserved item and push the observed
/// one above it under a sigmoid ranking loss.
pub struct Bpr {
    num_components: usize,
    learning_rate: f64,
    weight_decay: f64,
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
}

impl Bpr {

    pub fn new(num_components: usize, learning_rate: f64, weight_decay: f64) -> Self {
        Bpr {
            num_components,
            learning_rate,
            weight_decay,
            user_factors: Vec::new(),
            item_factors: Vec::new(),
        }
    }
}

impl Model for Bpr {

    fn fit(
        &mut self,
        train: &SparseBinaryMatrix,
        num_items: usize,
        num_epochs: usize,
        num_threads: usize,
    ) {

        let num_users = train.len();
        let num_threads = cmp::max(1, num_threads);

        let mut user_rows = model::init_factors(num_users, self.num_components);

        // Item rows sit behind per-row mutexes so that the user partitions
        // can update them concurrently.
        let item_rows: Vec<Mutex<DenseVector>> =
            model::init_factors(num_items, self.num_components).into_iter()
                .map(Mutex::new)
                .collect();

        let pool = Pool::new(num_threads);
        let chunk_size = cmp::max(1, (num_users + num_threads - 1) / num_threads);

        let num_components = self.num_components;
        let learning_rate = self.learning_rate;
        let weight_decay = self.weight_decay;

        for _ in 0..num_epochs {

            pool.scoped(|scope| {

                for (chunk_index, chunk) in user_rows.chunks_mut(chunk_size).enumerate() {

                    let item_rows = &item_rows;

                    scope.execute(move || {

                        let mut rng = rand::weak_rng();
                        let first_user = chunk_index * chunk_size;

                        for (offset, user_row) in chunk.iter_mut().enumerate() {

                            let history = &train[first_user + offset];

                            if history.is_empty() || history.len() >= num_items {
                                continue;
                            }

                            for &item in history.iter() {

                                let negative = loop {
                                    let candidate = rng.gen_range(0, num_items as u32);
                                    if !history.contains(&candidate) {
                                        break candidate;
                                    }
                                };

                                let positive_row =
                                    item_rows[item as usize].lock().unwrap().clone();
                                let negative_row =
                                    item_rows[negative as usize].lock().unwrap().clone();

                                let margin = linalg::dot(user_row, &positive_row)
                                    - linalg::dot(user_row, &negative_row);
                                let gradient = linalg::sigmoid(-margin);

                                {
                                    let mut row = item_rows[item as usize].lock().unwrap();
                                    for f in 0..num_components {
                                        row[f] += learning_rate * (gradient * user_row[f]
                                            - weight_decay * positive_row[f]);
                                    }
                                }

                                {
                                    let mut row = item_rows[negative as usize].lock().unwrap();
                                    for f in 0..num_components {
                                        row[f] += learning_rate * (-gradient * user_row[f]
                                            - weight_decay * negative_row[f]);
                                    }
                                }

                                for f in 0..num_components {
                                    let update = gradient * (positive_row[f] - negative_row[f])
                                        - weight_decay * user_row[f];
                                    user_row[f] += learning_rate * update;
                                }
                            }
                        }
                    });
                }
            });
        }

        self.user_factors = user_rows;
        self.item_factors = item_rows.into_iter()
            .map(|row| row.into_inner().unwrap())
            .collect();
    }

    fn user_factors(&self) -> &DenseMatrix {
        &self.user_factors
    }

    fn item_factors(&self) -> &DenseMatrix {
        &self.item_factors
    }
}
