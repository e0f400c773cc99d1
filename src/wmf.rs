extern crate scoped_pool;

use std::cmp;

use scoped_pool::Pool;

use linalg;
use model;
use model::Model;
use types::{DenseMatrix, SparseBinaryMatrix};

/// Weighted matrix factorization for implicit feedback, trained with
/// alternating least squares. Observed cells carry confidence `1 + weight`,
/// unobserved cells confidence 1 with a zero target.
pub struct Wmf {
    num_components: usize,
    weight_decay: f64,
    weight: f64,
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
}

impl Wmf {

    pub fn new(num_components: usize, weight_decay: f64, weight: f64) -> Self {
        Wmf {
            num_components,
            weight_decay,
            weight,
            user_factors: Vec::new(),
            item_factors: Vec::new(),
        }
    }
}

impl Model for Wmf {

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
        let mut item_rows = model::init_factors(num_items, self.num_components);

        let user_histories = model::items_by_user(train);
        let item_histories = model::users_by_item(train, num_items);

        let pool = Pool::new(num_threads);

        for _ in 0..num_epochs {

            let item_gram = linalg::gram(&item_rows, self.num_components);
            solve_rows(
                &pool,
                &mut user_rows,
                &user_histories,
                &item_rows,
                &item_gram,
                self.weight,
                self.weight_decay,
                self.num_components,
                num_threads,
            );

            let user_gram = linalg::gram(&user_rows, self.num_components);
            solve_rows(
                &pool,
                &mut item_rows,
                &item_histories,
                &user_rows,
                &user_gram,
                self.weight,
                self.weight_decay,
                self.num_components,
                num_threads,
            );
        }

        self.user_factors = user_rows;
        self.item_factors = item_rows;
    }

    fn user_factors(&self) -> &DenseMatrix {
        &self.user_factors
    }

    fn item_factors(&self) -> &DenseMatrix {
        &self.item_factors
    }
}

/// One half of an alternating least squares sweep: recomputes every factor
/// row from the regularized normal equations, distributing row chunks over
/// the worker pool.
fn solve_rows(
    pool: &Pool,
    rows: &mut DenseMatrix,
    histories: &[Vec<u32>],
    other_rows: &DenseMatrix,
    gram: &DenseMatrix,
    weight: f64,
    weight_decay: f64,
    num_components: usize,
    num_threads: usize,
) {

    let chunk_size = cmp::max(1, (rows.len() + num_threads - 1) / num_threads);

    pool.scoped(|scope| {

        for (chunk_index, chunk) in rows.chunks_mut(chunk_size).enumerate() {

            scope.execute(move || {

                for (offset, row) in chunk.iter_mut().enumerate() {

                    let history = &histories[chunk_index * chunk_size + offset];

                    let mut system = gram.clone();
                    let mut rhs = vec![0.0; num_components];

                    for &other in history.iter() {
                        let other_row = &other_rows[other as usize];

                        for f in 0..num_components {
                            let scaled = weight * other_row[f];
                            for g in 0..num_components {
                                system[f][g] += scaled * other_row[g];
                            }
                            rhs[f] += (1.0 + weight) * other_row[f];
                        }
                    }

                    for f in 0..num_components {
                        system[f][f] += weight_decay;
                    }

                    *row = linalg::solve(system, rhs);
                }
            });
        }
    });
}
