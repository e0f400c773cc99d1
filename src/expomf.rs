extern crate scoped_pool;

use std::cmp;
use std::f64::consts::PI;

use scoped_pool::Pool;

use linalg;
use model;
use model::Model;
use types;
use types::{DenseMatrix, SparseBinaryMatrix};

const MIN_EXPOSURE_PRIOR: f64 = 1e-4;

/// Exposure-aware matrix factorization, trained with expectation
/// maximization. Unobserved cells are weighted by the posterior probability
/// that the user was exposed to the item at all, driven by a per-item
/// exposure prior `mu` that is re-estimated every epoch.
pub struct ExpoMf {
    num_components: usize,
    lam_y: f64,
    weight_decay: f64,
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
}

impl ExpoMf {

    pub fn new(num_components: usize, lam_y: f64, weight_decay: f64) -> Self {
        ExpoMf {
            num_components,
            lam_y,
            weight_decay,
            user_factors: Vec::new(),
            item_factors: Vec::new(),
        }
    }
}

impl Model for ExpoMf {

    fn fit(
        &mut self,
        train: &SparseBinaryMatrix,
        num_items: usize,
        num_epochs: usize,
        num_threads: usize,
    ) {

        let num_users = train.len();
        let num_threads = cmp::max(1, num_threads);
        let num_components = self.num_components;
        let lam_y = self.lam_y;
        let weight_decay = self.weight_decay;

        let mut user_rows = model::init_factors(num_users, num_components);
        let mut item_rows = model::init_factors(num_items, num_components);

        let user_histories = model::items_by_user(train);
        let item_histories = model::users_by_item(train, num_items);

        let mut exposure_prior = vec![0.01; num_items];
        let mut exposure = types::new_dense_matrix(num_users, num_items);

        let pool = Pool::new(num_threads);
        let user_chunk_size = cmp::max(1, (num_users + num_threads - 1) / num_threads);
        let item_chunk_size = cmp::max(1, (num_items + num_threads - 1) / num_threads);

        for _ in 0..num_epochs {

            // E-step: posterior probability that each unobserved cell was
            // exposed, given the current factors and priors
            pool.scoped(|scope| {

                let user_rows = &user_rows;
                let item_rows = &item_rows;
                let exposure_prior = &exposure_prior;

                for (chunk_index, chunk) in exposure.chunks_mut(user_chunk_size).enumerate() {

                    scope.execute(move || {

                        for (offset, posterior_row) in chunk.iter_mut().enumerate() {

                            let user = chunk_index * user_chunk_size + offset;
                            let user_row = &user_rows[user];
                            let history = &train[user];

                            for item in 0..num_items {

                                posterior_row[item] = if history.contains(&(item as u32)) {
                                    1.0
                                } else {
                                    let prediction = linalg::dot(user_row, &item_rows[item]);
                                    let likelihood = (lam_y / (2.0 * PI)).sqrt()
                                        * (-0.5 * lam_y * prediction * prediction).exp();
                                    let prior = exposure_prior[item];

                                    prior * likelihood / (prior * likelihood + 1.0 - prior)
                                };
                            }
                        }
                    });
                }
            });

            // M-step for the user factors: exposure-weighted ridge regression
            pool.scoped(|scope| {

                let item_rows = &item_rows;
                let exposure = &exposure;
                let user_histories = &user_histories;

                for (chunk_index, chunk) in user_rows.chunks_mut(user_chunk_size).enumerate() {

                    scope.execute(move || {

                        for (offset, row) in chunk.iter_mut().enumerate() {

                            let user = chunk_index * user_chunk_size + offset;
                            let posterior_row = &exposure[user];

                            let mut system =
                                types::new_dense_matrix(num_components, num_components);
                            let mut rhs = vec![0.0; num_components];

                            for item in 0..num_items {
                                let posterior = posterior_row[item];
                                if posterior == 0.0 {
                                    continue;
                                }
                                let item_row = &item_rows[item];
                                for f in 0..num_components {
                                    let scaled = lam_y * posterior * item_row[f];
                                    for g in 0..num_components {
                                        system[f][g] += scaled * item_row[g];
                                    }
                                }
                            }

                            for &item in user_histories[user].iter() {
                                let item_row = &item_rows[item as usize];
                                for f in 0..num_components {
                                    rhs[f] += lam_y * item_row[f];
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

            // M-step for the item factors
            pool.scoped(|scope| {

                let user_rows = &user_rows;
                let exposure = &exposure;
                let item_histories = &item_histories;

                for (chunk_index, chunk) in item_rows.chunks_mut(item_chunk_size).enumerate() {

                    scope.execute(move || {

                        for (offset, row) in chunk.iter_mut().enumerate() {

                            let item = chunk_index * item_chunk_size + offset;

                            let mut system =
                                types::new_dense_matrix(num_components, num_components);
                            let mut rhs = vec![0.0; num_components];

                            for user in 0..num_users {
                                let posterior = exposure[user][item];
                                if posterior == 0.0 {
                                    continue;
                                }
                                let user_row = &user_rows[user];
                                for f in 0..num_components {
                                    let scaled = lam_y * posterior * user_row[f];
                                    for g in 0..num_components {
                                        system[f][g] += scaled * user_row[g];
                                    }
                                }
                            }

                            for &user in item_histories[item].iter() {
                                let user_row = &user_rows[user as usize];
                                for f in 0..num_components {
                                    rhs[f] += lam_y * user_row[f];
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

            // Re-estimate the exposure priors from the posterior means
            for item in 0..num_items {
                let total: f64 = (0..num_users).map(|user| exposure[user][item]).sum();
                let mean = total / num_users as f64;
                exposure_prior[item] =
                    mean.max(MIN_EXPOSURE_PRIOR).min(1.0 - MIN_EXPOSURE_PRIOR);
            }
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


#[cfg(test)]
mod tests {

    use fnv::FnvHashSet;

    use expomf::ExpoMf;
    use model::Model;
    use types::SparseBinaryMatrix;

    fn observed(items: &[u32]) -> FnvHashSet<u32> {
        items.iter().cloned().collect()
    }

    #[test]
    fn score_matches_the_training_shape() {

        let train: SparseBinaryMatrix = vec![
            observed(&[0]),
            observed(&[1, 2]),
            observed(&[3]),
        ];

        let mut model = ExpoMf::new(3, 0.01, 0.01);
        model.fit(&train, 4, 3, 2);

        let scores = model.score();

        assert_eq!(scores.len(), 3);
        for row in scores.iter() {
            assert_eq!(row.len(), 4);
            for value in row.iter() {
                assert!(value.is_finite());
            }
        }
    }

    #[test]
    fn observed_blocks_score_higher_than_unobserved_ones() {

        let train: SparseBinaryMatrix = vec![
            observed(&[0, 1, 2]),
            observed(&[0, 1, 2]),
            observed(&[3, 4, 5]),
            observed(&[3, 4, 5]),
        ];

        let mut model = ExpoMf::new(4, 1.0, 0.01);
        model.fit(&train, 6, 10, 1);

        let scores = model.score();

        let own_block: f64 = (0..3).map(|item| scores[1][item]).sum();
        let other_block: f64 = (3..6).map(|item| scores[1][item]).sum();

        assert!(own_block > other_block);
    }
}
