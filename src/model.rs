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

extern crate rand;

use rand::distributions::{IndependentSample, Normal};

use bpr::Bpr;
use expomf::ExpoMf;
use linalg;
use search::{HyperParams, SearchSpace};
use types::{DenseMatrix, SparseBinaryMatrix};
use wmf::Wmf;

/// Common capability interface of the factorization models: fit two low-rank
/// factor matrices to the training interactions, expose them, and score the
/// full user×item matrix as their product.
pub trait Model {

    fn fit(
        &mut self,
        train: &SparseBinaryMatrix,
        num_items: usize,
        num_epochs: usize,
        num_threads: usize,
    );

    fn user_factors(&self) -> &DenseMatrix;

    fn item_factors(&self) -> &DenseMatrix;

    /// The predicted score matrix W·Hᵀ with one row per user and one column
    /// per item.
    fn score(&self) -> DenseMatrix {
        let item_factors = self.item_factors();

        self.user_factors().iter()
            .map(|user_row| {
                item_factors.iter()
                    .map(|item_row| linalg::dot(user_row, item_row))
                    .collect()
            })
            .collect()
    }
}

/// The closed set of tunable model variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelKind {
    Bpr,
    ExpoMf,
    Wmf,
}

impl ModelKind {

    pub fn all() -> [ModelKind; 3] {
        [ModelKind::Bpr, ModelKind::ExpoMf, ModelKind::Wmf]
    }

    pub fn name(&self) -> &'static str {
        match *self {
            ModelKind::Bpr => "BPR",
            ModelKind::ExpoMf => "ExpoMF",
            ModelKind::Wmf => "WMF",
        }
    }

    /// The tunable knobs per variant. The embedding dimensionality is fixed
    /// from the configuration and never searched.
    pub fn search_space(&self) -> SearchSpace {
        match *self {

            ModelKind::Bpr => SearchSpace::new()
                .with_int("epochs", 30, 100)
                .with_log_uniform("alpha", 1e-5, 1e-1)
                .with_log_uniform("weight_decay", 1e-4, 1e-1),

            ModelKind::ExpoMf => SearchSpace::new()
                .with_int("epochs", 1, 5)
                .with_log_uniform("weight_decay", 1e-4, 1e-1),

            ModelKind::Wmf => SearchSpace::new()
                .with_int("epochs", 1, 30)
                .with_log_uniform("weight_decay", 1e-4, 1e-1)
                .with_log_uniform("weight", 1.0, 30.0),
        }
    }

    pub fn build(&self, params: &HyperParams, num_components: usize) -> Box<dyn Model> {
        match *self {

            ModelKind::Bpr => Box::new(Bpr::new(
                num_components,
                params["alpha"].as_float(),
                params["weight_decay"].as_float(),
            )),

            // The observation precision lam_y is tied to the weight decay
            ModelKind::ExpoMf => Box::new(ExpoMf::new(
                num_components,
                params["weight_decay"].as_float(),
                params["weight_decay"].as_float(),
            )),

            ModelKind::Wmf => Box::new(Wmf::new(
                num_components,
                params["weight_decay"].as_float(),
                params["weight"].as_float(),
            )),
        }
    }
}

/// Factor rows drawn from N(0, 0.1) with a fresh rng per call, so that
/// refitting with identical hyperparameters yields different factors.
pub fn init_factors(num_rows: usize, num_components: usize) -> DenseMatrix {

    let normal = Normal::new(0.0, 0.1);
    let mut rng = rand::weak_rng();

    (0..num_rows)
        .map(|_| (0..num_components).map(|_| normal.ind_sample(&mut rng)).collect())
        .collect()
}

pub fn items_by_user(train: &SparseBinaryMatrix) -> Vec<Vec<u32>> {
    train.iter()
        .map(|items| items.iter().cloned().collect())
        .collect()
}

pub fn users_by_item(train: &SparseBinaryMatrix, num_items: usize) -> Vec<Vec<u32>> {

    let mut index: Vec<Vec<u32>> = vec![Vec::new(); num_items];

    for (user, items) in train.iter().enumerate() {
        for &item in items.iter() {
            index[item as usize].push(user as u32);
        }
    }

    index
}
