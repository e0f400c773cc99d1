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

use types;
use types::{DenseMatrix, DenseVector};

#[inline(always)]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline(always)]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Gram matrix FᵀF of a factor matrix, the shared part of the normal
/// equations in the alternating least squares updates.
pub fn gram(factors: &DenseMatrix, num_components: usize) -> DenseMatrix {

    let mut result = types::new_dense_matrix(num_components, num_components);

    for row in factors.iter() {
        for f in 0..num_components {
            let value = row[f];
            if value == 0.0 {
                continue;
            }
            for g in 0..num_components {
                result[f][g] += value * row[g];
            }
        }
    }

    result
}

/// Solves the dense linear system `a * x = b` via Gaussian elimination with
/// partial pivoting. The systems solved here are the tiny regularized d×d
/// normal equations of the factorization models, so no sophistication needed.
pub fn solve(mut a: DenseMatrix, mut b: DenseVector) -> DenseVector {

    let n = b.len();

    for pivot in 0..n {

        let mut max_row = pivot;
        for row in (pivot + 1)..n {
            if a[row][pivot].abs() > a[max_row][pivot].abs() {
                max_row = row;
            }
        }
        a.swap(pivot, max_row);
        b.swap(pivot, max_row);

        let pivot_value = a[pivot][pivot];
        if pivot_value.abs() < 1e-12 {
            continue;
        }

        for row in (pivot + 1)..n {
            let factor = a[row][pivot] / pivot_value;
            if factor == 0.0 {
                continue;
            }
            for column in pivot..n {
                let upper = a[pivot][column];
                a[row][column] -= factor * upper;
            }
            let rhs = b[pivot];
            b[row] -= factor * rhs;
        }
    }

    let mut x = types::new_dense_vector(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for column in (row + 1)..n {
            sum -= a[row][column] * x[column];
        }
        let pivot_value = a[row][row];
        x[row] = if pivot_value.abs() < 1e-12 { 0.0 } else { sum / pivot_value };
    }

    x
}


#[cfg(test)]
mod tests {

    use linalg;

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-9
    }

    #[test]
    fn dot_product() {
        assert!(close_enough_to(linalg::dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0));
        assert!(close_enough_to(linalg::dot(&[], &[]), 0.0));
    }

    #[test]
    fn sigmoid_at_zero() {
        assert!(close_enough_to(linalg::sigmoid(0.0), 0.5));
        assert!(linalg::sigmoid(10.0) > 0.999);
        assert!(linalg::sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn gram_of_small_matrix() {

        let factors = vec![
            vec![1.0, 2.0],
            vec![3.0, 4.0],
        ];

        let gram = linalg::gram(&factors, 2);

        assert!(close_enough_to(gram[0][0], 10.0));
        assert!(close_enough_to(gram[0][1], 14.0));
        assert!(close_enough_to(gram[1][0], 14.0));
        assert!(close_enough_to(gram[1][1], 20.0));
    }

    #[test]
    fn solve_small_system() {

        // 2x + y = 5, x + 3y = 10
        let a = vec![
            vec![2.0, 1.0],
            vec![1.0, 3.0],
        ];
        let b = vec![5.0, 10.0];

        let x = linalg::solve(a, b);

        assert!(close_enough_to(x[0], 1.0));
        assert!(close_enough_to(x[1], 3.0));
    }

    #[test]
    fn solve_requires_pivoting() {

        let a = vec![
            vec![0.0, 1.0, 1.0],
            vec![2.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
        ];
        let b = vec![5.0, 5.0, 3.0];

        let x = linalg::solve(a, b);

        // y + z = 5, 2x + y = 5, x + z = 3
        assert!(close_enough_to(x[0], 1.0));
        assert!(close_enough_to(x[1], 3.0));
        assert!(close_enough_to(x[2], 2.0));
    }
}
