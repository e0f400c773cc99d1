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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fnv::FnvHashSet;

/// Result type used to find the top-k scored items per user via a binary heap
#[derive(PartialEq, Debug)]
pub struct ScoredItem {
    pub item: u32,
    pub score: f64,
}

/// Ordering for our max-heap, note that we must use a special implementation here as there is no
/// total order on floating point numbers.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal,
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Items with the k highest scores, best first. Items contained in `excluded`
/// (the user's training history) never appear in the result.
pub fn top_k(scores: &[f64], excluded: &FnvHashSet<u32>, k: usize) -> Vec<u32> {

    let mut heap = BinaryHeap::with_capacity(k);

    for (item_index, &score) in scores.iter().enumerate() {

        let item = item_index as u32;

        if excluded.contains(&item) {
            continue;
        }

        let scored_item = ScoredItem { item, score };

        if heap.len() < k {
            heap.push(scored_item);
        } else {
            let mut top = heap.peek_mut().unwrap();
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec().into_iter()
        .map(|scored_item| scored_item.item)
        .collect()
}
