/*
 * Distance Table Module
 *
 * A symmetric N x N table of squared distances between every pair of boids,
 * rebuilt once per frame before any neighbor lookups. Squared distances
 * avoid a square root per pair in the hot loop.
 *
 * Rows are independent, so the table can be filled on the rayon pool.
 * Each entry is computed the same way on either path, which keeps
 * sequential and parallel fills bit-identical.
 */

use rayon::prelude::*;

use crate::vector::Vector2;

#[derive(Clone, Debug, Default)]
pub struct DistanceTable {
    size: usize,
    data: Vec<f64>,
}

impl DistanceTable {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn resize(&mut self, size: usize) {
        self.size = size;
        self.data.clear();
        self.data.resize(size * size, 0.0);
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    // Fill each unordered pair once and mirror it
    pub fn compute(&mut self, positions: &[Vector2]) {
        if positions.len() != self.size {
            self.resize(positions.len());
        }
        let n = self.size;
        for i in 0..n {
            self.data[i * n + i] = 0.0;
            for j in (i + 1)..n {
                let distance = positions[i].distance_2(&positions[j]);
                self.data[i * n + j] = distance;
                self.data[j * n + i] = distance;
            }
        }
    }

    // Fill rows in parallel; every row is computed in full
    pub fn compute_parallel(&mut self, positions: &[Vector2]) {
        if positions.len() != self.size {
            self.resize(positions.len());
        }
        let n = self.size;
        if n == 0 {
            return;
        }
        self.data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (j, entry) in row.iter_mut().enumerate() {
                // lower index first so both halves use the same operand order
                *entry = if i <= j {
                    positions[i].distance_2(&positions[j])
                } else {
                    positions[j].distance_2(&positions[i])
                };
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    fn random_positions(count: usize, seed: u64) -> Vec<Vector2> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| Vector2::new(rng.gen_range(-300.0..300.0), rng.gen_range(-300.0..300.0)))
            .collect()
    }

    #[test]
    fn table_is_symmetric_with_zero_diagonal() {
        let positions = random_positions(40, 1);
        let mut table = DistanceTable::new(positions.len());
        table.compute(&positions);

        for i in 0..positions.len() {
            assert_eq!(table.get(i, i), 0.0);
            for j in 0..positions.len() {
                assert_eq!(table.get(i, j), table.get(j, i));
                assert_eq!(table.get(i, j), positions[i].distance_2(&positions[j]));
            }
        }
    }

    #[test]
    fn parallel_fill_matches_sequential_fill() {
        let positions = random_positions(97, 2);
        let mut sequential = DistanceTable::new(positions.len());
        let mut parallel = DistanceTable::new(positions.len());
        sequential.compute(&positions);
        parallel.compute_parallel(&positions);

        for i in 0..positions.len() {
            assert_eq!(sequential.row(i), parallel.row(i));
        }
    }

    #[test]
    fn compute_resizes_to_match_positions() {
        let mut table = DistanceTable::new(2);
        table.compute(&[Vector2::ZERO, Vector2::new(3.0, 4.0), Vector2::new(0.0, 1.0)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0, 1), 25.0);
        assert_eq!(table.get(2, 0), 1.0);

        table.compute_parallel(&[]);
        assert!(table.is_empty());
    }
}
