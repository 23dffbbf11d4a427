//! Fixed-size 2D grid used for control points, design variables and surfaces
//!
//! Storage is row-major with `kx` as the outer index, so flattening a grid
//! yields the same order the design vector uses.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    nx: usize,
    ny: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(kx, ky)` in grid order
    pub fn from_fn(nx: usize, ny: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nx * ny);
        for kx in 0..nx {
            for ky in 0..ny {
                data.push(f(kx, ky));
            }
        }
        Self { nx, ny, data }
    }

    /// Wrap a flat vector laid out in grid order
    pub fn from_vec(nx: usize, ny: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            nx * ny,
            "grid data length {} does not match {}x{}",
            data.len(),
            nx,
            ny
        );
        Self { nx, ny, data }
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values in grid order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// `((kx, ky), value)` pairs in grid order
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let ny = self.ny;
        self.data
            .iter()
            .enumerate()
            .map(move |(k, v)| ((k / ny, k % ny), v))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every cell, keeping the shape
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            nx: self.nx,
            ny: self.ny,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (kx, ky): (usize, usize)) -> &T {
        debug_assert!(kx < self.nx && ky < self.ny);
        &self.data[kx * self.ny + ky]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (kx, ky): (usize, usize)) -> &mut T {
        debug_assert!(kx < self.nx && ky < self.ny);
        &mut self.data[kx * self.ny + ky]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_order_is_kx_major() {
        let grid = Grid::from_fn(3, 2, |kx, ky| kx * 10 + ky);
        assert_eq!(grid.as_slice(), &[0, 1, 10, 11, 20, 21]);
        assert_eq!(grid[(2, 1)], 21);
    }

    #[test]
    fn test_indexed_matches_index() {
        let grid = Grid::from_fn(4, 5, |kx, ky| (kx, ky));
        for ((kx, ky), v) in grid.indexed() {
            assert_eq!(*v, (kx, ky));
            assert_eq!(grid[(kx, ky)], (kx, ky));
        }
    }

    #[test]
    #[should_panic]
    fn test_from_vec_rejects_wrong_length() {
        let _ = Grid::from_vec(2, 2, vec![1.0, 2.0, 3.0]);
    }
}
