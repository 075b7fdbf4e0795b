//! Rectangular ray-by-gate arrays

/// Row-major array with one row per radial and one column per gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateGrid<T> {
    nrays: usize,
    ngates: usize,
    values: Vec<T>,
}

impl<T: Copy> GateGrid<T> {
    pub(crate) fn filled(nrays: usize, ngates: usize, value: T) -> Self {
        Self {
            nrays,
            ngates,
            values: vec![value; nrays * ngates],
        }
    }

    /// Number of rows (radials)
    #[must_use]
    pub fn nrays(&self) -> usize {
        self.nrays
    }

    /// Number of columns (gates)
    #[must_use]
    pub fn ngates(&self) -> usize {
        self.ngates
    }

    /// `(nrays, ngates)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrays, self.ngates)
    }

    /// Value at one ray and gate
    #[must_use]
    pub fn get(&self, ray: usize, gate: usize) -> Option<T> {
        if ray >= self.nrays || gate >= self.ngates {
            return None;
        }
        Some(self.values[ray * self.ngates + gate])
    }

    /// One radial's gates
    #[must_use]
    pub fn row(&self, ray: usize) -> Option<&[T]> {
        (ray < self.nrays).then(|| &self.values[ray * self.ngates..(ray + 1) * self.ngates])
    }

    pub(crate) fn row_mut(&mut self, ray: usize) -> &mut [T] {
        &mut self.values[ray * self.ngates..(ray + 1) * self.ngates]
    }

    /// Iterate rows in ray order
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.nrays).map(move |ray| &self.values[ray * self.ngates..(ray + 1) * self.ngates])
    }

    /// All values in row-major order
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Apply `f` to every value
    pub fn map<U, F>(&self, f: F) -> GateGrid<U>
    where
        F: FnMut(T) -> U,
    {
        GateGrid {
            nrays: self.nrays,
            ngates: self.ngates,
            values: self.values.iter().copied().map(f).collect(),
        }
    }
}
