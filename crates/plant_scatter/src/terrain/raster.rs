//! Raster storage for per-pixel terrain values.
//!
//! A [`Raster`] stores one `f64` per terrain pixel addressed as `[x][y]`; a
//! [`MonthlyRaster`] stacks one raster per month of the year.
use crate::error::{Error, Result};

/// Number of months carried by every monthly tensor.
pub const MONTHS: usize = 12;

/// A dense 2D grid of values with `[x][y]` addressing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Raster {
    dim_x: usize,
    dim_y: usize,
    data: Vec<f64>,
}

impl Raster {
    /// Create a new raster of the given dimensions, initializing all values to `value`.
    pub fn filled(dim_x: usize, dim_y: usize, value: f64) -> Self {
        Self {
            dim_x,
            dim_y,
            data: vec![value; dim_x * dim_y],
        }
    }

    /// Create a new raster of the given dimensions, initializing all values to zero.
    pub fn zeros(dim_x: usize, dim_y: usize) -> Self {
        Self::filled(dim_x, dim_y, 0.0)
    }

    /// Build a raster from nested rows where `rows[x][y]` is the value at `(x, y)`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim_x = rows.len();
        let dim_y = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(dim_x * dim_y);
        for row in rows {
            if row.len() != dim_y {
                return Err(Error::DimensionMismatch {
                    what: "raster row".into(),
                    expected: (dim_x, dim_y),
                    actual: (dim_x, row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dim_x, dim_y, data })
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(dim_x: usize, dim_y: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(dim_x * dim_y);
        for x in 0..dim_x {
            for y in 0..dim_y {
                data.push(f(x, y));
            }
        }
        Self { dim_x, dim_y, data }
    }

    /// Get the size of the raster as `(dim_x, dim_y)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.dim_x, self.dim_y)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.dim_x && y < self.dim_y, "raster index out of range");
        x * self.dim_y + y
    }

    /// Get the value at `(x, y)`. Panics if out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Get the value at `(x, y)`, or `None` if out of range.
    pub fn try_get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.dim_x && y < self.dim_y {
            Some(self.data[x * self.dim_y + y])
        } else {
            None
        }
    }

    /// Set the value at `(x, y)`. Panics if out of range.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Mutable access to the value at `(x, y)`. Panics if out of range.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut f64 {
        let i = self.index(x, y);
        &mut self.data[i]
    }

    /// Raw values in x-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest value, or `None` for an empty raster.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data.iter().copied().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Twelve rasters of identical dimensions, one per month.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyRaster {
    months: Vec<Raster>,
}

impl MonthlyRaster {
    /// Build from exactly [`MONTHS`] rasters that all share the same dimensions.
    pub fn new(months: Vec<Raster>) -> Result<Self> {
        if months.len() != MONTHS {
            return Err(Error::InvalidConfig(format!(
                "monthly raster needs {MONTHS} months, got {}",
                months.len()
            )));
        }
        let dims = months[0].dims();
        if let Some(bad) = months.iter().find(|m| m.dims() != dims) {
            return Err(Error::DimensionMismatch {
                what: "monthly raster month".into(),
                expected: dims,
                actual: bad.dims(),
            });
        }
        Ok(Self { months })
    }

    /// The same raster repeated for every month.
    pub fn uniform(raster: Raster) -> Self {
        Self {
            months: vec![raster; MONTHS],
        }
    }

    /// Build by evaluating `f(month, x, y)` for every month and pixel.
    pub fn from_fn(
        dim_x: usize,
        dim_y: usize,
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> Self {
        let months = (0..MONTHS)
            .map(|m| Raster::from_fn(dim_x, dim_y, |x, y| f(m, x, y)))
            .collect();
        Self { months }
    }

    /// Dimensions shared by every month.
    pub fn dims(&self) -> (usize, usize) {
        self.months[0].dims()
    }

    /// The raster for `month` (0-based). Panics if `month >= 12`.
    pub fn month(&self, month: usize) -> &Raster {
        &self.months[month]
    }

    /// The value for `month` at `(x, y)`.
    #[inline]
    pub fn get(&self, month: usize, x: usize, y: usize) -> f64 {
        self.months[month].get(x, y)
    }

    /// Multiply the value at `(x, y)` by `factor` in every month.
    pub fn scale_pixel(&mut self, x: usize, y: usize, factor: f64) {
        for m in &mut self.months {
            *m.get_mut(x, y) *= factor;
        }
    }

    /// Subtract `amount` from the value at `(x, y)` in every month.
    pub fn subtract_pixel(&mut self, x: usize, y: usize, amount: f64) {
        for m in &mut self.months {
            *m.get_mut(x, y) -= amount;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Raster> {
        self.months.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_uses_x_major_addressing() {
        let r = Raster::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(r.dims(), (2, 3));
        assert_eq!(r.get(0, 2), 3.0);
        assert_eq!(r.get(1, 0), 4.0);
        assert_eq!(r.try_get(2, 0), None);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Raster::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn monthly_requires_twelve_matching_months() {
        assert!(MonthlyRaster::new(vec![Raster::zeros(2, 2); 11]).is_err());

        let mut months = vec![Raster::zeros(2, 2); 12];
        months[5] = Raster::zeros(3, 2);
        assert!(matches!(
            MonthlyRaster::new(months).unwrap_err(),
            Error::DimensionMismatch { .. }
        ));
    }

    #[test]
    fn pixel_updates_touch_every_month() {
        let mut m = MonthlyRaster::from_fn(2, 2, |month, _, _| month as f64 + 1.0);
        m.scale_pixel(1, 1, 0.5);
        m.subtract_pixel(0, 0, 1.0);
        for month in 0..MONTHS {
            assert_eq!(m.get(month, 1, 1), (month as f64 + 1.0) * 0.5);
            assert_eq!(m.get(month, 0, 0), month as f64);
            assert_eq!(m.get(month, 0, 1), month as f64 + 1.0);
        }
    }

    #[test]
    fn min_max_spans_values() {
        let r = Raster::from_fn(3, 3, |x, y| (x * 3 + y) as f64);
        assert_eq!(r.min_max(), Some((0.0, 8.0)));
        assert_eq!(Raster::zeros(0, 0).min_max(), None);
    }
}
