//! Numeric lookup capabilities: correction tables and threshold curves.
//!
//! The reader only needs "give me the content at these coordinates". The
//! binned implementations here follow fixed-bin histogram semantics: a
//! coordinate outside the axis range reads content `0.0`.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use std::fmt::Debug;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One-dimensional lookup versus pt.
pub trait Lookup1D: Debug + Send + Sync {
    /// Content of the bin containing `x`.
    fn content(&self, x: f64) -> f64;
}

/// Four-dimensional lookup versus (η, pt, z-vertex, φ).
pub trait Lookup4D: Debug + Send + Sync {
    /// Content of the bin containing `coords`.
    fn content(&self, coords: [f64; 4]) -> f64;
}

/// Parametric threshold `f(x)` used by the pile-up checks.
pub trait ThresholdCurve: Debug + Send + Sync {
    fn eval(&self, x: f64) -> f64;
}

/// Uniformly binned axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Axis {
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

impl Axis {
    pub fn new(bins: usize, low: f64, high: f64) -> Result<Self> {
        let axis = Self { bins, low, high };
        axis.validate()?;
        Ok(axis)
    }

    /// Checks that the axis has bins and a non-empty range.
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 || !(self.high > self.low) {
            return Err(Error::InvalidAxis {
                bins: self.bins,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Zero-based bin index, `None` for under/overflow and NaN.
    #[must_use]
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.low && x < self.high) {
            return None;
        }
        let width = (self.high - self.low) / self.bins as f64;
        let bin = ((x - self.low) / width) as usize;
        Some(bin.min(self.bins - 1))
    }
}

/// Binned 1-D table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinnedTable1D {
    axis: Axis,
    contents: Vec<f64>,
}

impl BinnedTable1D {
    pub fn new(axis: Axis, contents: Vec<f64>) -> Result<Self> {
        let table = Self { axis, contents };
        table.validate()?;
        Ok(table)
    }

    /// Table with a single value over `[low, high)`.
    pub fn uniform(value: f64, low: f64, high: f64) -> Result<Self> {
        Self::new(Axis::new(1, low, high)?, vec![value])
    }

    /// Checks the contents against the axis.
    pub fn validate(&self) -> Result<()> {
        self.axis.validate()?;
        if self.contents.len() != self.axis.bins {
            return Err(Error::TableShape {
                expected: self.axis.bins,
                actual: self.contents.len(),
            });
        }
        Ok(())
    }
}

impl Lookup1D for BinnedTable1D {
    fn content(&self, x: f64) -> f64 {
        self.axis
            .find_bin(x)
            .and_then(|bin| self.contents.get(bin))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Binned 4-D table, contents stored row-major (last axis fastest).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinnedTable4D {
    axes: [Axis; 4],
    contents: Vec<f64>,
}

impl BinnedTable4D {
    pub fn new(axes: [Axis; 4], contents: Vec<f64>) -> Result<Self> {
        let table = Self { axes, contents };
        table.validate()?;
        Ok(table)
    }

    /// Table with a single value over the given ranges.
    pub fn uniform(value: f64, ranges: [(f64, f64); 4]) -> Result<Self> {
        let axes = [
            Axis::new(1, ranges[0].0, ranges[0].1)?,
            Axis::new(1, ranges[1].0, ranges[1].1)?,
            Axis::new(1, ranges[2].0, ranges[2].1)?,
            Axis::new(1, ranges[3].0, ranges[3].1)?,
        ];
        Self::new(axes, vec![value])
    }

    /// Checks the contents against the axes.
    pub fn validate(&self) -> Result<()> {
        for axis in &self.axes {
            axis.validate()?;
        }
        let expected = self.axes.iter().map(|a| a.bins).product();
        if self.contents.len() != expected {
            return Err(Error::TableShape {
                expected,
                actual: self.contents.len(),
            });
        }
        Ok(())
    }
}

impl Lookup4D for BinnedTable4D {
    fn content(&self, coords: [f64; 4]) -> f64 {
        let mut index = 0usize;
        for (axis, x) in self.axes.iter().zip(coords) {
            let Some(bin) = axis.find_bin(x) else {
                return 0.0;
            };
            index = index * axis.bins + bin;
        }
        self.contents.get(index).copied().unwrap_or(0.0)
    }
}
