//! Natural cubic spline interpolation

use crate::validation::error::{TrackError, TrackResult, ValidationError};
use nalgebra::{DMatrix, DVector};

/// Piecewise cubic through a set of knots with zero curvature at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot
    second_derivatives: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Fit a spline through `(xs[i], ys[i])`. `xs` must be strictly increasing.
    pub fn fit(xs: &[f64], ys: &[f64]) -> TrackResult<Self> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return Err(ValidationError::InvalidKnots {
                xs: xs.len(),
                ys: ys.len(),
            }
            .into());
        }
        if let Some(index) = xs.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(ValidationError::NonIncreasingKnots { index: index + 1 }.into());
        }

        let n = xs.len();
        let mut second_derivatives = vec![0.0; n];

        // Two knots: the natural spline is the straight line between them.
        if n > 2 {
            let interior = Self::solve_interior(xs, ys)?;
            second_derivatives[1..n - 1].copy_from_slice(interior.as_slice());
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivatives,
        })
    }

    /// Solve the tridiagonal continuity system for the interior knots.
    fn solve_interior(xs: &[f64], ys: &[f64]) -> TrackResult<DVector<f64>> {
        let n = xs.len();
        let m = n - 2;
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        let mut system = DMatrix::<f64>::zeros(m, m);
        let mut rhs = DVector::<f64>::zeros(m);

        for row in 0..m {
            let i = row + 1;
            system[(row, row)] = 2.0 * (h[i - 1] + h[i]);
            if row > 0 {
                system[(row, row - 1)] = h[i - 1];
            }
            if row + 1 < m {
                system[(row, row + 1)] = h[i];
            }
            rhs[row] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        system.lu().solve(&rhs).ok_or_else(|| TrackError::Computation {
            operation: "natural cubic spline fit".to_string(),
            details: format!("singular {}x{} continuity system", m, m),
        })
    }

    pub fn knot_count(&self) -> usize {
        self.xs.len()
    }

    pub fn second_derivatives(&self) -> &[f64] {
        &self.second_derivatives
    }

    /// Value of the spline at `x`. Outside the knot range the end segments are extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let k = self
            .xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.xs[k], self.xs[k + 1]);
        let (y0, y1) = (self.ys[k], self.ys[k + 1]);
        let (m0, m1) = (self.second_derivatives[k], self.second_derivatives[k + 1]);

        let h = x1 - x0;
        let a = (x1 - x) / h;
        let b = (x - x0) / h;

        a * y0 + b * y1 + ((a.powi(3) - a) * m0 + (b.powi(3) - b) * m1) * h * h / 6.0
    }
}
