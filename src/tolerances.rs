// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized numeric tolerances with documented rationale.
//!
//! Every threshold used by the coupling checks and the cancellation test is
//! defined here. No ad-hoc magic numbers in the algorithms.

/// Tolerance for quantities that should be exact in f64 arithmetic.
///
/// The conservation residuals sum a handful of products of integer-derived
/// factors and k·π; cancellation is algebraic, so anything beyond a few ULPs
/// of rounding indicates a projection bug, not noise.
pub const EXACT_F64: f64 = 1e-10;

/// Relative tolerance for the linear-dependence test between leading-order
/// polynomials in the cancellation rule.
///
/// Coefficients are short sums of terms of comparable magnitude; cross-
/// multiplied comparisons lose at most ~2 digits, so 1e-9 separates genuine
/// proportionality from accidental near-misses by many orders of magnitude.
pub const CANCEL_REL: f64 = 1e-9;

/// Threshold below which an accumulated leading-order coefficient is
/// treated as an exact algebraic zero.
///
/// Exact cancellations (equal and opposite products) leave residues at the
/// scale of f64 rounding on O(1)–O(10²) quantities; 1e-12 clears those
/// without touching any genuine coefficient.
pub const COEFF_ZERO: f64 = 1e-12;
