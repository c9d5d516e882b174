// SPDX-License-Identifier: AGPL-3.0-only

//! rbc-monoms — model construction and monomial reduction for SDP bounds
//! on truncated Rayleigh–Bénard convection.
//!
//! Builds the inputs for polynomial-optimization certificates: the HK
//! hierarchy of Fourier-mode truncations, the quadratic (triadic) coupling
//! structure of each resulting ODE system, and the symmetry- and
//! cancellation-reduced monomial basis for the auxiliary-function ansatz.
//!
//! ## Modules
//!   - `modes` — HK hierarchy recurrence and the variable-index contract
//!   - `coupling` — Galerkin projection of the advective Jacobians,
//!     conservation-law checks
//!   - `symmetry` — signed-permutation group acting on exponent vectors
//!   - `reduce` — monomial enumeration, symmetry quotient, cancellation
//!     fixed point
//!   - `pipeline` — orchestration and artifact output
//!   - `tolerances` — centralized numeric thresholds
//!
//! ## Binary
//!   - `reduce_monoms` — end-to-end run for one model:
//!     `reduce_monoms --hier=2 --deg=6 --out=Monoms`

#![warn(missing_docs)]

pub mod coupling;
pub mod error;
pub mod modes;
pub mod pipeline;
pub mod reduce;
pub mod symmetry;
pub mod tolerances;
