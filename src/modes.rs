// SPDX-License-Identifier: AGPL-3.0-only

//! HK hierarchy mode generation and the variable-index contract.
//!
//! Truncated Rayleigh–Bénard models are identified by their retained Fourier
//! modes: stream-function modes ψ_{mn} and temperature modes θ_{mn}, where
//! `m` is the horizontal and `n` the vertical wavenumber index. The HK
//! hierarchy is an indexed family of such truncations of increasing mode
//! count; level 1 is the Lorenz truncation extended by the x-independent
//! shear mode ψ_{01} (the HK4 model, four variables), level 2 is HK8, and
//! so on.
//!
//! The recurrence walks anti-diagonals of the wavenumber lattice with a
//! cursor: whenever the cursor reaches the `n = 1` row it jumps to the next
//! vertical band and seeds two new `m = 0` modes. Which modes belong to
//! model HK-n is defined by this walk; every downstream computation depends
//! on reproducing it exactly.
//!
//! # Variable indexing
//!
//! The concatenated ordering — sorted stream-function modes first, then
//! sorted temperature modes — fixes the variable index used by the coupling
//! constructor and the monomial engine. [`ModeSystem`] owns this contract.

use crate::error::MonomError;
use serde::Serialize;

/// A single Fourier mode: horizontal and vertical wavenumber indices.
///
/// The derived `Ord` is lexicographic on `(m, n)`, which is exactly the
/// ordering the variable-index contract requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Mode {
    /// Horizontal wavenumber index (0 = x-independent)
    pub m: usize,
    /// Vertical wavenumber index (>= 1)
    pub n: usize,
}

impl Mode {
    /// Shorthand constructor used throughout tests and the generator.
    #[must_use]
    pub const fn new(m: usize, n: usize) -> Self {
        Self { m, n }
    }
}

/// Which field a mode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Velocity stream function ψ
    Stream,
    /// Temperature deviation θ
    Temp,
}

/// Generate the stream-function and temperature mode sets for one model in
/// the HK hierarchy.
///
/// Level 1 is the Lorenz truncation plus the shear mode: ψ ∈ {(0,1), (1,1)},
/// θ ∈ {(0,2), (1,1)}. Each further level advances a cursor through the
/// wavenumber lattice: on the `n = 1` row the cursor jumps to `(1, band)` and
/// seeds ψ_{0, 2·band−1} and θ_{0, 2·band}; otherwise it slides diagonally to
/// `(m+1, n−1)`. The cursor position is appended to both sets either way.
/// Both sets are returned sorted lexicographically by `(m, n)`.
///
/// Per-set cardinalities for levels 1..5 are 2, 4, 5, 7, 8; the two sets
/// always have equal size.
///
/// # Errors
///
/// Returns `MonomError::InvalidArgument` for `level < 1`; no partial mode
/// sets are produced.
pub fn hk_modes(level: i64) -> Result<(Vec<Mode>, Vec<Mode>), MonomError> {
    if level < 1 {
        return Err(MonomError::InvalidArgument(format!(
            "hierarchy level must be >= 1, got {level}"
        )));
    }

    let mut p_modes = vec![Mode::new(0, 1), Mode::new(1, 1)];
    let mut t_modes = vec![Mode::new(0, 2), Mode::new(1, 1)];

    let mut cursor = Mode::new(1, 1);

    for _ in 1..level {
        if cursor.n == 1 {
            let band = cursor.m + 1;
            cursor = Mode::new(1, band);
            p_modes.push(Mode::new(0, 2 * band - 1));
            t_modes.push(Mode::new(0, 2 * band));
        } else {
            cursor = Mode::new(cursor.m + 1, cursor.n - 1);
        }

        p_modes.push(cursor);
        t_modes.push(cursor);
    }

    p_modes.sort();
    t_modes.sort();

    Ok((p_modes, t_modes))
}

/// A fixed truncation: the two sorted mode sets plus the variable-index
/// mapping every other component depends on.
///
/// Indices 0..|stream| are stream-function modes in sorted order, followed
/// by temperature modes. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSystem {
    stream: Vec<Mode>,
    temp: Vec<Mode>,
}

impl ModeSystem {
    /// Build the truncation for one HK hierarchy level.
    ///
    /// # Errors
    ///
    /// Returns `MonomError::InvalidArgument` for `level < 1`.
    pub fn from_level(level: i64) -> Result<Self, MonomError> {
        let (stream, temp) = hk_modes(level)?;
        Ok(Self { stream, temp })
    }

    /// Build a truncation from explicit mode lists (sorted internally).
    #[must_use]
    pub fn from_modes(mut stream: Vec<Mode>, mut temp: Vec<Mode>) -> Self {
        stream.sort();
        temp.sort();
        Self { stream, temp }
    }

    /// Sorted stream-function modes.
    #[must_use]
    pub fn stream_modes(&self) -> &[Mode] {
        &self.stream
    }

    /// Sorted temperature modes.
    #[must_use]
    pub fn temp_modes(&self) -> &[Mode] {
        &self.temp
    }

    /// Total variable count |ψ modes| + |θ modes|.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.stream.len() + self.temp.len()
    }

    /// Resolve a variable index to its kind and mode.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_vars()` — an out-of-range index reaching this
    /// point is a programming defect, not a recoverable condition.
    #[must_use]
    pub fn var(&self, index: usize) -> (ModeKind, Mode) {
        if index < self.stream.len() {
            (ModeKind::Stream, self.stream[index])
        } else {
            (ModeKind::Temp, self.temp[index - self.stream.len()])
        }
    }

    /// Variable index of a mode, if present in the truncation.
    #[must_use]
    pub fn index_of(&self, kind: ModeKind, mode: Mode) -> Option<usize> {
        match kind {
            ModeKind::Stream => self.stream.binary_search(&mode).ok(),
            ModeKind::Temp => self
                .temp
                .binary_search(&mode)
                .ok()
                .map(|i| i + self.stream.len()),
        }
    }

    /// Conventional model name: "HK" followed by the variable count
    /// (HK4, HK8, ...).
    #[must_use]
    pub fn model_name(&self) -> String {
        format!("HK{}", self.num_vars())
    }
}
