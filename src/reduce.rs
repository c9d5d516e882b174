// SPDX-License-Identifier: AGPL-3.0-only

//! Monomial enumeration and reduction for the auxiliary-function ansatz.
//!
//! The SDP ansatz is a polynomial in the model variables; its candidate
//! monomials are exponent vectors of length `num_vars` with degree up to
//! `max_degree`. The full lattice grows combinatorially, so the engine runs
//! three deterministic passes:
//!
//! 1. **Enumeration** — degree by degree, in lexicographic order, never
//!    holding more than one unfiltered degree slice in memory;
//! 2. **Symmetry quotient** — reject monomials that are odd under the
//!    symmetry group and keep one lex-minimal representative per orbit
//!    (the *seed* basis);
//! 3. **Cancellation fixed point** — repeatedly scan surviving pairs and
//!    drop the later member of each cancelling pair until a full pass
//!    changes nothing. Terminates because every productive pass strictly
//!    shrinks the basis.
//!
//! Output is bit-identical across runs for fixed inputs: all tie-breaking
//! uses the single (degree, lex) enumeration order, and the parallel
//! symmetry filter preserves it.

use crate::coupling::Coupling;
use crate::error::MonomError;
use crate::symmetry::SymmetryGroup;
use crate::tolerances;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Total degree of an exponent vector.
#[must_use]
pub fn degree(exps: &[u32]) -> u32 {
    exps.iter().sum()
}

/// All exponent vectors of the given length and exact total degree, in
/// ascending lexicographic order.
#[must_use]
pub fn degree_slice(num_vars: usize, deg: u32) -> Vec<Vec<u32>> {
    let mut out = Vec::new();
    let mut buf = vec![0_u32; num_vars];
    fill_slice(&mut out, &mut buf, 0, deg);
    out
}

fn fill_slice(out: &mut Vec<Vec<u32>>, buf: &mut Vec<u32>, pos: usize, remaining: u32) {
    if pos + 1 == buf.len() {
        buf[pos] = remaining;
        out.push(buf.clone());
        return;
    }
    for e in 0..=remaining {
        buf[pos] = e;
        fill_slice(out, buf, pos + 1, remaining - e);
    }
    buf[pos] = 0;
}

// ═══════════════════════════════════════════════════════════════════
// Cancellation rules
// ═══════════════════════════════════════════════════════════════════

/// Predicate deciding whether two monomials form a cancellation pair, i.e.
/// whether keeping both adds nothing to the span of achievable
/// leading-order terms. Pluggable so the physical derivation can be
/// swapped without touching the reduction control flow.
pub trait CancellationRule {
    /// True if `a` and `b` cancel and one of them is redundant.
    fn cancels(&self, a: &[u32], b: &[u32]) -> bool;
}

/// Rule that never cancels; reduces the engine to the symmetry quotient.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCancellation;

impl CancellationRule for NoCancellation {
    fn cancels(&self, _a: &[u32], _b: &[u32]) -> bool {
        false
    }
}

/// Highest-degree cancellation under the quadratic vector field.
///
/// For a monomial x^α of top degree D, the degree-(D+1) part of its time
/// derivative is Σᵢ αᵢ x^(α−eᵢ) Qᵢ(x), with Qᵢ the quadratic right-hand
/// side of variable i. Two top-degree monomials cancel when these leading
/// polynomials are nonzero and linearly dependent: a single representative
/// then spans the same leading-order direction, and the other member is
/// redundant in the ansatz.
#[derive(Debug, Clone)]
pub struct LeadingTermRule {
    top_degree: u32,
    /// Quadratic terms grouped by target variable: (a, b, coeff)
    by_target: Vec<Vec<(usize, usize, f64)>>,
}

impl LeadingTermRule {
    /// Build the rule from a model's coupling structure.
    ///
    /// # Panics
    ///
    /// Panics if a coupling index is out of range for `num_vars` — a
    /// malformed coupling reaching the reduction engine is a programming
    /// defect, not a recoverable condition.
    #[must_use]
    pub fn new(coupling: &Coupling, num_vars: usize, top_degree: u32) -> Self {
        let mut by_target = vec![Vec::new(); num_vars];
        for (term, &c) in coupling.terms.iter().zip(&coupling.coeffs) {
            assert!(
                term.target < num_vars && term.a < num_vars && term.b < num_vars,
                "coupling index out of range for {num_vars} variables"
            );
            by_target[term.target].push((term.a, term.b, c));
        }
        Self {
            top_degree,
            by_target,
        }
    }

    /// Degree-(D+1) part of d/dt x^α under the quadratic vector field,
    /// as a coefficient map keyed by exponent vector.
    fn leading_poly(&self, exps: &[u32]) -> BTreeMap<Vec<u32>, f64> {
        let mut poly: BTreeMap<Vec<u32>, f64> = BTreeMap::new();
        for (i, &e) in exps.iter().enumerate() {
            if e == 0 {
                continue;
            }
            for &(a, b, c) in &self.by_target[i] {
                let mut key = exps.to_vec();
                key[i] -= 1;
                key[a] += 1;
                key[b] += 1;
                *poly.entry(key).or_insert(0.0) += f64::from(e) * c;
            }
        }
        poly.retain(|_, v| v.abs() > tolerances::COEFF_ZERO);
        poly
    }
}

impl CancellationRule for LeadingTermRule {
    fn cancels(&self, a: &[u32], b: &[u32]) -> bool {
        if degree(a) != self.top_degree || degree(b) != self.top_degree {
            return false;
        }
        let pa = self.leading_poly(a);
        let pb = self.leading_poly(b);
        if pa.is_empty() || pa.len() != pb.len() {
            return false;
        }

        // Proportionality by cross-multiplication against the first entry,
        // so no division and no sign assumptions.
        let Some((k0, &va0)) = pa.iter().next() else {
            return false;
        };
        let Some(&vb0) = pb.get(k0) else {
            return false;
        };
        for (key, &va) in &pa {
            let Some(&vb) = pb.get(key) else {
                return false;
            };
            let lhs = va * vb0;
            let rhs = vb * va0;
            let scale = lhs.abs().max(rhs.abs()).max(1.0);
            if (lhs - rhs).abs() > tolerances::CANCEL_REL * scale {
                return false;
            }
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════════
// Reduction engine
// ═══════════════════════════════════════════════════════════════════

/// Result of a reduction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Surviving basis after symmetry quotient and cancellation, in
    /// (degree, lex) order
    pub reduced: Vec<Vec<u32>>,
    /// Basis after the symmetry quotient only (superset of `reduced`)
    pub seed: Vec<Vec<u32>>,
    /// Monomial counts after each stage: full lattice, symmetry quotient,
    /// then one entry per cancellation pass (the last pass repeats the
    /// final count, marking the fixed point)
    pub stage_counts: Vec<usize>,
}

/// Enumerate and reduce the monomial basis for `num_vars` variables up to
/// `max_degree`.
///
/// An empty reduced basis is a valid result; callers decide whether an
/// empty ansatz is acceptable.
///
/// # Errors
///
/// Returns `MonomError::InvalidArgument` for `num_vars < 1` or
/// `max_degree < 0`, before any enumeration work.
///
/// # Panics
///
/// Panics if the group's generators act on a different variable count — a
/// mismatched group reaching the engine is a programming defect.
pub fn reduce_monomials(
    num_vars: i64,
    max_degree: i64,
    group: &SymmetryGroup,
    rule: &dyn CancellationRule,
) -> Result<Reduction, MonomError> {
    if num_vars < 1 {
        return Err(MonomError::InvalidArgument(format!(
            "num_vars must be >= 1, got {num_vars}"
        )));
    }
    if max_degree < 0 {
        return Err(MonomError::InvalidArgument(format!(
            "max_degree must be >= 0, got {max_degree}"
        )));
    }
    let nv = num_vars as usize;
    let top = max_degree as u32;
    if let Some(gen) = group.generators().first() {
        assert_eq!(gen.len(), nv, "symmetry group acts on wrong variable count");
    }

    // Pass 1 + 2: enumerate one degree slice at a time and quotient it
    // immediately, so rejected monomials are never accumulated.
    let mut seed: Vec<Vec<u32>> = Vec::new();
    let mut lattice_total = 0_usize;
    for d in 0..=top {
        let slice = degree_slice(nv, d);
        lattice_total += slice.len();
        let kept: Vec<Vec<u32>> = slice
            .into_par_iter()
            .filter(|v| group.is_canonical(v))
            .collect();
        seed.extend(kept);
    }

    // Pass 3: cancellation to a fixed point. Scanning in (degree, lex)
    // order and dropping the later member keeps the lex-smaller
    // representative of every cancelling pair.
    let mut basis = seed.clone();
    let mut stage_counts = vec![lattice_total, seed.len()];
    loop {
        let mut dropped = vec![false; basis.len()];
        let mut changed = false;
        for i in 0..basis.len() {
            if dropped[i] {
                continue;
            }
            for j in (i + 1)..basis.len() {
                if !dropped[j] && rule.cancels(&basis[i], &basis[j]) {
                    dropped[j] = true;
                    changed = true;
                }
            }
        }
        if changed {
            basis = basis
                .into_iter()
                .zip(dropped)
                .filter_map(|(m, gone)| (!gone).then_some(m))
                .collect();
        }
        stage_counts.push(basis.len());
        if !changed {
            break;
        }
    }

    Ok(Reduction {
        reduced: basis,
        seed,
        stage_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::{Coupling, QuadTerm};
    use crate::symmetry::{SignedPermutation, SymmetryGroup};

    /// ẋ = xy, ẏ = −x²; conserves x² + y², so x^D and y^D pair up.
    fn toy_coupling() -> Coupling {
        Coupling {
            terms: vec![
                QuadTerm {
                    target: 0,
                    a: 0,
                    b: 1,
                },
                QuadTerm {
                    target: 1,
                    a: 0,
                    b: 0,
                },
            ],
            coeffs: vec![1.0, -1.0],
        }
    }

    #[test]
    fn degree_slice_is_lex_ascending_and_complete() {
        let slice = degree_slice(3, 2);
        assert_eq!(slice.len(), 6); // C(4,2)
        assert_eq!(slice.first().unwrap(), &vec![0, 0, 2]);
        assert_eq!(slice.last().unwrap(), &vec![2, 0, 0]);
        for w in slice.windows(2) {
            assert!(w[0] < w[1], "not lex ascending: {:?} {:?}", w[0], w[1]);
        }
    }

    #[test]
    fn trivial_group_keeps_full_lattice() {
        let r = reduce_monomials(2, 3, &SymmetryGroup::trivial(), &NoCancellation).unwrap();
        // 1 + 2 + 3 + 4 vectors
        assert_eq!(r.seed.len(), 10);
        assert_eq!(r.reduced, r.seed);
        assert_eq!(r.stage_counts, vec![10, 10, 10]);
    }

    #[test]
    fn degree_zero_returns_only_the_constant() {
        let r = reduce_monomials(3, 0, &SymmetryGroup::trivial(), &NoCancellation).unwrap();
        assert_eq!(r.reduced, vec![vec![0, 0, 0]]);
        assert_eq!(r.stage_counts, vec![1, 1, 1]);
    }

    #[test]
    fn rejects_invalid_arguments() {
        let g = SymmetryGroup::trivial();
        assert!(reduce_monomials(0, 3, &g, &NoCancellation).is_err());
        assert!(reduce_monomials(-2, 3, &g, &NoCancellation).is_err());
        assert!(reduce_monomials(3, -1, &g, &NoCancellation).is_err());
    }

    #[test]
    fn symmetry_quotient_drops_odd_monomials() {
        // Negating x0 must eliminate every monomial with odd exponent on it.
        let g = SymmetryGroup::new(vec![SignedPermutation::signs_only(vec![true, false])]);
        let r = reduce_monomials(2, 2, &g, &NoCancellation).unwrap();
        assert_eq!(
            r.seed,
            vec![vec![0, 0], vec![0, 1], vec![0, 2], vec![2, 0]]
        );
        assert_eq!(r.stage_counts[0], 6);
    }

    #[test]
    fn leading_term_rule_cancels_conserved_pair() {
        let rule = LeadingTermRule::new(&toy_coupling(), 2, 2);
        // 2x·(xy) and 2y·(−x²) are proportional: x² and y² cancel.
        assert!(rule.cancels(&[2, 0], &[0, 2]));
        assert!(rule.cancels(&[0, 2], &[2, 0]));
        // xy leads to xy² − x³, independent of both.
        assert!(!rule.cancels(&[1, 1], &[0, 2]));
        assert!(!rule.cancels(&[1, 1], &[2, 0]));
        // Below top degree the rule does not apply.
        assert!(!rule.cancels(&[1, 0], &[0, 1]));
    }

    #[test]
    fn cancellation_drops_the_lex_larger_member() {
        let rule = LeadingTermRule::new(&toy_coupling(), 2, 2);
        let r = reduce_monomials(2, 2, &SymmetryGroup::trivial(), &rule).unwrap();
        assert!(r.seed.contains(&vec![2, 0]));
        assert!(!r.reduced.contains(&vec![2, 0]), "lex-larger member kept");
        assert!(r.reduced.contains(&vec![0, 2]));
        assert_eq!(r.stage_counts, vec![6, 6, 5, 5]);
    }

    #[test]
    fn reduction_is_deterministic() {
        let rule = LeadingTermRule::new(&toy_coupling(), 2, 4);
        let g = SymmetryGroup::trivial();
        let r1 = reduce_monomials(2, 4, &g, &rule).unwrap();
        let r2 = reduce_monomials(2, 4, &g, &rule).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(format!("{r1:?}"), format!("{r2:?}"));
    }

    #[test]
    fn reduced_is_subset_of_seed() {
        let rule = LeadingTermRule::new(&toy_coupling(), 2, 4);
        let r = reduce_monomials(2, 4, &SymmetryGroup::trivial(), &rule).unwrap();
        for m in &r.reduced {
            assert!(r.seed.contains(m));
        }
        assert!(r.reduced.len() <= r.seed.len());
    }
}
