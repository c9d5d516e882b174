// SPDX-License-Identifier: AGPL-3.0-only

//! Symmetry group acting on monomial exponent vectors.
//!
//! The governing equations of a truncation are invariant under a finite
//! group of signed permutations of the variables. An auxiliary-function
//! ansatz only needs one monomial per group orbit, and monomials that are
//! odd under any group element cannot appear at all: quotienting by the
//! group is the first reduction step.
//!
//! A [`SignedPermutation`] maps x_i → s_{σ(i)} x_{σ(i)}; acting on a
//! monomial x^α it permutes the exponent vector and multiplies by
//! Π s_i^{α_i} ∈ {+1, −1}. Orbits are computed by closing over the
//! generators, so the generating set need not be closed under composition.
//!
//! # The HK group
//!
//! Two physical symmetries of the standing-roll basis survive truncation:
//!
//! - half-wavelength translation x → x + π/k, which negates every mode with
//!   odd horizontal wavenumber (sin(m(kx+π)) = (−1)^m sin(mkx));
//! - horizontal reflection x → −x, ψ → −ψ(−x), which negates exactly the
//!   x-independent shear modes and fixes everything else.
//!
//! Both are sign-only, so HK orbits are singletons and the quotient reduces
//! to rejecting sign-odd monomials. The general signed-permutation form is
//! kept so a richer derived group can be supplied through the same type.

use crate::modes::{ModeKind, ModeSystem};
use std::collections::BTreeMap;

/// A signed permutation of the variables: x_i → sign · x_{perm[i]}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPermutation {
    /// Image index of each variable
    perm: Vec<usize>,
    /// Whether each variable picks up a sign flip
    flip: Vec<bool>,
}

impl SignedPermutation {
    /// General constructor.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is not a permutation of `0..len` or the lengths
    /// disagree — a malformed group element is a programming defect.
    #[must_use]
    pub fn new(perm: Vec<usize>, flip: Vec<bool>) -> Self {
        assert_eq!(perm.len(), flip.len(), "perm/flip length mismatch");
        let mut seen = vec![false; perm.len()];
        for &p in &perm {
            assert!(p < perm.len() && !seen[p], "not a permutation: {perm:?}");
            seen[p] = true;
        }
        Self { perm, flip }
    }

    /// Sign-only element (identity permutation).
    #[must_use]
    pub fn signs_only(flip: Vec<bool>) -> Self {
        let perm = (0..flip.len()).collect();
        Self { perm, flip }
    }

    /// Number of variables this element acts on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.perm.len()
    }

    /// True for the zero-variable element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    /// Act on a monomial: returns the permuted exponent vector and the sign
    /// the monomial picks up (+1 or −1).
    #[must_use]
    pub fn apply(&self, exps: &[u32]) -> (Vec<u32>, i8) {
        debug_assert_eq!(exps.len(), self.perm.len());
        let mut image = vec![0_u32; exps.len()];
        let mut sign = 1_i8;
        for (i, &e) in exps.iter().enumerate() {
            image[self.perm[i]] = e;
            if self.flip[i] && e % 2 == 1 {
                sign = -sign;
            }
        }
        (image, sign)
    }
}

/// A finite group of signed permutations, stored as generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryGroup {
    generators: Vec<SignedPermutation>,
}

impl SymmetryGroup {
    /// Group generated by the given elements.
    ///
    /// # Panics
    ///
    /// Panics if the generators act on differing variable counts.
    #[must_use]
    pub fn new(generators: Vec<SignedPermutation>) -> Self {
        if let Some(first) = generators.first() {
            assert!(
                generators.iter().all(|g| g.len() == first.len()),
                "generators act on differing variable counts"
            );
        }
        Self { generators }
    }

    /// The trivial group (every monomial is its own canonical form).
    #[must_use]
    pub fn trivial() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Generators of the group.
    #[must_use]
    pub fn generators(&self) -> &[SignedPermutation] {
        &self.generators
    }

    /// Canonical representative of a monomial's orbit, or `None` if the
    /// monomial is odd under some group element (it maps to minus itself
    /// and cannot appear in an invariant ansatz).
    ///
    /// The representative is the lexicographically smallest exponent vector
    /// in the orbit, making the choice deterministic.
    #[must_use]
    pub fn canonicalize(&self, exps: &[u32]) -> Option<Vec<u32>> {
        // BFS closure over generators, tracking the accumulated sign of
        // each orbit member. Reaching the same vector with both signs
        // means the monomial is annihilated by symmetrization.
        let mut orbit: BTreeMap<Vec<u32>, i8> = BTreeMap::new();
        orbit.insert(exps.to_vec(), 1);
        let mut frontier = vec![(exps.to_vec(), 1_i8)];

        while let Some((v, sign)) = frontier.pop() {
            for gen in &self.generators {
                let (image, s) = gen.apply(&v);
                let image_sign = sign * s;
                match orbit.get(&image) {
                    Some(&known) if known != image_sign => return None,
                    Some(_) => {}
                    None => {
                        orbit.insert(image.clone(), image_sign);
                        frontier.push((image, image_sign));
                    }
                }
            }
        }

        // BTreeMap iterates in lex order; first key is the representative.
        orbit.keys().next().cloned()
    }

    /// True if the monomial is the canonical representative of its orbit.
    #[must_use]
    pub fn is_canonical(&self, exps: &[u32]) -> bool {
        self.canonicalize(exps).is_some_and(|c| c == exps)
    }

    /// Equivalence predicate: same orbit, neither annihilated.
    #[must_use]
    pub fn is_equivalent(&self, a: &[u32], b: &[u32]) -> bool {
        match (self.canonicalize(a), self.canonicalize(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }
}

/// The physical symmetry group of an HK truncation (see module docs):
/// half-wavelength translation and horizontal reflection, both sign-only.
#[must_use]
pub fn hk_symmetry_group(sys: &ModeSystem) -> SymmetryGroup {
    let translation: Vec<bool> = (0..sys.num_vars())
        .map(|i| sys.var(i).1.m % 2 == 1)
        .collect();
    let reflection: Vec<bool> = (0..sys.num_vars())
        .map(|i| matches!(sys.var(i), (ModeKind::Stream, m) if m.m == 0))
        .collect();
    SymmetryGroup::new(vec![
        SignedPermutation::signs_only(translation),
        SignedPermutation::signs_only(reflection),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::ModeSystem;

    #[test]
    fn sign_only_rejects_odd_monomials() {
        let g = SymmetryGroup::new(vec![SignedPermutation::signs_only(vec![
            true, false, false,
        ])]);
        assert_eq!(g.canonicalize(&[1, 0, 0]), None);
        assert_eq!(g.canonicalize(&[3, 2, 0]), None);
        assert_eq!(g.canonicalize(&[2, 1, 0]), Some(vec![2, 1, 0]));
        assert_eq!(g.canonicalize(&[0, 5, 1]), Some(vec![0, 5, 1]));
    }

    #[test]
    fn permutation_orbits_canonicalize_to_lex_min() {
        // Swap variables 0 and 1.
        let swap = SignedPermutation::new(vec![1, 0, 2], vec![false, false, false]);
        let g = SymmetryGroup::new(vec![swap]);
        assert_eq!(g.canonicalize(&[2, 0, 1]), Some(vec![0, 2, 1]));
        assert_eq!(g.canonicalize(&[0, 2, 1]), Some(vec![0, 2, 1]));
        assert!(g.is_canonical(&[0, 2, 1]));
        assert!(!g.is_canonical(&[2, 0, 1]));
        assert!(g.is_equivalent(&[2, 0, 1], &[0, 2, 1]));
        assert!(!g.is_equivalent(&[2, 0, 1], &[1, 1, 1]));
    }

    #[test]
    fn signed_swap_annihilates_fixed_odd_monomials() {
        // x0 <-> x1 with a sign flip on the image of x0: x0 x1 maps to
        // -x0 x1, so it is annihilated; x0² x1² survives.
        let g = SymmetryGroup::new(vec![SignedPermutation::new(
            vec![1, 0],
            vec![true, false],
        )]);
        assert_eq!(g.canonicalize(&[1, 1]), None);
        assert_eq!(g.canonicalize(&[2, 2]), Some(vec![2, 2]));
    }

    #[test]
    fn trivial_group_keeps_everything() {
        let g = SymmetryGroup::trivial();
        assert!(g.is_canonical(&[3, 1, 4]));
    }

    #[test]
    fn hk_group_matches_mode_parities() {
        // HK4: 0=ψ01 (shear), 1=ψ11, 2=θ02, 3=θ11.
        let sys = ModeSystem::from_level(1).unwrap();
        let g = hk_symmetry_group(&sys);

        // Odd in a flipped variable: rejected.
        assert_eq!(g.canonicalize(&[1, 0, 0, 0]), None); // shear, reflection-odd
        assert_eq!(g.canonicalize(&[0, 1, 0, 0]), None); // ψ11, translation-odd
        assert_eq!(g.canonicalize(&[0, 0, 0, 1]), None); // θ11, translation-odd
        assert_eq!(g.canonicalize(&[0, 1, 0, 1]), Some(vec![0, 1, 0, 1]));

        // θ02 is even under both generators.
        assert_eq!(g.canonicalize(&[0, 0, 1, 0]), Some(vec![0, 0, 1, 0]));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let sys = ModeSystem::from_level(2).unwrap();
        let g = hk_symmetry_group(&sys);
        let v = vec![0, 2, 1, 0, 0, 0, 2, 0];
        if let Some(c) = g.canonicalize(&v) {
            assert_eq!(g.canonicalize(&c), Some(c.clone()));
        }
    }
}
