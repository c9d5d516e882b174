// SPDX-License-Identifier: AGPL-3.0-only

//! Quadratic (triadic) coupling structure of a truncated model.
//!
//! The quadratic right-hand side of the Boussinesq equations comes from the
//! two advective Jacobians J(ψ, θ) (temperature advection) and J(ψ, ∇²ψ)
//! (vorticity self-advection), J(a, b) = a_x b_z − a_z b_x. Projecting onto
//! a Fourier truncation turns each Jacobian into a list of triadic terms
//! ẋ_t += c · x_a x_b selected by the wavenumber sum/difference rules
//! m_t ∈ {m_a + m_b, |m_a − m_b|}, n_t ∈ {n_a + n_b, |n_a − n_b|}.
//!
//! # Basis convention
//!
//! Standing rolls on stress-free boundaries:
//!   ψ_{mn} ~ sin(m k x) sin(n π z)   (m = 0: sin(n π z), shear)
//!   θ_{mn} ~ cos(m k x) sin(n π z)   (m = 0: sin(n π z))
//!
//! with k the fundamental horizontal wavenumber. Product-to-sum expansion of
//! each Jacobian lands exactly on basis functions of this form; interactions
//! whose target falls outside the truncation are discarded, as in any
//! Galerkin truncation. In this convention the x-independent shear modes
//! have no quadratic couplings (standing rolls carry no Reynolds stress).
//!
//! # Conservation
//!
//! The exact Jacobians conserve ∫θ²/2 and the kinetic energy ∫|∇ψ|²/2, and
//! the projected terms inherit this triad by triad: [`conservation_residual`]
//! checks that the weighted cubic form Σ wᵢ xᵢ Qᵢ(x) vanishes identically.
//! Every constructed coupling is expected to pass at machine precision.

use crate::modes::{Mode, ModeKind, ModeSystem};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// One quadratic term: ẋ_target += coeff · x_a · x_b.
///
/// Indices follow the [`ModeSystem`] variable-index contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadTerm {
    /// Variable receiving the forcing
    pub target: usize,
    /// First source variable
    pub a: usize,
    /// Second source variable
    pub b: usize,
}

/// The full quadratic right-hand-side structure: index triples and their
/// coefficients, same length, in deterministic construction order.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupling {
    /// Index triples, ordered: temperature advection first (ψ index, then θ
    /// index ascending), then vorticity pairs (ascending)
    pub terms: Vec<QuadTerm>,
    /// Coefficient of each term, evaluated at the configured wavenumber
    pub coeffs: Vec<f64>,
}

impl Coupling {
    /// Number of quadratic terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the model has no quadratic terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Seam for the coupling derivation: the mode hierarchy and the monomial
/// engine consume this trait, not a concrete projection, so an alternative
/// phase convention can be substituted without touching either.
pub trait CouplingConstructor {
    /// Derive the quadratic coupling structure for a truncation.
    fn couple(&self, sys: &ModeSystem) -> Coupling;
}

/// Galerkin projection of the advective Jacobians in the standing-roll
/// basis (see module docs).
#[derive(Debug, Clone, Copy)]
pub struct GalerkinCoupling {
    /// Fundamental horizontal wavenumber k.
    pub wavenumber: f64,
}

/// Critical wavenumber of the Lorenz truncation, k² = π²/2.
pub const LORENZ_WAVENUMBER: f64 = PI * std::f64::consts::FRAC_1_SQRT_2;

impl GalerkinCoupling {
    /// Coupling constructor at wavenumber `k`.
    #[must_use]
    pub const fn new(wavenumber: f64) -> Self {
        Self { wavenumber }
    }

    /// Squared wavenumber magnitude κ² = (mk)² + (nπ)².
    #[must_use]
    pub fn kappa_sq(&self, mode: Mode) -> f64 {
        let kx = mode.m as f64 * self.wavenumber;
        let kz = mode.n as f64 * PI;
        kx * kx + kz * kz
    }
}

/// Push `coeff · x_a x_b` onto the target if the mode is retained.
fn push_if_retained(
    sys: &ModeSystem,
    kind: ModeKind,
    mode: Mode,
    a: usize,
    b: usize,
    coeff: f64,
    out: &mut Coupling,
) {
    if coeff == 0.0 || mode.n == 0 {
        return;
    }
    if let Some(target) = sys.index_of(kind, mode) {
        out.terms.push(QuadTerm { target, a, b });
        out.coeffs.push(coeff);
    }
}

impl CouplingConstructor for GalerkinCoupling {
    fn couple(&self, sys: &ModeSystem) -> Coupling {
        let k = self.wavenumber;
        let kpi = k * PI;
        let n_stream = sys.stream_modes().len();
        let mut out = Coupling {
            terms: Vec::new(),
            coeffs: Vec::new(),
        };

        // ═══════════════════════════════════════════════════════════
        // Temperature advection: θ̇ ⊃ −J(ψ, θ)
        // ═══════════════════════════════════════════════════════════
        for (si, &pm) in sys.stream_modes().iter().enumerate() {
            if pm.m == 0 {
                // Shear × θ forces the quadrature phase sin(m k x), which
                // the truncation does not carry.
                continue;
            }
            let (m1, n1) = (pm.m as i64, pm.n as i64);

            for (tj, &tm) in sys.temp_modes().iter().enumerate() {
                let j = n_stream + tj;
                let (m2, n2) = (tm.m as i64, tm.n as i64);
                let (sn, dn) = (n1 + n2, n1 - n2);

                if m2 == 0 {
                    // J(ψ_{m1,n1}, θ_{0,n2}) = m1 n2 kπ cos(m1 k x)
                    //     · ½[sin(sn πz) + sin(dn πz)]
                    let g = (m1 * n2) as f64 * kpi / 2.0;
                    let m_t = pm.m;
                    let tgt = |n: i64| Mode::new(m_t, n as usize);
                    push_if_retained(sys, ModeKind::Temp, tgt(sn), si, j, -g, &mut out);
                    if dn != 0 {
                        let c = g * dn.signum() as f64;
                        push_if_retained(
                            sys,
                            ModeKind::Temp,
                            tgt(dn.abs()),
                            si,
                            j,
                            -c,
                            &mut out,
                        );
                    }
                } else {
                    // Full product-to-sum expansion; targets are the four
                    // sum/difference combinations in cos-phase.
                    let (sm, dm) = (m1 + m2, m1 - m2);
                    let ap = (m1 * n2 + m2 * n1) as f64 * kpi / 4.0;
                    let am = (m1 * n2 - m2 * n1) as f64 * kpi / 4.0;
                    let tgt = |m: i64, n: i64| Mode::new(m as usize, n as usize);

                    push_if_retained(sys, ModeKind::Temp, tgt(dm.abs(), sn), si, j, -ap, &mut out);
                    push_if_retained(sys, ModeKind::Temp, tgt(sm, sn), si, j, -am, &mut out);
                    if dn != 0 {
                        let s = dn.signum() as f64;
                        push_if_retained(
                            sys,
                            ModeKind::Temp,
                            tgt(dm.abs(), dn.abs()),
                            si,
                            j,
                            -am * s,
                            &mut out,
                        );
                        push_if_retained(
                            sys,
                            ModeKind::Temp,
                            tgt(sm, dn.abs()),
                            si,
                            j,
                            -ap * s,
                            &mut out,
                        );
                    }
                }
            }
        }

        // ═══════════════════════════════════════════════════════════
        // Vorticity self-advection: ∂t∇²ψ ⊃ −J(ψ, ∇²ψ)
        // ═══════════════════════════════════════════════════════════
        //
        // Antisymmetrizing over an unordered pair (i, j) leaves the factor
        // (κᵢ² − κⱼ²) J(φᵢ, φⱼ); dividing the projected equation by −κ_t²
        // gives ψ̇_t = (κᵢ² − κⱼ²) ⟨J⟩ / κ_t². Equal-m pairs only force the
        // difference band m = 0, where sin(0) kills the projection.
        for i in 0..n_stream {
            let mi = sys.stream_modes()[i];
            if mi.m == 0 {
                continue;
            }
            for j in (i + 1)..n_stream {
                let mj = sys.stream_modes()[j];
                if mj.m == 0 {
                    continue;
                }
                let (m1, n1) = (mi.m as i64, mi.n as i64);
                let (m2, n2) = (mj.m as i64, mj.n as i64);
                let (sm, dm) = (m1 + m2, m1 - m2);
                let (sn, dn) = (n1 + n2, n1 - n2);
                let ap = (m1 * n2 + m2 * n1) as f64 * kpi / 4.0;
                let am = (m1 * n2 - m2 * n1) as f64 * kpi / 4.0;
                let swing = self.kappa_sq(mi) - self.kappa_sq(mj);

                let mut push = |m: i64, n: i64, g: f64| {
                    if m <= 0 || n <= 0 || g == 0.0 {
                        return;
                    }
                    let mode = Mode::new(m as usize, n as usize);
                    let coeff = swing * g / self.kappa_sq(mode);
                    push_if_retained(sys, ModeKind::Stream, mode, i, j, coeff, &mut out);
                };

                push(sm, sn, am);
                if dn != 0 {
                    push(sm, dn.abs(), ap * dn.signum() as f64);
                }
                if dm != 0 {
                    let sd = dm.signum() as f64;
                    push(dm.abs(), sn, -ap * sd);
                    if dn != 0 {
                        push(dm.abs(), dn.abs(), -am * sd * dn.signum() as f64);
                    }
                }
            }
        }

        out
    }
}

// ═══════════════════════════════════════════════════════════════════
// Conservation-law verification
// ═══════════════════════════════════════════════════════════════════

/// Maximum residual of the weighted cubic form Σ wᵢ xᵢ Qᵢ(x).
///
/// Terms are grouped by the cubic monomial x_t x_a x_b they contribute to;
/// within each group the weighted coefficients must cancel exactly if the
/// quadratic vector field conserves Σ wᵢ xᵢ²/2. Variables with weight zero
/// have their equations excluded, which restricts the check to one Jacobian
/// at a time (see [`temperature_weights`], [`kinetic_weights`]).
#[must_use]
pub fn conservation_residual(coupling: &Coupling, weights: &[f64]) -> f64 {
    let mut groups: BTreeMap<[usize; 3], f64> = BTreeMap::new();
    for (term, &c) in coupling.terms.iter().zip(&coupling.coeffs) {
        let w = weights[term.target];
        if w == 0.0 {
            continue;
        }
        let mut key = [term.target, term.a, term.b];
        key.sort_unstable();
        *groups.entry(key).or_insert(0.0) += w * c;
    }
    groups.values().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Mean-square of a basis function over the periodic cell: ½ for
/// x-independent modes, ¼ otherwise.
fn norm_sq(mode: Mode) -> f64 {
    if mode.m == 0 {
        0.5
    } else {
        0.25
    }
}

/// Weights under which temperature advection conserves Σ wᵢθᵢ²
/// (stream-function variables weighted zero).
#[must_use]
pub fn temperature_weights(sys: &ModeSystem) -> Vec<f64> {
    (0..sys.num_vars())
        .map(|i| match sys.var(i) {
            (ModeKind::Temp, mode) => norm_sq(mode),
            (ModeKind::Stream, _) => 0.0,
        })
        .collect()
}

/// Weights under which vorticity self-advection conserves the kinetic
/// energy Σ wᵢκᵢ²ψᵢ² (temperature variables weighted zero).
#[must_use]
pub fn kinetic_weights(sys: &ModeSystem, wavenumber: f64) -> Vec<f64> {
    let proj = GalerkinCoupling::new(wavenumber);
    (0..sys.num_vars())
        .map(|i| match sys.var(i) {
            (ModeKind::Stream, mode) => norm_sq(mode) * proj.kappa_sq(mode),
            (ModeKind::Temp, _) => 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerances;

    fn couple_level(level: i64) -> (ModeSystem, Coupling) {
        let sys = ModeSystem::from_level(level).unwrap();
        let coupling = GalerkinCoupling::new(LORENZ_WAVENUMBER).couple(&sys);
        (sys, coupling)
    }

    #[test]
    fn lorenz_triad_is_reproduced_exactly() {
        // HK4 variables: 0=ψ01, 1=ψ11, 2=θ02, 3=θ11. The only quadratic
        // interactions are the classic Lorenz pair.
        let (_, c) = couple_level(1);
        let kpi = LORENZ_WAVENUMBER * PI;

        assert_eq!(c.terms.len(), 2);
        assert_eq!(
            c.terms[0],
            QuadTerm {
                target: 3,
                a: 1,
                b: 2
            }
        );
        assert!((c.coeffs[0] - kpi).abs() < tolerances::EXACT_F64);
        assert_eq!(
            c.terms[1],
            QuadTerm {
                target: 2,
                a: 1,
                b: 3
            }
        );
        assert!((c.coeffs[1] + kpi / 2.0).abs() < tolerances::EXACT_F64);
    }

    #[test]
    fn shear_modes_are_quadratically_decoupled() {
        for level in 1..=4 {
            let (sys, c) = couple_level(level);
            let shear: Vec<usize> = (0..sys.num_vars())
                .filter(|&i| matches!(sys.var(i), (ModeKind::Stream, m) if m.m == 0))
                .collect();
            for term in &c.terms {
                for idx in shear.iter() {
                    assert_ne!(term.target, *idx, "level {level}: shear forced");
                    assert_ne!(term.a, *idx, "level {level}: shear as source");
                    assert_ne!(term.b, *idx, "level {level}: shear as source");
                }
            }
        }
    }

    #[test]
    fn temperature_variance_is_conserved() {
        for level in 1..=5 {
            let (sys, c) = couple_level(level);
            let w = temperature_weights(&sys);
            let r = conservation_residual(&c, &w);
            assert!(
                r < tolerances::EXACT_F64,
                "level {level}: theta residual {r}"
            );
        }
    }

    #[test]
    fn kinetic_energy_is_conserved() {
        for level in 1..=5 {
            let (sys, c) = couple_level(level);
            let w = kinetic_weights(&sys, LORENZ_WAVENUMBER);
            let r = conservation_residual(&c, &w);
            assert!(
                r < tolerances::EXACT_F64,
                "level {level}: kinetic residual {r}"
            );
        }
    }

    #[test]
    fn vorticity_terms_appear_once_triads_close() {
        // Levels 1 and 2 retain no closed ψ triad; level 3 adds (2,1),
        // closing {(1,1), (1,2), (2,1)}.
        let (sys1, c1) = couple_level(1);
        let stream_targets = |sys: &ModeSystem, c: &Coupling| {
            c.terms
                .iter()
                .filter(|t| matches!(sys.var(t.target), (ModeKind::Stream, _)))
                .count()
        };
        assert_eq!(stream_targets(&sys1, &c1), 0);

        let (sys3, c3) = couple_level(3);
        assert!(stream_targets(&sys3, &c3) > 0);
    }

    #[test]
    fn indices_are_in_range_and_lengths_match() {
        for level in 1..=5 {
            let (sys, c) = couple_level(level);
            assert_eq!(c.terms.len(), c.coeffs.len());
            let n = sys.num_vars();
            for term in &c.terms {
                assert!(term.target < n && term.a < n && term.b < n);
            }
            assert!(c.coeffs.iter().all(|v| v.is_finite() && *v != 0.0));
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let (sys, c1) = couple_level(4);
        let c2 = GalerkinCoupling::new(LORENZ_WAVENUMBER).couple(&sys);
        assert_eq!(c1, c2);
    }
}
