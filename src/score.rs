//! Scoring and counting with degenerate residues.
//!
//! Scores and counts are indexed by code. Degenerate codes are resolved
//! against the canonical entries of the vector, either uniformly or weighted
//! by background residue frequencies.

use std::ops::{AddAssign, Div};

use crate::Alphabet;
use crate::alphabet::as_code;

/// Numeric types usable as residue scores.
///
/// Averages are computed in `f64` and converted back with
/// [`from_mean`](Self::from_mean); integer scores round half away from zero.
pub trait Score: Copy {
    /// Background frequency type paired with this score type.
    type Prob: Copy + Into<f64>;

    /// The score given to codes with no residues, such as the gap.
    const ZERO: Self;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Convert an average back to a score.
    fn from_mean(mean: f64) -> Self;
}

impl Score for i32 {
    type Prob = f32;
    const ZERO: Self = 0;

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_mean(mean: f64) -> Self {
        mean.round() as i32
    }
}

impl Score for f32 {
    type Prob = f32;
    const ZERO: Self = 0.0;

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_mean(mean: f64) -> Self {
        mean as f32
    }
}

impl Score for f64 {
    type Prob = f64;
    const ZERO: Self = 0.0;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_mean(mean: f64) -> Self {
        mean
    }
}

impl Alphabet {
    /// The mean of `sc` over the residues `code` stands for.
    ///
    /// Canonical codes simply get their own score. Codes standing for no
    /// residues (the gap, or anything out of range) score zero.
    ///
    /// # Panics
    ///
    /// Panics if `sc` has fewer than `K` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiseq::Alphabet;
    ///
    /// let dna = Alphabet::dna();
    /// let sc = [3, -6, 6, 1]; // A, C, G, T
    /// let r = dna.digitize_symbol(b'R').unwrap(); // A or G
    /// assert_eq!(dna.avg_score(r, &sc), 5); // 4.5 rounds away from zero
    /// ```
    #[must_use]
    pub fn avg_score<S: Score>(&self, code: u8, sc: &[S]) -> S {
        let n = self.ndegen.get(usize::from(code)).copied().unwrap_or(0);
        if n == 0 {
            return S::ZERO;
        }
        let sum: f64 = self
            .members(code)
            .map(|y| sc[usize::from(y)].to_f64())
            .sum();
        S::from_mean(sum / f64::from(n))
    }

    /// The expected score of `code` given background frequencies `p`.
    ///
    /// This is `Σ sc[y]·p[y] / Σ p[y]` over the residues `y` that `code`
    /// stands for. Codes standing for no residues score zero.
    ///
    /// # Panics
    ///
    /// Panics if `sc` or `p` has fewer than `K` entries.
    #[must_use]
    pub fn expect_score<S: Score>(&self, code: u8, sc: &[S], p: &[S::Prob]) -> S {
        if self.ndegen(code) == 0 {
            return S::ZERO;
        }
        let (total, norm) = self.members(code).fold((0.0, 0.0), |(total, norm), y| {
            let y = usize::from(y);
            let p: f64 = p[y].into();
            (total + sc[y].to_f64() * p, norm + p)
        });
        S::from_mean(total / norm)
    }

    /// Fill in the degenerate and "any" entries of a `Kp`-long score vector
    /// with [`avg_score`](Self::avg_score)s of its canonical entries.
    ///
    /// # Panics
    ///
    /// Panics if `sc` has fewer than `Kp` entries.
    pub fn avg_sc_vec<S: Score>(&self, sc: &mut [S]) {
        for x in self.k + 1..self.kp {
            sc[x] = self.avg_score(as_code(x), sc);
        }
    }

    /// Fill in the degenerate and "any" entries of a `Kp`-long score vector
    /// with [`expect_score`](Self::expect_score)s of its canonical entries.
    ///
    /// # Panics
    ///
    /// Panics if `sc` has fewer than `Kp` entries or `p` fewer than `K`.
    pub fn expect_sc_vec<S: Score>(&self, sc: &mut [S], p: &[S::Prob]) {
        for x in self.k + 1..self.kp {
            sc[x] = self.expect_score(as_code(x), sc, p);
        }
    }

    /// Count an observation of `code` with weight `wt` into `ct`.
    ///
    /// Canonical residues and the gap add `wt` to their own slot, so `ct`
    /// needs `K+1` entries if gaps are counted. Degenerate residues split `wt`
    /// evenly over the residues they stand for. Other codes are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `ct` is too short for the slot being counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiseq::Alphabet;
    ///
    /// let dna = Alphabet::dna();
    /// let mut ct = [0.0; 4];
    /// dna.count(&mut ct, dna.digitize_symbol(b'A').unwrap(), 1.0);
    /// dna.count(&mut ct, dna.digitize_symbol(b'W').unwrap(), 1.0); // A or T
    /// assert_eq!(ct, [1.5, 0.0, 0.0, 0.5]);
    /// ```
    pub fn count<C>(&self, ct: &mut [C], code: u8, wt: C)
    where
        C: Copy + AddAssign + Div<Output = C> + From<u8>,
    {
        let x = usize::from(code);
        if x <= self.k {
            ct[x] += wt;
        } else if x < self.kp {
            let share = wt / C::from(self.ndegen[x]);
            for y in self.members(code) {
                ct[usize::from(y)] += share;
            }
        }
    }

    /// Probability that residues `x` and `y` are identical.
    ///
    /// Degenerate residues are resolved uniformly, or weighted by background
    /// frequencies `p` when given. Anything that isn't a residue (gaps,
    /// nonresidues, codes out of range) never matches.
    ///
    /// ```
    /// use digiseq::Alphabet;
    ///
    /// let dna = Alphabet::dna();
    /// let code = |c| dna.digitize_symbol(c).unwrap();
    /// assert_eq!(dna.match_prob(code(b'R'), code(b'A'), None), 0.5);
    /// assert_eq!(dna.match_prob(code(b'N'), code(b'C'), None), 0.25);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `p` has fewer than `K` entries.
    #[must_use]
    pub fn match_prob(&self, x: u8, y: u8, p: Option<&[f64]>) -> f64 {
        if self.is_canonical(x) && self.is_canonical(y) {
            return if x == y { 1.0 } else { 0.0 };
        }
        if !self.is_residue(x) || !self.is_residue(y) {
            return 0.0;
        }
        let uniform = 1.0 / f64::from(as_code(self.k));
        let (dx, dy) = (self.degeneracy(x), self.degeneracy(y));
        let (mut sx, mut sy, mut both) = (0.0, 0.0, 0.0);
        for i in 0..self.k {
            let w = p.map_or(uniform, |p| p[i]);
            if dx[i] {
                sx += w;
            }
            if dy[i] {
                sy += w;
            }
            if dx[i] && dy[i] {
                both += w * w;
            }
        }
        both / (sx * sy)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::ProptestConfig;
    use proptest::proptest;

    use super::*;

    const SC: [i32; 4] = [-1, -6, 6, 1];
    const P: [f32; 4] = [0.4, 0.1, 0.1, 0.4];

    fn code(abc: &Alphabet, c: u8) -> u8 {
        abc.digitize_symbol(c).unwrap()
    }

    #[test]
    fn average_of_any() {
        let dna = Alphabet::dna();
        assert_eq!(dna.avg_score(code(&dna, b'N'), &SC), 0);
        let scf = SC.map(f64::from);
        assert!(dna.avg_score(code(&dna, b'N'), &scf).abs() < 1e-12);
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        let dna = Alphabet::dna();
        let r = code(&dna, b'R');
        assert_eq!(dna.avg_score(r, &[1, 0, 2, 0]), 2);
        assert_eq!(dna.avg_score(r, &[-1, 0, -2, 0]), -2);
        assert!((dna.avg_score(r, &[1.0f32, 0.0, 2.0, 0.0]) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn average_of_canonical_and_non_residues() {
        let dna = Alphabet::dna();
        assert_eq!(dna.avg_score(2, &SC), 6);
        assert_eq!(dna.avg_score(dna.gap_code(), &SC), 0);
        assert_eq!(dna.avg_score(dna.nonresidue_code(), &SC), 0);
    }

    #[test]
    fn expectation_weighted_by_frequency() {
        let dna = Alphabet::dna();
        let m = code(&dna, b'M');
        assert_eq!(dna.expect_score(m, &SC, &P), -2);
        let scd = SC.map(f64::from);
        let pd = P.map(f64::from);
        assert!((dna.expect_score(m, &scd, &pd) + 2.0).abs() < 1e-9);
        assert_eq!(dna.expect_score(dna.gap_code(), &SC, &P), 0);
    }

    #[test]
    fn score_vectors() {
        let dna = Alphabet::dna();
        let mut sc = [0; 16];
        sc[..4].copy_from_slice(&[2, 4, 6, 8]);
        sc[4] = -100;
        dna.avg_sc_vec(&mut sc);
        assert_eq!(sc[4], -100, "gap is left alone");
        assert_eq!(sc[usize::from(code(&dna, b'R'))], 4);
        assert_eq!(sc[usize::from(code(&dna, b'H'))], 5);
        assert_eq!(sc[15], 5);

        let mut sc = [0.0f32; 16];
        sc[..4].copy_from_slice(&[1.0, 0.0, 0.0, 0.0]);
        dna.expect_sc_vec(&mut sc, &[0.25, 0.25, 0.25, 0.25]);
        assert!((sc[usize::from(code(&dna, b'W'))] - 0.5).abs() < 1e-6);
        assert!((sc[15] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn counting() {
        let amino = Alphabet::amino();
        let mut ct = [0.0f64; 21];
        amino.count(&mut ct, code(&amino, b'B'), 2.0);
        amino.count(&mut ct, code(&amino, b'-'), 1.0);
        amino.count(&mut ct, amino.nonresidue_code(), 1.0);
        amino.count(&mut ct, 200, 1.0);
        assert_eq!(ct[usize::from(code(&amino, b'N'))], 1.0);
        assert_eq!(ct[usize::from(code(&amino, b'D'))], 1.0);
        assert_eq!(ct[20], 1.0);
        assert_eq!(ct.iter().sum::<f64>(), 3.0);

        let mut ct = [0.0f32; 20];
        amino.count(&mut ct, amino.any_code(), 1.0);
        assert!(ct.iter().all(|&c| (c - 0.05).abs() < 1e-7));
    }

    #[test]
    fn match_probabilities() {
        let dna = Alphabet::dna();
        let c = |s| code(&dna, s);
        assert_eq!(dna.match_prob(c(b'A'), c(b'A'), None), 1.0);
        assert_eq!(dna.match_prob(c(b'A'), c(b'C'), None), 0.0);
        assert_eq!(dna.match_prob(c(b'N'), c(b'R'), None), 0.25);
        assert_eq!(dna.match_prob(c(b'R'), c(b'R'), None), 0.5);
        assert_eq!(dna.match_prob(c(b'R'), c(b'Y'), None), 0.0);
        assert_eq!(dna.match_prob(c(b'-'), c(b'N'), None), 0.0);
        assert_eq!(dna.match_prob(c(b'N'), dna.gap_code(), None), 0.0);

        // A|C vs A, with A four times as common as C
        let p = [0.4, 0.1, 0.1, 0.4];
        let prob = dna.match_prob(c(b'M'), c(b'A'), Some(&p));
        assert!((prob - 0.8).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn counting_conserves_weight(codes in proptest::collection::vec(0u8..24, 0..100)) {
            let amino = Alphabet::amino();
            let mut ct = [0.0f64; 21];
            for &x in &codes {
                amino.count(&mut ct, x, 1.0);
            }
            let total: f64 = ct.iter().sum();
            assert!((total - codes.len() as f64).abs() < 1e-9);
        }

        #[test]
        fn identical_canonical_residues_always_match(x in 0u8..20) {
            let amino = Alphabet::amino();
            assert_eq!(amino.match_prob(x, x, None), 1.0);
        }
    }
}
