//! Digital alphabets: symbol tables, input maps and degeneracy sets.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use crate::builder::AlphabetBuilder;
use crate::error::{Error, Result};

/// Largest supported `Kp`.
///
/// Keeping every code, the nonresidue code and [`SENTINEL`](crate::SENTINEL)
/// below 128 guarantees they never collide.
pub const MAX_KP: usize = 127;

// Codes are always below `MAX_KP`, so this never truncates.
pub(crate) fn as_code(x: usize) -> u8 {
    u8::try_from(x).expect("BUG: alphabet code out of range")
}

/// What sort of residues an [`Alphabet`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlphabetKind {
    /// Not determined
    Unknown,
    /// Ribonucleotides (`ACGU`)
    Rna,
    /// Deoxyribonucleotides (`ACGT`)
    Dna,
    /// The 20 standard amino acids
    Amino,
    /// A caller-defined alphabet
    Nonstandard,
}

impl AlphabetKind {
    /// Whether this is [`Dna`](Self::Dna) or [`Rna`](Self::Rna).
    #[must_use]
    pub fn is_nucleic(self) -> bool {
        matches!(self, Self::Dna | Self::Rna)
    }

    /// Guess the kind of a sequence from its letter composition.
    ///
    /// `counts[i]` is how many times the `i`th letter of `A..=Z` (case folded)
    /// was seen. The guess is conservative: `None` is returned for small
    /// samples or whenever the composition isn't clearly nucleic or protein.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiseq::AlphabetKind;
    ///
    /// let mut counts = [0u64; 26];
    /// for c in "GATTACA".repeat(10).bytes() {
    ///     counts[usize::from(c - b'A')] += 1;
    /// }
    /// // G, A, T and C all appear
    /// assert_eq!(AlphabetKind::guess(&counts), Some(AlphabetKind::Dna));
    /// ```
    #[must_use]
    pub fn guess(counts: &[u64; 26]) -> Option<Self> {
        // (total, distinct letters seen)
        let tally = |letters: &[u8]| {
            letters
                .iter()
                .map(|&c| counts[usize::from(c - b'A')])
                .filter(|&n| n > 0)
                .fold((0u64, 0u32), |(n, x), ct| (n + ct, x + 1))
        };
        let count = |c: u8| counts[usize::from(c - b'A')];

        let n: u64 = counts.iter().sum();
        let (n1, x1) = tally(b"EFIJLOPQZ");
        let (n2, x2) = tally(b"ACG");
        let (n3, x3) = tally(b"DHKMRSVWY");
        let (nt, nu, nx, nn) = (count(b'T'), count(b'U'), count(b'X'), count(b'N'));
        let (xt, xu, xn) = (u32::from(nt > 0), u32::from(nu > 0), u32::from(nn > 0));

        // "nearly all": at most 2% of the residues fall outside `m`
        let nearly_all = |m: u64| 50 * (n - m) <= n;

        if n <= 10 {
            None
        } else if n > 2000 && nn == n {
            // a run of Ns leading a genome assembly
            Some(Self::Dna)
        } else if n1 > 0 {
            Some(Self::Amino)
        } else if nearly_all(n2 + nt + nn) && x2 + xt == 4 {
            Some(Self::Dna)
        } else if nearly_all(n2 + nu + nn) && x2 + xu == 4 {
            Some(Self::Rna)
        } else if nearly_all(n1 + n2 + n3 + nn + nt + nx)
            && n3 > n2
            && x1 + x2 + x3 + xn + xt >= 15
        {
            Some(Self::Amino)
        } else {
            None
        }
    }
}

impl Display for AlphabetKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Rna => "RNA",
            Self::Dna => "DNA",
            Self::Amino => "amino",
            Self::Nonstandard => "custom",
        })
    }
}

impl FromStr for AlphabetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        const NAMES: [(&str, AlphabetKind); 5] = [
            ("dna", AlphabetKind::Dna),
            ("rna", AlphabetKind::Rna),
            ("amino", AlphabetKind::Amino),
            ("custom", AlphabetKind::Nonstandard),
            ("unknown", AlphabetKind::Unknown),
        ];
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, kind)| kind)
            .ok_or_else(|| Error::invalid(format!("unrecognized alphabet kind {s:?}")))
    }
}

/// A digital alphabet.
///
/// Residues are digitized to small integer codes laid out as:
///
/// | codes           | meaning                       |
/// |-----------------|-------------------------------|
/// | `0..K`          | canonical residues            |
/// | `K`             | gap                           |
/// | `K+1..Kp-1`     | degenerate residues           |
/// | `Kp-1`          | "any" (all canonical residues)|
/// | `Kp`            | nonresidue, i.e. stop (`*`)   |
///
/// The nonresidue code only appears in translation output; digitization never
/// produces it.
///
/// Alphabets are immutable once built. Use [`Alphabet::new`] for the standard
/// alphabets or [`AlphabetBuilder`] for custom ones.
///
/// # Examples
///
/// ```
/// use digiseq::Alphabet;
///
/// let dna = Alphabet::dna();
/// assert_eq!((dna.k(), dna.kp()), (4, 16));
/// assert_eq!(dna.digitize_symbol(b'g'), Some(2));
/// assert_eq!(dna.digitize_symbol(b'U'), dna.digitize_symbol(b'T'));
///
/// let r = dna.digitize_symbol(b'R').unwrap();
/// assert!(dna.is_degenerate(r));
/// assert_eq!(dna.textize(&dna.members(r).collect::<Vec<_>>()).unwrap(), "AG");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    pub(crate) kind: AlphabetKind,
    pub(crate) k: usize,
    pub(crate) kp: usize,
    pub(crate) sym: String,
    pub(crate) inmap: [Option<u8>; 128],
    pub(crate) ignored: [bool; 128],
    // Kp rows of K flags
    pub(crate) degen: Vec<bool>,
    pub(crate) ndegen: Vec<u8>,
    pub(crate) complement: Option<Vec<u8>>,
}

struct Recipe {
    kind: AlphabetKind,
    symbols: &'static str,
    k: usize,
    synonyms: &'static [(u8, u8)],
    degeneracies: &'static [(u8, &'static str)],
}

const DNA: Recipe = Recipe {
    kind: AlphabetKind::Dna,
    symbols: "ACGT-RYMKSWHBVDN",
    k: 4,
    synonyms: &[(b'U', b'T'), (b'X', b'N'), (b'_', b'-'), (b'.', b'-')],
    degeneracies: &[
        (b'R', "AG"),
        (b'Y', "CT"),
        (b'M', "AC"),
        (b'K', "GT"),
        (b'S', "CG"),
        (b'W', "AT"),
        (b'H', "ACT"),
        (b'B', "CGT"),
        (b'V', "ACG"),
        (b'D', "AGT"),
    ],
};

const RNA: Recipe = Recipe {
    kind: AlphabetKind::Rna,
    symbols: "ACGU-RYMKSWHBVDN",
    k: 4,
    synonyms: &[(b'T', b'U'), (b'X', b'N'), (b'_', b'-'), (b'.', b'-')],
    degeneracies: &[
        (b'R', "AG"),
        (b'Y', "CU"),
        (b'M', "AC"),
        (b'K', "GU"),
        (b'S', "CG"),
        (b'W', "AU"),
        (b'H', "ACU"),
        (b'B', "CGU"),
        (b'V', "ACG"),
        (b'D', "AGU"),
    ],
};

const AMINO: Recipe = Recipe {
    kind: AlphabetKind::Amino,
    symbols: "ACDEFGHIKLMNPQRSTVWY-BZX",
    k: 20,
    // U is selenocysteine
    synonyms: &[(b'U', b'S'), (b'_', b'-'), (b'.', b'-')],
    degeneracies: &[(b'B', "ND"), (b'Z', "QE")],
};

impl Recipe {
    fn build(&self) -> Result<Alphabet> {
        let mut builder = AlphabetBuilder::new(self.symbols, self.k, self.symbols.len())?;
        builder.kind(self.kind);
        for &(input, target) in self.synonyms {
            builder.synonym(input, target)?;
        }
        builder.case_insensitive()?;
        for &(c, bases) in self.degeneracies {
            builder.degeneracy(c, bases)?;
        }
        Ok(builder.finish())
    }
}

impl Alphabet {
    /// Build one of the standard alphabets.
    ///
    /// # Errors
    ///
    /// Only [`AlphabetKind::Dna`], [`AlphabetKind::Rna`] and
    /// [`AlphabetKind::Amino`] have standard alphabets; any other kind gives
    /// [`Error::InvalidArgument`].
    pub fn new(kind: AlphabetKind) -> Result<Self> {
        let recipe = match kind {
            AlphabetKind::Dna => &DNA,
            AlphabetKind::Rna => &RNA,
            AlphabetKind::Amino => &AMINO,
            other => {
                return Err(Error::invalid(format!(
                    "no standard alphabet of kind {other}"
                )));
            }
        };
        recipe.build()
    }

    /// The standard DNA alphabet, `ACGT-RYMKSWHBVDN`.
    #[must_use]
    pub fn dna() -> Self {
        Self::new(AlphabetKind::Dna).expect("BUG: standard DNA alphabet failed to build")
    }

    /// The standard RNA alphabet, `ACGU-RYMKSWHBVDN`.
    #[must_use]
    pub fn rna() -> Self {
        Self::new(AlphabetKind::Rna).expect("BUG: standard RNA alphabet failed to build")
    }

    /// The standard protein alphabet, `ACDEFGHIKLMNPQRSTVWY-BZX`.
    #[must_use]
    pub fn amino() -> Self {
        Self::new(AlphabetKind::Amino).expect("BUG: standard amino alphabet failed to build")
    }

    /// What sort of alphabet this is.
    #[must_use]
    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    /// Number of canonical residues.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Total number of symbols, including gap, degeneracies and "any".
    #[must_use]
    pub fn kp(&self) -> usize {
        self.kp
    }

    /// The symbol string, one character per code.
    #[must_use]
    pub fn symbols(&self) -> &str {
        &self.sym
    }

    /// The ASCII symbol for `code`.
    ///
    /// The nonresidue code is rendered as `*`; anything larger gives `None`.
    #[must_use]
    pub fn symbol(&self, code: u8) -> Option<u8> {
        let x = usize::from(code);
        match x.cmp(&self.kp) {
            std::cmp::Ordering::Less => Some(self.sym.as_bytes()[x]),
            std::cmp::Ordering::Equal => Some(b'*'),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Look up the code for an input byte, honouring synonyms.
    #[must_use]
    pub fn digitize_symbol(&self, c: u8) -> Option<u8> {
        self.inmap.get(usize::from(c)).copied().flatten()
    }

    /// Whether the input byte `c` is skipped when digitizing.
    #[must_use]
    pub fn is_ignored(&self, c: u8) -> bool {
        self.ignored.get(usize::from(c)).copied().unwrap_or(false)
    }

    /// Whether `code` is one of the `K` canonical residues.
    #[must_use]
    pub fn is_canonical(&self, code: u8) -> bool {
        usize::from(code) < self.k
    }

    /// Whether `code` is the gap.
    #[must_use]
    pub fn is_gap(&self, code: u8) -> bool {
        usize::from(code) == self.k
    }

    /// Whether `code` is a degenerate residue other than "any".
    #[must_use]
    pub fn is_degenerate(&self, code: u8) -> bool {
        (self.k + 1..self.kp - 1).contains(&usize::from(code))
    }

    /// Whether `code` is the "any" residue.
    #[must_use]
    pub fn is_any(&self, code: u8) -> bool {
        usize::from(code) == self.kp - 1
    }

    /// Whether `code` stands for residues: canonical, degenerate or "any".
    #[must_use]
    pub fn is_residue(&self, code: u8) -> bool {
        let x = usize::from(code);
        x < self.k || (self.k < x && x < self.kp)
    }

    /// Whether `code` is the reserved nonresidue (stop) code.
    #[must_use]
    pub fn is_nonresidue(&self, code: u8) -> bool {
        usize::from(code) == self.kp
    }

    /// The gap code, `K`.
    #[must_use]
    pub fn gap_code(&self) -> u8 {
        as_code(self.k)
    }

    /// The "any" code, `Kp-1`.
    #[must_use]
    pub fn any_code(&self) -> u8 {
        as_code(self.kp - 1)
    }

    /// The nonresidue (stop) code, `Kp`.
    #[must_use]
    pub fn nonresidue_code(&self) -> u8 {
        as_code(self.kp)
    }

    /// The degeneracy row of `code`: entry `y` is set when `code` includes
    /// canonical residue `y`.
    ///
    /// Codes outside `0..Kp` have an empty row.
    #[must_use]
    pub fn degeneracy(&self, code: u8) -> &[bool] {
        let x = usize::from(code);
        if x < self.kp {
            &self.degen[x * self.k..(x + 1) * self.k]
        } else {
            &[]
        }
    }

    /// Iterate over the canonical residues `code` stands for.
    pub fn members(&self, code: u8) -> impl Iterator<Item = u8> + '_ {
        self.degeneracy(code)
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(y, _)| as_code(y))
    }

    /// How many canonical residues `code` stands for.
    #[must_use]
    pub fn ndegen(&self, code: u8) -> usize {
        self.ndegen
            .get(usize::from(code))
            .map_or(0, |&n| usize::from(n))
    }

    /// The complement of `code`.
    ///
    /// Only nucleic alphabets have complements. Gap and "any" are their own
    /// complements; degenerate codes map to the code for the complementary set.
    ///
    /// ```
    /// use digiseq::Alphabet;
    ///
    /// let dna = Alphabet::dna();
    /// let code = |c| dna.digitize_symbol(c).unwrap();
    /// assert_eq!(dna.complement(code(b'A')), Some(code(b'T')));
    /// assert_eq!(dna.complement(code(b'R')), Some(code(b'Y')));
    /// assert_eq!(Alphabet::amino().complement(0), None);
    /// ```
    #[must_use]
    pub fn complement(&self, code: u8) -> Option<u8> {
        self.complement.as_ref()?.get(usize::from(code)).copied()
    }

    pub(crate) fn complement_table(&self) -> Option<&[u8]> {
        self.complement.as_deref()
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Alphabet")
            .field("kind", &self.kind)
            .field("symbols", &self.sym)
            .field("k", &self.k)
            .field("kp", &self.kp)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use std::fmt::Formatter;

    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Visitor};

    use super::AlphabetKind;

    impl Serialize for AlphabetKind {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for AlphabetKind {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(KindVisitor)
        }
    }

    struct KindVisitor;

    impl Visitor<'_> for KindVisitor {
        type Value = AlphabetKind;

        fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
            f.write_str("an alphabet kind")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> [Alphabet; 3] {
        [Alphabet::dna(), Alphabet::rna(), Alphabet::amino()]
    }

    fn letter_counts(text: &str) -> [u64; 26] {
        let mut counts = [0; 26];
        for c in text.bytes().filter(u8::is_ascii_alphabetic) {
            counts[usize::from(c.to_ascii_uppercase() - b'A')] += 1;
        }
        counts
    }

    #[test]
    fn standard_layouts() {
        let dna = Alphabet::dna();
        assert_eq!(dna.kind(), AlphabetKind::Dna);
        assert_eq!(dna.symbols(), "ACGT-RYMKSWHBVDN");
        assert_eq!((dna.k(), dna.kp()), (4, 16));
        assert_eq!(dna.gap_code(), 4);
        assert_eq!(dna.any_code(), 15);
        assert_eq!(dna.nonresidue_code(), 16);

        let rna = Alphabet::rna();
        assert_eq!(rna.symbols(), "ACGU-RYMKSWHBVDN");
        assert_eq!(rna.digitize_symbol(b't'), Some(3));

        let amino = Alphabet::amino();
        assert_eq!(amino.symbols(), "ACDEFGHIKLMNPQRSTVWY-BZX");
        assert_eq!((amino.k(), amino.kp()), (20, 24));
        assert_eq!(amino.digitize_symbol(b'U'), amino.digitize_symbol(b'S'));
        assert_eq!(amino.digitize_symbol(b'x'), Some(amino.any_code()));
    }

    #[test]
    fn nonstandard_kinds_have_no_recipe() {
        for kind in [AlphabetKind::Nonstandard, AlphabetKind::Unknown] {
            assert!(matches!(Alphabet::new(kind), Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn degeneracy_counts_match_rows() {
        for abc in standard() {
            for x in 0..abc.kp() {
                let x = as_code(x);
                let row = abc.degeneracy(x);
                assert_eq!(row.len(), abc.k());
                assert_eq!(abc.ndegen(x), row.iter().filter(|&&b| b).count());
                if abc.is_canonical(x) {
                    assert!(abc.members(x).eq([x]));
                }
            }
        }
    }

    #[test]
    fn any_covers_everything() {
        for abc in standard() {
            let any = abc.any_code();
            assert!(abc.degeneracy(any).iter().all(|&b| b));
            assert_eq!(abc.ndegen(any), abc.k());
        }
    }

    #[test]
    fn gap_and_out_of_range_have_no_members() {
        let dna = Alphabet::dna();
        assert_eq!(dna.ndegen(dna.gap_code()), 0);
        assert_eq!(dna.members(dna.gap_code()).count(), 0);
        assert!(dna.degeneracy(dna.nonresidue_code()).is_empty());
        assert_eq!(dna.ndegen(200), 0);
    }

    #[test]
    fn code_classes() {
        let dna = Alphabet::dna();
        let classes: Vec<_> = (0..=16)
            .map(|x| {
                (
                    dna.is_canonical(x),
                    dna.is_gap(x),
                    dna.is_degenerate(x),
                    dna.is_any(x),
                    dna.is_nonresidue(x),
                )
            })
            .collect();
        // every code is in exactly one class
        assert!(classes.iter().all(|&(a, b, c, d, e)| {
            [a, b, c, d, e].iter().filter(|&&set| set).count() == 1
        }));
        assert!(dna.is_residue(0) && dna.is_residue(5) && dna.is_residue(15));
        assert!(!dna.is_residue(4) && !dna.is_residue(16));
    }

    #[test]
    fn symbols_render() {
        let amino = Alphabet::amino();
        assert_eq!(amino.symbol(0), Some(b'A'));
        assert_eq!(amino.symbol(20), Some(b'-'));
        assert_eq!(amino.symbol(24), Some(b'*'));
        assert_eq!(amino.symbol(25), None);
    }

    #[test]
    fn complement_is_an_involution() {
        for abc in [Alphabet::dna(), Alphabet::rna()] {
            for x in 0..abc.kp() {
                let x = as_code(x);
                let c = abc.complement(x).unwrap();
                assert_eq!(abc.complement(c), Some(x), "code {x} of {:?}", abc.kind());
            }
        }
    }

    #[test]
    fn iupac_complements() {
        let dna = Alphabet::dna();
        let pairs = [
            "AT", "CG", "RY", "MK", "SS", "WW", "HD", "BV", "NN", "--",
        ];
        for pair in pairs {
            let [a, b] = pair.as_bytes() else { unreachable!() };
            let a = dna.digitize_symbol(*a).unwrap();
            let b = dna.digitize_symbol(*b).unwrap();
            assert_eq!(dna.complement(a), Some(b), "{pair}");
        }
    }

    #[test]
    fn kind_names() {
        for kind in [
            AlphabetKind::Dna,
            AlphabetKind::Rna,
            AlphabetKind::Amino,
            AlphabetKind::Nonstandard,
            AlphabetKind::Unknown,
        ] {
            assert_eq!(kind.to_string().parse::<AlphabetKind>().unwrap(), kind);
        }
        assert_eq!("Amino".parse::<AlphabetKind>().unwrap(), AlphabetKind::Amino);
        assert!(matches!(
            "protein".parse::<AlphabetKind>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn guess_nucleic() {
        let dna = letter_counts(&"ACGTTGCA".repeat(50));
        assert_eq!(AlphabetKind::guess(&dna), Some(AlphabetKind::Dna));
        let rna = letter_counts(&"acguugca".repeat(50));
        assert_eq!(AlphabetKind::guess(&rna), Some(AlphabetKind::Rna));
        let assembly_gap = letter_counts(&"N".repeat(3000));
        assert_eq!(AlphabetKind::guess(&assembly_gap), Some(AlphabetKind::Dna));
    }

    #[test]
    fn guess_protein() {
        let protein = letter_counts("MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQAPILSRVGDGTQDNLSGAEKAVQVKVKALPDAQFEVVHSLAKWKRQTLGQHDFSAGEGLYTHMKALRPDEDRLSPLHSVYVDQWDWERVMGDGERQFSTLKSTVEAIWAGIKATEAAVSEEFGLAPFLPDQIHFVHSQELLSRYPDLDAKGRERAIAKDLGAVFLVGIGGKLSDGHRHDVRAPDYDDWUAPEGRGLLFRIK");
        assert_eq!(AlphabetKind::guess(&protein), Some(AlphabetKind::Amino));
    }

    #[test]
    fn guess_declines_when_unsure() {
        assert_eq!(AlphabetKind::guess(&letter_counts("ACGT")), None);
        assert_eq!(AlphabetKind::guess(&letter_counts(&"B".repeat(100))), None);
        // only three distinct nucleotides seen
        assert_eq!(AlphabetKind::guess(&letter_counts(&"AAC".repeat(100))), None);
    }

    #[test]
    fn alphabets_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Alphabet>();
    }
}
