//! Construction of custom alphabets.

use tracing::debug;

use crate::alphabet::{Alphabet, AlphabetKind, MAX_KP, as_code};
use crate::error::{Error, Result};

/// Mutable construction phase of an [`Alphabet`].
///
/// A builder starts from a symbol string laid out as described on [`Alphabet`]:
/// `K` canonical symbols, the gap, any degenerate symbols and finally the
/// "any" symbol. Only the symbols themselves are digitizable at first;
/// synonyms, case-insensitivity and degeneracies are added with the setters,
/// and [`finish`](Self::finish) freezes the result.
///
/// # Examples
///
/// ```
/// # fn main() -> digiseq::Result<()> {
/// use digiseq::AlphabetBuilder;
///
/// // A two-letter purine/pyrimidine alphabet with a "maybe" code
/// let mut builder = AlphabetBuilder::new("RY-?N", 2, 5)?;
/// builder.synonym(b'A', b'R')?.synonym(b'C', b'Y')?.case_insensitive()?;
/// builder.degeneracy(b'?', "RY")?;
/// let abc = builder.finish();
///
/// assert_eq!(abc.digitize_symbol(b'a'), Some(0));
/// assert_eq!(abc.ndegen(3), 2);
/// assert_eq!(abc.ndegen(4), 2); // "any" covers both
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AlphabetBuilder {
    kind: AlphabetKind,
    k: usize,
    kp: usize,
    sym: String,
    inmap: [Option<u8>; 128],
    ignored: [bool; 128],
    degen: Vec<bool>,
    ndegen: Vec<u8>,
}

impl AlphabetBuilder {
    /// Start a custom alphabet with `k` canonical symbols out of `kp`.
    ///
    /// Each symbol digitizes to its own index. Canonical symbols represent
    /// themselves and the last symbol represents all canonical symbols.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] unless `symbols` has exactly `kp`
    /// distinct, non-NUL ASCII characters, `k >= 1`, `kp >= k + 2` and
    /// `kp <= 127`.
    pub fn new(symbols: &str, k: usize, kp: usize) -> Result<Self> {
        if symbols.len() != kp {
            return Err(Error::invalid(format!(
                "symbol string {symbols:?} has {} symbols, expected Kp = {kp}",
                symbols.len()
            )));
        }
        if k == 0 || k.checked_add(2).is_none_or(|min| kp < min) {
            return Err(Error::invalid(format!(
                "Kp = {kp} leaves no room for {k} canonical symbols, a gap and an \"any\" symbol"
            )));
        }
        if kp > MAX_KP {
            return Err(Error::invalid(format!(
                "Kp = {kp} exceeds the maximum of {MAX_KP}"
            )));
        }
        if !symbols.is_ascii() || symbols.contains('\0') {
            return Err(Error::invalid(format!(
                "symbol string {symbols:?} must be printable ASCII"
            )));
        }

        let mut inmap = [None; 128];
        for (x, c) in symbols.bytes().enumerate() {
            let slot = &mut inmap[usize::from(c)];
            if slot.is_some() {
                return Err(Error::invalid(format!(
                    "symbol '{}' appears twice in {symbols:?}",
                    char::from(c)
                )));
            }
            *slot = Some(as_code(x));
        }

        let mut degen = vec![false; kp * k];
        let mut ndegen = vec![0; kp];
        for x in 0..k {
            degen[x * k + x] = true;
            ndegen[x] = 1;
        }
        degen[(kp - 1) * k..].fill(true);
        ndegen[kp - 1] = as_code(k);

        Ok(Self {
            kind: AlphabetKind::Nonstandard,
            k,
            kp,
            sym: symbols.to_owned(),
            inmap,
            ignored: [false; 128],
            degen,
            ndegen,
        })
    }

    /// Tag the alphabet with `kind`; [`AlphabetKind::Nonstandard`] by default.
    ///
    /// Nucleic alphabets with 4 canonical residues get a complement table.
    pub fn kind(&mut self, kind: AlphabetKind) -> &mut Self {
        self.kind = kind;
        self
    }

    fn index_of(&self, c: u8) -> Option<usize> {
        self.sym.bytes().position(|s| s == c)
    }

    /// Digitize `input` the same way as the alphabet symbol `target`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if `target` isn't one of the
    /// alphabet's symbols, or `input` is one already or isn't a non-NUL ASCII
    /// byte.
    pub fn synonym(&mut self, input: u8, target: u8) -> Result<&mut Self> {
        let x = self.index_of(target).ok_or_else(|| {
            Error::invalid(format!(
                "'{}' is not a symbol of {:?}",
                char::from(target),
                self.sym
            ))
        })?;
        if !input.is_ascii() || input == 0 {
            return Err(Error::invalid(format!(
                "synonym {input:#04x} is not an ASCII character"
            )));
        }
        if self.index_of(input).is_some() {
            return Err(Error::invalid(format!(
                "'{}' is already a symbol of {:?}",
                char::from(input),
                self.sym
            )));
        }
        self.inmap[usize::from(input)] = Some(as_code(x));
        self.ignored[usize::from(input)] = false;
        Ok(self)
    }

    /// Skip the bytes of `chars` when digitizing, e.g. whitespace.
    ///
    /// Ignored bytes are neither digitized nor reported as invalid. A later
    /// [`synonym`](Self::synonym) for one of them takes precedence.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`], leaving the builder untouched, if
    /// any of `chars` is one of the alphabet's symbols or isn't a non-NUL
    /// ASCII byte.
    pub fn ignored(&mut self, chars: impl AsRef<[u8]>) -> Result<&mut Self> {
        let chars = chars.as_ref();
        if let Some(&c) = chars.iter().find(|&&c| !c.is_ascii() || c == 0) {
            return Err(Error::invalid(format!(
                "ignored byte {c:#04x} is not an ASCII character"
            )));
        }
        if let Some(&c) = chars.iter().find(|&&c| self.index_of(c).is_some()) {
            return Err(Error::invalid(format!(
                "'{}' is a symbol of {:?} and can't be ignored",
                char::from(c),
                self.sym
            )));
        }
        for &c in chars {
            self.inmap[usize::from(c)] = None;
            self.ignored[usize::from(c)] = true;
        }
        Ok(self)
    }

    /// Make letters digitize the same regardless of case.
    ///
    /// Wherever exactly one of a letter's cases is mapped, the other case gets
    /// the same code, unless it is [`ignored`](Self::ignored).
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`], leaving the builder untouched, if
    /// the two cases of a letter are already mapped to different codes.
    pub fn case_insensitive(&mut self) -> Result<&mut Self> {
        let pairs = || {
            (b'a'..=b'z').map(|c| (usize::from(c), usize::from(c.to_ascii_uppercase())))
        };
        if let Some((l, _)) = pairs().find(|&(l, u)| {
            matches!((self.inmap[l], self.inmap[u]), (Some(x), Some(y)) if x != y)
        }) {
            let lower = char::from(as_code(l));
            return Err(Error::invalid(format!(
                "'{lower}' and '{}' digitize differently",
                lower.to_ascii_uppercase()
            )));
        }
        for (l, u) in pairs() {
            match (self.inmap[l], self.inmap[u]) {
                (Some(x), None) if !self.ignored[u] => self.inmap[u] = Some(x),
                (None, Some(x)) if !self.ignored[l] => self.inmap[l] = Some(x),
                _ => {}
            }
        }
        Ok(self)
    }

    /// Declare the symbol `c` to stand for each canonical symbol in `bases`.
    ///
    /// May be called more than once for the same symbol; the sets accumulate.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`], leaving the builder untouched, if
    /// `c` isn't a degenerate symbol of the alphabet (canonical symbols, the
    /// gap and "any" are fixed) or any of `bases` isn't a canonical symbol.
    pub fn degeneracy(&mut self, c: u8, bases: impl AsRef<[u8]>) -> Result<&mut Self> {
        let x = self.index_of(c).ok_or_else(|| {
            Error::invalid(format!("no such degenerate character '{}'", char::from(c)))
        })?;
        if x < self.k {
            return Err(Error::invalid(format!(
                "'{}' is canonical and can't be made degenerate",
                char::from(c)
            )));
        }
        if x == self.k {
            return Err(Error::invalid("the gap character can't be made degenerate"));
        }
        if x == self.kp - 1 {
            return Err(Error::invalid(
                "the \"any\" character already stands for every residue",
            ));
        }

        let ys = bases
            .as_ref()
            .iter()
            .map(|&b| match self.index_of(b) {
                Some(y) if y < self.k => Ok(y),
                _ => Err(Error::invalid(format!(
                    "'{}' is not a canonical symbol of {:?}",
                    char::from(b),
                    self.sym
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let row = &mut self.degen[x * self.k..(x + 1) * self.k];
        for y in ys {
            if !row[y] {
                row[y] = true;
                self.ndegen[x] += 1;
            }
        }
        Ok(self)
    }

    /// Freeze the alphabet.
    #[must_use]
    pub fn finish(self) -> Alphabet {
        let complement = if self.kind.is_nucleic() && self.k == 4 {
            Some(self.complements())
        } else {
            None
        };
        debug!(kind = %self.kind, symbols = %self.sym, k = self.k, kp = self.kp, "built alphabet");
        Alphabet {
            kind: self.kind,
            k: self.k,
            kp: self.kp,
            sym: self.sym,
            inmap: self.inmap,
            ignored: self.ignored,
            degen: self.degen,
            ndegen: self.ndegen,
            complement,
        }
    }

    // Canonical nucleotides are ordered so that complements mirror: A<->T(U), C<->G.
    // Each code maps to the code whose row is its mirrored row; codes without
    // such a partner (the gap) map to themselves.
    fn complements(&self) -> Vec<u8> {
        let k = self.k;
        let row = |x: usize| &self.degen[x * k..(x + 1) * k];
        (0..self.kp)
            .map(|x| {
                let mirrored: Vec<bool> = row(x).iter().rev().copied().collect();
                let partner = (0..self.kp)
                    .filter(|&z| z != k)
                    .find(|&z| row(z) == mirrored.as_slice());
                match partner {
                    Some(z) if x != k => as_code(z),
                    _ => as_code(x),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_size_mismatches() {
        assert!(matches!(
            AlphabetBuilder::new("ACGT-N", 4, 7),
            Err(Error::InvalidArgument(_))
        ));
        // no room for gap and "any"
        assert!(matches!(
            AlphabetBuilder::new("ACGTN", 4, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            AlphabetBuilder::new("", 0, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn new_checks_symbols() {
        assert!(AlphabetBuilder::new("AAGT-N", 4, 6).is_err());
        assert!(AlphabetBuilder::new("ACGé-N", 4, 6).is_err());
        assert!(AlphabetBuilder::new("ACG\0-N", 4, 6).is_err());
        let huge: String = (1..=127u8).map(char::from).collect();
        assert!(AlphabetBuilder::new(&huge, 4, 127).is_ok());
    }

    #[test]
    fn only_symbols_are_mapped_initially() {
        let abc = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap().finish();
        assert_eq!(abc.kind(), AlphabetKind::Nonstandard);
        assert_eq!(abc.digitize_symbol(b'G'), Some(2));
        assert_eq!(abc.digitize_symbol(b'g'), None);
        assert_eq!(abc.digitize_symbol(b'U'), None);
        assert_eq!(abc.ndegen(5), 4);
        assert_eq!(abc.complement(0), None);
    }

    #[test]
    fn synonyms() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.synonym(b'U', b'T').unwrap();
        assert!(matches!(
            builder.synonym(b'X', b'Q'),
            Err(Error::InvalidArgument(_))
        ));
        assert!(builder.synonym(0xc3, b'A').is_err());
        let abc = builder.finish();
        assert_eq!(abc.digitize_symbol(b'U'), Some(3));
        assert_eq!(abc.digitize_symbol(b'X'), None);
    }

    #[test]
    fn case_insensitivity_copies_one_sided_mappings() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.synonym(b'u', b'T').unwrap();
        builder.case_insensitive().unwrap().case_insensitive().unwrap();
        let abc = builder.finish();
        assert_eq!(abc.digitize_symbol(b'a'), Some(0));
        assert_eq!(abc.digitize_symbol(b'U'), Some(3));
        for c in b'a'..=b'z' {
            assert_eq!(abc.digitize_symbol(c), abc.digitize_symbol(c.to_ascii_uppercase()));
        }
    }

    #[test]
    fn case_insensitivity_rejects_conflicting_cases() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.synonym(b'u', b'T').unwrap();
        builder.synonym(b'U', b'A').unwrap();
        let before = builder.inmap;
        assert!(matches!(
            builder.case_insensitive(),
            Err(Error::InvalidArgument(message)) if message.contains("'u' and 'U'")
        ));
        assert_eq!(builder.inmap, before);
        // symbols conflict with their own lowercase synonyms too
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.synonym(b'c', b'G').unwrap();
        assert!(builder.case_insensitive().is_err());
    }

    #[test]
    fn synonyms_cant_remap_symbols() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        assert!(matches!(
            builder.synonym(b'A', b'C'),
            Err(Error::InvalidArgument(_))
        ));
        assert!(builder.synonym(b'-', b'N').is_err());
        let abc = builder.finish();
        let dsq = abc.digitize("ACGT").unwrap();
        assert_eq!(dsq.textize(&abc).unwrap(), "ACGT");
    }

    #[test]
    fn new_rejects_overflowing_sizes() {
        assert!(matches!(
            AlphabetBuilder::new("ACGT-N", usize::MAX, 6),
            Err(Error::InvalidArgument(_))
        ));
        assert!(AlphabetBuilder::new("ACGT-N", usize::MAX - 1, 6).is_err());
    }

    #[test]
    fn ignored_bytes() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.ignored(" \t\n").unwrap();
        assert!(builder.ignored("A").is_err());
        assert!(builder.ignored([b'x', 0]).is_err());
        // failed calls change nothing
        assert!(!builder.ignored[usize::from(b'x')]);
        builder.ignored("x").unwrap().synonym(b'x', b'N').unwrap();
        let abc = builder.finish();
        assert!(abc.is_ignored(b' '));
        assert!(abc.is_ignored(b'\t'));
        assert!(!abc.is_ignored(b'x'));
        assert_eq!(abc.digitize_symbol(b'x'), Some(5));
        assert_eq!(abc.digitize_symbol(b' '), None);
    }

    #[test]
    fn case_insensitivity_leaves_ignored_bytes_alone() {
        let mut builder = AlphabetBuilder::new("ACGT-N", 4, 6).unwrap();
        builder.ignored("a").unwrap().case_insensitive().unwrap();
        let abc = builder.finish();
        assert!(abc.is_ignored(b'a'));
        assert_eq!(abc.digitize_symbol(b'a'), None);
        assert_eq!(abc.digitize_symbol(b'c'), Some(1));
    }

    #[test]
    fn degeneracies_accumulate() {
        let mut builder = AlphabetBuilder::new("ACGT-RN", 4, 7).unwrap();
        builder.degeneracy(b'R', "A").unwrap();
        builder.degeneracy(b'R', "AG").unwrap();
        let abc = builder.finish();
        assert_eq!(abc.ndegen(5), 2);
        assert!(abc.members(5).eq([0, 2]));
    }

    #[test]
    fn degeneracy_failures_leave_builder_untouched() {
        let mut builder = AlphabetBuilder::new("ACGT-RN", 4, 7).unwrap();
        let before = builder.degen.clone();
        for (c, bases) in [
            (b'Q', "AG"),  // unknown symbol
            (b'A', "AG"),  // canonical
            (b'-', "AG"),  // gap
            (b'N', "AG"),  // any
            (b'R', "AQ"),  // unknown base
            (b'R', "AR"),  // non-canonical base
        ] {
            assert!(
                matches!(builder.degeneracy(c, bases), Err(Error::InvalidArgument(_))),
                "{}",
                char::from(c)
            );
            assert_eq!(builder.degen, before);
            assert_eq!(builder.ndegen[5], 0);
        }
    }

    #[test]
    fn custom_nucleic_complements() {
        let mut builder = AlphabetBuilder::new("ACGT-RYN", 4, 8).unwrap();
        builder
            .kind(AlphabetKind::Dna)
            .degeneracy(b'R', "AG")
            .unwrap()
            .degeneracy(b'Y', "CT")
            .unwrap();
        let abc = builder.finish();
        let table: Vec<_> = (0..8).map(|x| abc.complement(x).unwrap()).collect();
        assert_eq!(table, [3, 2, 1, 0, 4, 6, 5, 7]);
    }
}
