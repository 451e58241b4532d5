//! Digital sequences and conversion between text and digital codes.

use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::Alphabet;
use crate::error::{DigitizeError, Error, InvalidSymbols, Result};

/// Marks both ends of a digital sequence buffer.
///
/// It never collides with a code, since alphabets have at most
/// [`MAX_KP`](crate::MAX_KP) symbols.
pub const SENTINEL: u8 = 255;

// Text ends at the first NUL byte, if any.
fn until_nul(text: &[u8]) -> &[u8] {
    text.iter()
        .position(|&b| b == 0)
        .map_or(text, |end| &text[..end])
}

impl Alphabet {
    fn scan(
        &self,
        text: &[u8],
        mut emit: impl FnMut(usize, u8),
    ) -> std::result::Result<(), InvalidSymbols> {
        let mut invalid: Option<InvalidSymbols> = None;
        let mut j = 0;
        for (i, &c) in text.iter().enumerate() {
            if self.is_ignored(c) {
                continue;
            }
            let x = self.digitize_symbol(c).unwrap_or_else(|| {
                trace!(byte = c, position = i + 1, "substituting \"any\" for invalid character");
                let seen = invalid.get_or_insert(InvalidSymbols {
                    byte: c,
                    pos: i + 1,
                    count: 0,
                });
                seen.count += 1;
                self.any_code()
            });
            emit(j, x);
            j += 1;
        }
        invalid.map_or(Ok(()), Err)
    }

    // Number of codes `text` digitizes to.
    fn digitized_len(&self, text: &[u8]) -> usize {
        text.iter().filter(|&&c| !self.is_ignored(c)).count()
    }

    /// Digitize up to `max_len` bytes of `text` into `buf`.
    ///
    /// Digitization stops at the end of `text`, at its first NUL byte or after
    /// `max_len` bytes, whichever comes first. The `L` digitized codes are
    /// written to `buf[1..=L]`, bracketed by [`SENTINEL`]s at `buf[0]` and
    /// `buf[L+1]`. Bytes the alphabet [ignores](Alphabet::is_ignored) are
    /// skipped, so `L` can be less than the number of bytes read.
    ///
    /// Bytes the alphabet doesn't recognize are written as the "any" code.
    /// That still counts as an error, but `buf` is completely written either way.
    ///
    /// # Errors
    ///
    /// [`InvalidSymbols`] describes the first unrecognized byte and how many
    /// there were.
    ///
    /// # Panics
    ///
    /// Panics if `buf` can't hold `L+2` codes. A buffer of `max_len + 2` is
    /// always enough.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiseq::{Alphabet, SENTINEL};
    ///
    /// let dna = Alphabet::dna();
    /// let mut buf = [0; 6];
    /// // Stream a long sequence in windows of 4
    /// assert_eq!(dna.digitize_into("GATTACA", 4, &mut buf), Ok(4));
    /// assert_eq!(buf, [SENTINEL, 2, 0, 3, 3, SENTINEL]);
    /// assert_eq!(dna.digitize_into(&b"ACA"[..], 4, &mut buf), Ok(3));
    /// assert_eq!(buf[..5], [SENTINEL, 0, 1, 0, SENTINEL]);
    /// ```
    pub fn digitize_into(
        &self,
        text: impl AsRef<[u8]>,
        max_len: usize,
        buf: &mut [u8],
    ) -> std::result::Result<usize, InvalidSymbols> {
        let text = until_nul(text.as_ref());
        let window = &text[..text.len().min(max_len)];
        let len = self.digitized_len(window);
        assert!(
            buf.len() >= len + 2,
            "digital sequence buffer holds {} codes but {} are needed",
            buf.len(),
            len + 2
        );
        buf[0] = SENTINEL;
        let result = self.scan(window, |j, x| buf[j + 1] = x);
        buf[len + 1] = SENTINEL;
        result.map(|()| len)
    }

    /// Digitize `text` into a new [`Dsq`].
    ///
    /// Equivalent to [`digitize_n`](Self::digitize_n) with no length limit.
    ///
    /// # Errors
    ///
    /// See [`digitize_n`](Self::digitize_n).
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> digiseq::Result<()> {
    /// use digiseq::Alphabet;
    ///
    /// let amino = Alphabet::amino();
    /// let dsq = amino.digitize("kitty")?;
    /// assert_eq!(dsq.len(), 5);
    /// assert_eq!(dsq.textize(&amino)?, "KITTY");
    /// # Ok(())
    /// # }
    /// ```
    pub fn digitize(&self, text: impl AsRef<[u8]>) -> Result<Dsq> {
        self.digitize_n(text, usize::MAX)
    }

    /// Digitize at most `len` bytes of `text` into a new [`Dsq`].
    ///
    /// # Errors
    ///
    /// * [`Error::Alloc`] if the sequence couldn't be allocated.
    /// * [`Error::Digitize`] if `text` had bytes outside the alphabet. The
    ///   error carries the digitized sequence, with "any" codes in place of the
    ///   offending bytes.
    pub fn digitize_n(&self, text: impl AsRef<[u8]>, len: usize) -> Result<Dsq> {
        let text = until_nul(text.as_ref());
        let window = &text[..text.len().min(len)];
        let codes = self.digitized_len(window);
        let mut raw = Vec::new();
        raw.try_reserve_exact(codes + 2)?;
        raw.resize(codes + 2, SENTINEL);
        match self.digitize_into(window, window.len(), &mut raw) {
            Ok(_) => Ok(Dsq(raw)),
            Err(invalid) => Err(DigitizeError {
                dsq: Dsq(raw),
                invalid,
            }
            .into()),
        }
    }

    /// Check that `text` digitizes without substitutions.
    ///
    /// # Errors
    ///
    /// [`InvalidSymbols`] describes the first unrecognized byte and how many
    /// there were.
    pub fn validate(&self, text: impl AsRef<[u8]>) -> std::result::Result<(), InvalidSymbols> {
        self.scan(until_nul(text.as_ref()), |_, _| {})
    }

    /// Convert digital codes back to text.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] on a code beyond the nonresidue
    /// code, including [`SENTINEL`]s.
    pub fn textize(&self, codes: &[u8]) -> Result<String> {
        let mut text = String::new();
        text.try_reserve_exact(codes.len())?;
        self.textize_into(codes, &mut text)?;
        Ok(text)
    }

    /// Like [`textize`](Self::textize), but appending to an existing string.
    ///
    /// # Errors
    ///
    /// See [`textize`](Self::textize). Symbols before the bad code have
    /// already been appended.
    pub fn textize_into(&self, codes: &[u8], text: &mut String) -> Result<()> {
        for (i, &x) in codes.iter().enumerate() {
            let c = self.symbol(x).ok_or_else(|| {
                Error::invalid(format!(
                    "code {x} at position {} is outside the {} alphabet",
                    i + 1,
                    self.kind()
                ))
            })?;
            text.push(char::from(c));
        }
        Ok(())
    }

    /// Lazily display digital codes as text.
    ///
    /// Alternate formatting wraps lines at the given width (default 80).
    /// Codes outside the alphabet are shown as `?`.
    ///
    /// ```
    /// use digiseq::Alphabet;
    ///
    /// let dna = Alphabet::dna();
    /// let codes = [2, 0, 3, 3, 0, 1, 0];
    /// assert_eq!(dna.display(&codes).to_string(), "GATTACA");
    /// assert_eq!(format!("{:#3}", dna.display(&codes)), "GAT\nTAC\nA");
    /// ```
    #[must_use]
    pub fn display<'a>(&'a self, codes: &'a [u8]) -> Textized<'a> {
        Textized { abc: self, codes }
    }
}

/// Displays digital codes as text.
///
/// This is created by [`Alphabet::display`] and [`Dsq::display`].
#[derive(Clone, Copy)]
pub struct Textized<'a> {
    abc: &'a Alphabet,
    codes: &'a [u8],
}

impl std::fmt::Display for Textized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let symbols = self
            .codes
            .iter()
            .map(|&x| char::from(self.abc.symbol(x).unwrap_or(b'?')));
        if f.alternate() {
            let width = f.width().unwrap_or(80).max(1);
            for (i, c) in symbols.enumerate() {
                if i > 0 && i % width == 0 {
                    f.write_str("\n")?;
                }
                write!(f, "{c}")?;
            }
        } else {
            for c in symbols {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl Debug for Textized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// An owned digital sequence.
///
/// The underlying buffer holds `L+2` bytes: a [`SENTINEL`] at each end
/// bracketing the `L` residue codes. [`Dsq`] dereferences to the residue
/// codes alone; [`as_raw`](Self::as_raw) exposes the whole buffer.
///
/// # Examples
///
/// ```
/// # fn main() -> digiseq::Result<()> {
/// use digiseq::{Alphabet, SENTINEL};
///
/// let dna = Alphabet::dna();
/// let mut dsq = dna.digitize("CATR")?;
/// assert_eq!(dsq[..3], [1, 0, 3]);
/// assert_eq!(dsq.as_raw(), [SENTINEL, 1, 0, 3, 5, SENTINEL]);
///
/// dsq.revcomp(&dna)?;
/// assert_eq!(dsq.textize(&dna)?, "YATG");
/// # Ok(())
/// # }
/// ```
///
/// # Features
///
/// * **`serde`:** When enabled, [`Dsq`] is serialized as its sequence of
///   residue codes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dsq(Vec<u8>);

impl Dsq {
    /// An empty digital sequence (just the two sentinels).
    #[must_use]
    pub fn new() -> Self {
        Self(vec![SENTINEL, SENTINEL])
    }

    /// Wrap already-digitized residue codes.
    ///
    /// The codes should belong to the alphabet the sequence will be used with;
    /// they must not include [`SENTINEL`].
    #[must_use]
    pub fn from_codes(codes: &[u8]) -> Self {
        debug_assert!(!codes.contains(&SENTINEL), "residue codes can't be sentinels");
        codes.iter().copied().collect()
    }

    /// Number of residues, not counting sentinels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len() - 2
    }

    /// Whether there are no residues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The residue codes.
    #[must_use]
    pub fn residues(&self) -> &[u8] {
        &self.0[1..self.0.len() - 1]
    }

    /// The residue codes, mutably.
    pub fn residues_mut(&mut self) -> &mut [u8] {
        let end = self.0.len() - 1;
        &mut self.0[1..end]
    }

    /// The whole buffer, sentinels included.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.0
    }

    /// Take the whole buffer, sentinels included.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.0
    }

    /// Convert back to text.
    ///
    /// # Errors
    ///
    /// See [`Alphabet::textize`].
    pub fn textize(&self, abc: &Alphabet) -> Result<String> {
        abc.textize(self.residues())
    }

    /// Lazily display as text; see [`Alphabet::display`].
    #[must_use]
    pub fn display<'a>(&'a self, abc: &'a Alphabet) -> Textized<'a> {
        abc.display(self.residues())
    }

    /// Digitize `text` onto the end of this sequence.
    ///
    /// # Errors
    ///
    /// As with [`Alphabet::digitize_into`], unrecognized bytes are appended as
    /// "any" codes and reported. Positions in the error are relative to `text`.
    pub fn append(
        &mut self,
        abc: &Alphabet,
        text: impl AsRef<[u8]>,
    ) -> std::result::Result<(), InvalidSymbols> {
        let text = until_nul(text.as_ref());
        self.0.pop();
        self.0.reserve(text.len() + 1);
        let result = abc.scan(text, |_, x| self.0.push(x));
        self.0.push(SENTINEL);
        result
    }

    /// Remove gaps in place, leaving the unaligned sequence.
    pub fn dealign(&mut self, abc: &Alphabet) {
        self.0.retain(|&x| !abc.is_gap(x));
    }

    /// Replace every degenerate code with the "any" code, for consumers that
    /// only understand canonical residues and "any".
    pub fn degen_to_any(&mut self, abc: &Alphabet) {
        let any = abc.any_code();
        for x in self.residues_mut() {
            if abc.is_degenerate(*x) {
                *x = any;
            }
        }
    }

    /// Reverse complement in place.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] unless `abc` is a nucleic
    /// alphabet.
    pub fn revcomp(&mut self, abc: &Alphabet) -> Result<()> {
        let table = abc.complement_table().ok_or_else(|| {
            Error::invalid(format!("the {} alphabet has no complements", abc.kind()))
        })?;
        let complement = |x: u8| table.get(usize::from(x)).copied().unwrap_or(x);
        let mut iter = self.residues_mut().iter_mut();
        while let Some(a) = iter.next() {
            *a = complement(*a);
            let Some(b) = iter.next_back() else { break };
            *a = complement(std::mem::replace(b, *a));
        }
        Ok(())
    }
}

impl Default for Dsq {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Dsq {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.residues()
    }
}

impl DerefMut for Dsq {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.residues_mut()
    }
}

impl FromIterator<u8> for Dsq {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut raw = vec![SENTINEL];
        raw.extend(iter);
        raw.push(SENTINEL);
        Self(raw)
    }
}

impl Debug for Dsq {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_tuple("Dsq").field(&self.residues()).finish()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Dsq, SENTINEL};

    impl Serialize for Dsq {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.residues())
        }
    }

    impl<'de> Deserialize<'de> for Dsq {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let codes = Vec::<u8>::deserialize(deserializer)?;
            if codes.contains(&SENTINEL) {
                return Err(D::Error::custom("sentinel found among residue codes"));
            }
            Ok(codes.into_iter().collect())
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::Dsq;
    use crate::Alphabet;

    #[test]
    fn dsq_roundtrip() {
        let dsq = Alphabet::dna().digitize("GATN").unwrap();
        let json = serde_json::to_string(&dsq).unwrap();
        assert_eq!(json, "[2,0,3,15]");
        assert_eq!(serde_json::from_str::<Dsq>(&json).unwrap(), dsq);
    }

    #[test]
    fn sentinel_rejected() {
        let err = serde_json::from_str::<Dsq>("[1,255,2]").unwrap_err();
        assert!(err.to_string().contains("sentinel"));
    }
}
