//! Helpers for working with [`proptest`]

use proptest::arbitrary::Arbitrary;
use proptest::collection::SizeRange;
use proptest::sample::Select;
use proptest::strategy::Strategy;

use crate::{Alphabet, AlphabetKind};

impl Arbitrary for AlphabetKind {
    type Parameters = ();
    type Strategy = Select<AlphabetKind>;

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        proptest::sample::select(&[
            AlphabetKind::Unknown,
            AlphabetKind::Rna,
            AlphabetKind::Dna,
            AlphabetKind::Amino,
            AlphabetKind::Nonstandard,
        ])
    }
}

/// Strategy picking one of the DNA, RNA and amino alphabets.
pub fn standard_alphabet() -> Select<Alphabet> {
    proptest::sample::select(vec![Alphabet::dna(), Alphabet::rna(), Alphabet::amino()])
}

/// Strategy for text of `abc`'s canonical symbols.
pub fn canonical_text<S: Into<SizeRange>>(
    abc: &Alphabet,
    size: S,
) -> impl Strategy<Value = String> + use<S> {
    let symbols: Vec<char> = abc.symbols().chars().take(abc.k()).collect();
    proptest::collection::vec(proptest::sample::select(symbols), size)
        .prop_map(String::from_iter)
}

/// Strategy for residue codes of `abc`: canonical, gap, degenerate or "any",
/// but never the nonresidue code.
pub fn residue_codes<S: Into<SizeRange>>(
    abc: &Alphabet,
    size: S,
) -> proptest::collection::VecStrategy<std::ops::Range<u8>> {
    proptest::collection::vec(0..abc.nonresidue_code(), size)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{ProptestConfig, any};
    use proptest::proptest;

    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn kinds_parse_back(kind in any::<AlphabetKind>()) {
            assert_eq!(kind.to_string().parse::<AlphabetKind>().unwrap(), kind);
        }

        #[test]
        fn residue_codes_textize(codes in residue_codes(&Alphabet::amino(), 0..50)) {
            let amino = Alphabet::amino();
            let text = amino.textize(&codes).unwrap();
            assert!(!text.contains('*'));
            assert_eq!(amino.digitize(&text).unwrap().residues(), codes.as_slice());
        }
    }
}
