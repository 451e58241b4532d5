//! [`digiseq`](crate) digitizes biological sequences into small integer codes and
//! works with them directly: scoring and counting degenerate residues, reverse
//! complementing, and translating codons through the NCBI genetic codes.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // `Alphabet`s map symbols to codes: canonical residues first, then the gap,
//! // the degenerate residues and finally "any"
//! use digiseq::{Alphabet, AlphabetKind};
//!
//! let dna = Alphabet::new(AlphabetKind::Dna)?;
//! assert_eq!(dna.symbols(), "ACGT-RYMKSWHBVDN");
//! assert_eq!((dna.k(), dna.kp()), (4, 16));
//!
//! // Digitized sequences are bracketed by sentinels
//! use digiseq::SENTINEL;
//! let mut dsq = dna.digitize("gaTTaca")?;
//! assert_eq!(dsq.as_raw(), [SENTINEL, 2, 0, 3, 3, 0, 1, 0, SENTINEL]);
//! // ...but behave like slices of residue codes
//! assert_eq!(dsq[0], 2);
//!
//! dsq.revcomp(&dna)?;
//! assert_eq!(dsq.textize(&dna)?, "TGTAATC");
//! // Displayed sequences can be line-wrapped by using alternate formatting:
//! assert_eq!(format!("{:#4}", dsq.display(&dna)), "TGTA\nATC");
//!
//! // Bad symbols don't stop digitization; the error says what went wrong and
//! // keeps what was digitized
//! use digiseq::Error;
//! let Err(Error::Digitize(err)) = dna.digitize("AC#T") else { unreachable!() };
//! assert_eq!(err.invalid().position(), 3);
//! assert_eq!(err.dsq().textize(&dna)?, "ACNT");
//!
//! // Degenerate codes stand for sets of canonical residues
//! let r = dna.digitize_symbol(b'R').ok_or("no R")?;
//! assert!(dna.members(r).eq([0, 2]));
//!
//! // ...which scores and counts take into account
//! let scores = [4, -2, 2, -4];
//! assert_eq!(dna.avg_score(r, &scores), 3);
//! let mut counts = [0.0; 4];
//! dna.count(&mut counts, r, 1.0);
//! assert_eq!(counts, [0.5, 0.0, 0.5, 0.0]);
//!
//! // Custom alphabets are built with `AlphabetBuilder`
//! use digiseq::AlphabetBuilder;
//! let mut builder = AlphabetBuilder::new("01-9~", 2, 5)?;
//! builder.degeneracy(b'9', "01")?.case_insensitive()?;
//! let binary = builder.finish();
//! assert_eq!(binary.kind(), AlphabetKind::Nonstandard);
//!
//! // And it's easy to translate DNA into peptides:
//! use digiseq::GeneticCode;
//! let amino = Alphabet::amino();
//! let gcode = GeneticCode::new(&dna, &amino)?;
//!
//! let codons = dna.digitize("TTTGAGCTCATAAACGAGA")?;
//! let peptide = gcode.translate_to_vec(&codons);
//! assert_eq!(amino.textize(&peptide)?, "FELINE");
//!
//! // Even degenerate DNA can be translated:
//! let codons = dna.digitize("MTTGCGTCTCCCGAGCGC")?;
//! let peptide = gcode.translate_to_vec(&codons);
//! assert_eq!(amino.textize(&peptide)?, "XASPER");
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! * **`serde`:** [`Serialize`](::serde::Serialize)/[`Deserialize`](::serde::Deserialize)
//!   for [`AlphabetKind`] and [`Dsq`].
//! * **`proptest`:** [`Arbitrary`](::proptest::arbitrary::Arbitrary) for [`AlphabetKind`]
//!   and strategies for alphabets and sequences in the [`proptest`](crate::proptest) module.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

mod alphabet;
mod builder;
mod dsq;
mod score;

pub mod error;
#[cfg(any(feature = "proptest", test))]
pub mod proptest;
pub mod translation;

pub use alphabet::{Alphabet, AlphabetKind, MAX_KP};
pub use builder::AlphabetBuilder;
pub use dsq::{Dsq, SENTINEL, Textized};
pub use error::{DigitizeError, Error, InvalidSymbols, Result};
pub use score::Score;
pub use translation::GeneticCode;
