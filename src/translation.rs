//! Genetic codes and translation of codons into amino acids.
//!
//! A [`GeneticCode`] ties a nucleic [`Alphabet`] to an amino [`Alphabet`] through one
//! of the NCBI translation tables, or a table read from NCBI's text format.
//!
//! ```
//! # fn main() -> digiseq::Result<()> {
//! use digiseq::{Alphabet, GeneticCode};
//!
//! let (dna, amino) = (Alphabet::dna(), Alphabet::amino());
//! let mut gcode = GeneticCode::new(&dna, &amino)?;
//!
//! let codons = dna.digitize("TTTGAGCTCATAAACGAGA")?;
//! let peptide = gcode.translate_to_vec(&codons);
//! assert_eq!(amino.textize(&peptide)?, "FELINE");
//!
//! // Vertebrate mitochondria read TGA as tryptophan
//! gcode.set_standard_table(2)?;
//! assert_eq!(gcode.description(), "Vertebrate mitochondrial");
//! let codon = dna.digitize("TGA")?;
//! assert_eq!(amino.textize(&[gcode.translate_codon([codon[0], codon[1], codon[2]])])?, "W");
//! # Ok(())
//! # }
//! ```

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::Alphabet;
use crate::alphabet::as_code;
use crate::error::{Error, Result};

/// Codon order of the catalog strings: the first base varies slowest.
const CATALOG_BASES: [u8; 4] = *b"ACGU";

/// Codon order used when writing NCBI files.
const NCBI_ORDER: [u8; 4] = *b"TCAG";

struct TableData {
    id: u32,
    aas: &'static [u8; 64],
    starts: &'static [u8; 64],
    context_dependent: bool,
    desc: &'static str,
}

macro_rules! tables {
    [ $( $id:literal: $aas:literal $starts:literal $ctx:literal $desc:literal ),+ $(,)? ] => {
        [$(
            TableData { id: $id, aas: $aas, starts: $starts, context_dependent: $ctx, desc: $desc }
        ),+]
    }
}

// Sources: https://www.ncbi.nlm.nih.gov/Taxonomy/Utils/wprintgc.cgi
// Codons:   AAAAAAAAAAAAAAAACCCCCCCCCCCCCCCCGGGGGGGGGGGGGGGGUUUUUUUUUUUUUUUU
//           AAAACCCCGGGGUUUUAAAACCCCGGGGUUUUAAAACCCCGGGGUUUUAAAACCCCGGGGUUUU
//           ACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGUACGU
//
// Context-dependent codes read some codons as either sense or stop. Those
// codons are recorded here as stops.
static TABLES: [TableData; 26] = tables![
     1: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF" b"--------------M---------------M-------------------------------M-" false "Standard",
     2: b"KNKNTTTT*S*SMIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"------------MMMM------------------------------M-----------------" false "Vertebrate mitochondrial",
     3: b"KNKNTTTTRSRSMIMIQHQHPPPPRRRRTTTTEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"------------M-M-------------------------------M-----------------" false "Yeast mitochondrial",
     4: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"------------MMMM--------------M---------------M-------------M-M-" false "Mold, protozoan, coelenterate mitochondrial; Mycoplasma/Spiroplasma",
     5: b"KNKNTTTTSSSSMIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"------------MMMM------------------------------M---------------M-" false "Invertebrate mitochondrial",
     6: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVQYQYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Ciliate, Dasycladacean and Hexamita nuclear",
     9: b"NNKNTTTTSSSSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"--------------M-------------------------------M-----------------" false "Echinoderm and flatworm mitochondrial",
    10: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSCCWCLFLF" b"--------------M-------------------------------------------------" false "Euplotid nuclear",
    11: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF" b"------------MMMM--------------M---------------M---------------M-" false "Bacterial, archaeal, and plant plastid",
    12: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLSLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF" b"--------------M---------------M---------------------------------" false "Alternative yeast",
    13: b"KNKNTTTTGSGSMIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"------------M-M-------------------------------M---------------M-" false "Ascidian mitochondrial",
    14: b"NNKNTTTTSSSSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVYY*YSSSSWCWCLFLF" b"--------------M-------------------------------------------------" false "Alternative flatworm mitochondrial",
    15: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*YQYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Blepharisma nuclear",
    16: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*YLYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Chlorophycean mitochondrial",
    21: b"NNKNTTTTSSSSMIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"--------------M-------------------------------M-----------------" false "Trematode mitochondrial",
    22: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*YLY*SSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Scenedesmus obliquus mitochondrial",
    23: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWC*FLF" b"--------------MM------------------------------M-----------------" false "Thraustochytrium mitochondrial",
    24: b"KNKNTTTTSSKSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"--------------M---------------M---------------M---------------M-" false "Rhabdopleuridae mitochondrial",
    25: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSGCWCLFLF" b"--------------M-------------------------------M---------------M-" false "Candidate Division SR1 and Gracilibacteria",
    26: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLALEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF" b"--------------M---------------M---------------------------------" false "Pachysolen tannophilus nuclear",
    // TGA is W or stop
    27: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVQYQYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" true "Karyorelict nuclear",
    // all three stops are context-dependent
    28: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF" b"--------------M-------------------------------------------------" true "Condylostoma nuclear",
    29: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVYYYYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Mesodinium nuclear",
    30: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVEYEYSSSS*CWCLFLF" b"--------------M-------------------------------------------------" false "Peritrich nuclear",
    // TAA and TAG are context-dependent
    31: b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSSWCWCLFLF" b"--------------M-------------------------------------------------" true "Blastocrithidia nuclear",
    33: b"KNKNTTTTSSKSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVVYY*YSSSSWCWCLFLF" b"--------------M---------------M---------------M---------------M-" false "Cephalodiscidae mitochondrial",
];

/// The NCBI translation tables available to
/// [`GeneticCode::set_standard_table`], as `(id, description)` pairs.
pub fn standard_tables() -> impl Iterator<Item = (u32, &'static str)> {
    TABLES.iter().map(|t| (t.id, t.desc))
}

/// Write the list of available NCBI translation tables, one per line.
///
/// # Errors
///
/// Fails with [`Error::Io`] if writing fails.
pub fn write_catalog(mut w: impl Write) -> Result<()> {
    writeln!(w, "id  description")?;
    writeln!(w, "--- -----------------------------------")?;
    for (id, desc) in standard_tables() {
        writeln!(w, "{id:3} {desc}")?;
    }
    Ok(())
}

/// A genetic code: the amino acid (or stop) each of the 64 codons encodes,
/// and which codons may initiate translation.
///
/// The code borrows the nucleic and amino alphabets it was built for; their
/// digital codes are what it reads and produces. Codon `xyz` of canonical
/// nucleic codes is indexed as `16x + 4y + z`.
#[derive(Clone)]
pub struct GeneticCode<'a> {
    nt: &'a Alphabet,
    aa: &'a Alphabet,
    id: Option<u32>,
    desc: String,
    basic: [u8; 64],
    is_initiator: [bool; 64],
}

impl<'a> GeneticCode<'a> {
    /// The standard code (NCBI table 1) between `nt` and `aa`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] unless `nt` has 4 canonical
    /// residues and `aa` has 20, and both alphabets accept the standard one
    /// letter codes.
    pub fn new(nt: &'a Alphabet, aa: &'a Alphabet) -> Result<Self> {
        if nt.k() != 4 {
            return Err(Error::invalid(format!(
                "genetic codes need a nucleic alphabet with 4 canonical residues, not {}",
                nt.k()
            )));
        }
        if aa.k() != 20 {
            return Err(Error::invalid(format!(
                "genetic codes need an amino alphabet with 20 canonical residues, not {}",
                aa.k()
            )));
        }
        let mut gcode = Self {
            nt,
            aa,
            id: None,
            desc: String::new(),
            basic: [aa.nonresidue_code(); 64],
            is_initiator: [false; 64],
        };
        gcode.load(&TABLES[0])?;
        Ok(gcode)
    }

    /// Switch to NCBI translation table `id`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if there's no such table; see
    /// [`standard_tables`] for the list.
    pub fn set_standard_table(&mut self, id: u32) -> Result<()> {
        let data = TABLES
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        self.load(data)
    }

    fn load(&mut self, data: &TableData) -> Result<()> {
        let mut basic = [0; 64];
        let mut is_initiator = [false; 64];
        for i in 0..64 {
            let codon = self.catalog_codon(i)?;
            basic[codon] = self.digitize_amino(data.aas[i]).ok_or_else(|| {
                Error::invalid(format!(
                    "amino alphabet has no code for '{}'",
                    char::from(data.aas[i])
                ))
            })?;
            is_initiator[codon] = data.starts[i] == b'M';
        }
        self.basic = basic;
        self.is_initiator = is_initiator;
        self.id = Some(data.id);
        self.desc = data.desc.to_owned();
        if data.context_dependent {
            debug!(id = data.id, "context-dependent stops are read as stops");
        }
        debug!(id = data.id, desc = data.desc, "set genetic code");
        Ok(())
    }

    // Index of the `i`th catalog codon under the nucleic alphabet's codes.
    fn catalog_codon(&self, i: usize) -> Result<usize> {
        let base = |b: u8| {
            self.nt_code(b).map(usize::from).ok_or_else(|| {
                Error::invalid(format!(
                    "nucleic alphabet {:?} has no code for '{}'",
                    self.nt.symbols(),
                    char::from(b)
                ))
            })
        };
        Ok(16 * base(CATALOG_BASES[i / 16])?
            + 4 * base(CATALOG_BASES[i % 16 / 4])?
            + base(CATALOG_BASES[i % 4])?)
    }

    // U and T are interchangeable here, whichever the alphabet accepts.
    fn nt_code(&self, b: u8) -> Option<u8> {
        let alt = match b {
            b'U' => b'T',
            b'T' => b'U',
            other => other,
        };
        self.nt
            .digitize_symbol(b)
            .or_else(|| self.nt.digitize_symbol(alt))
            .filter(|&x| self.nt.is_canonical(x))
    }

    fn digitize_amino(&self, c: u8) -> Option<u8> {
        if c == b'*' {
            Some(self.aa.nonresidue_code())
        } else {
            self.aa.digitize_symbol(c)
        }
    }

    /// Restrict initiation to `AUG`.
    pub fn set_initiator_only_aug(&mut self) {
        self.is_initiator = [false; 64];
        let aug = (self.nt_code(b'A'), self.nt_code(b'U'), self.nt_code(b'G'));
        if let (Some(a), Some(u), Some(g)) = aug {
            self.is_initiator[16 * usize::from(a) + 4 * usize::from(u) + usize::from(g)] = true;
        }
    }

    /// The NCBI table id, or `None` for codes read from text.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// The NCBI table description; empty for codes read from text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.desc
    }

    /// The nucleic alphabet.
    #[must_use]
    pub fn nucleic(&self) -> &'a Alphabet {
        self.nt
    }

    /// The amino alphabet.
    #[must_use]
    pub fn amino(&self) -> &'a Alphabet {
        self.aa
    }

    /// The amino code (or the amino alphabet's nonresidue code, for stops) of
    /// each canonical codon.
    #[must_use]
    pub fn basic(&self) -> &[u8; 64] {
        &self.basic
    }

    /// Which canonical codons may initiate translation.
    #[must_use]
    pub fn initiators(&self) -> &[bool; 64] {
        &self.is_initiator
    }

    /// The text of canonical codon `index`, e.g. `"ATG"` for the standard DNA
    /// alphabet's codon 14.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`.
    #[must_use]
    pub fn decode_codon(&self, index: usize) -> String {
        assert!(index < 64, "codon index {index} out of range");
        [index / 16, index % 16 / 4, index % 4]
            .into_iter()
            .map(|x| char::from(self.nt.symbols().as_bytes()[x]))
            .collect()
    }

    // Every canonical codon a possibly degenerate one stands for.
    fn expansions(&self, codon: [u8; 3]) -> impl Iterator<Item = usize> + '_ {
        let [x, y, z] = codon;
        self.nt.members(x).flat_map(move |x| {
            self.nt.members(y).flat_map(move |y| {
                self.nt
                    .members(z)
                    .map(move |z| 16 * usize::from(x) + 4 * usize::from(y) + usize::from(z))
            })
        })
    }

    fn canonical_index(&self, codon: [u8; 3]) -> Option<usize> {
        codon
            .iter()
            .all(|&x| self.nt.is_canonical(x))
            .then(|| codon.iter().fold(0, |i, &x| 4 * i + usize::from(x)))
    }

    /// Translate a codon of nucleic codes.
    ///
    /// Degenerate codons translate to an amino acid (or stop) only when every
    /// codon they stand for agrees; otherwise, or if a position isn't a
    /// residue at all, the amino alphabet's "any" code is returned.
    ///
    /// ```
    /// # fn main() -> digiseq::Result<()> {
    /// use digiseq::{Alphabet, GeneticCode};
    ///
    /// let (dna, amino) = (Alphabet::dna(), Alphabet::amino());
    /// let gcode = GeneticCode::new(&dna, &amino)?;
    /// let translate = |codon: &str| -> digiseq::Result<String> {
    ///     let dsq = dna.digitize(codon)?;
    ///     amino.textize(&[gcode.translate_codon([dsq[0], dsq[1], dsq[2]])])
    /// };
    /// assert_eq!(translate("GGN")?, "G");
    /// assert_eq!(translate("TAR")?, "*");
    /// assert_eq!(translate("NNN")?, "X");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn translate_codon(&self, codon: [u8; 3]) -> u8 {
        if let Some(i) = self.canonical_index(codon) {
            return self.basic[i];
        }
        let mut aas = self.expansions(codon).map(|i| self.basic[i]);
        match aas.next() {
            Some(first) if aas.all(|aa| aa == first) => first,
            _ => self.aa.any_code(),
        }
    }

    /// Whether a codon of nucleic codes is an initiator.
    ///
    /// Degenerate codons are initiators only when every codon they stand for
    /// is; codons standing for nothing never are.
    #[must_use]
    pub fn is_initiator(&self, codon: [u8; 3]) -> bool {
        if let Some(i) = self.canonical_index(codon) {
            return self.is_initiator[i];
        }
        let mut seen = false;
        self.expansions(codon).all(|i| {
            seen = true;
            self.is_initiator[i]
        }) && seen
    }

    /// Translate the first reading frame of `codes`.
    ///
    /// A trailing partial codon is ignored.
    pub fn translate<'s>(&'s self, codes: &'s [u8]) -> impl Iterator<Item = u8> + 's {
        self.translate_frame(codes, 0)
    }

    /// Like [`translate`](Self::translate), collected into a [`Vec`].
    #[must_use]
    pub fn translate_to_vec(&self, codes: &[u8]) -> Vec<u8> {
        self.translate(codes).collect()
    }

    /// Translate the reading frame of `codes` whose codons start at offsets
    /// `frame`, `frame + 3`, and so on.
    ///
    /// Frames past the end of `codes` are empty.
    pub fn translate_frame<'s>(
        &'s self,
        codes: &'s [u8],
        frame: usize,
    ) -> impl Iterator<Item = u8> + 's {
        codes
            .get(frame..)
            .unwrap_or_default()
            .chunks_exact(3)
            .map(|codon| self.translate_codon([codon[0], codon[1], codon[2]]))
    }

    /// Translate a reading frame of the reverse complement of `codes`, without
    /// building the reverse complement.
    ///
    /// Frame `frame` of the reverse strand skips the last `frame` codes of
    /// `codes`.
    ///
    /// ```
    /// # fn main() -> digiseq::Result<()> {
    /// use digiseq::{Alphabet, GeneticCode};
    ///
    /// let (dna, amino) = (Alphabet::dna(), Alphabet::amino());
    /// let gcode = GeneticCode::new(&dna, &amino)?;
    /// let dsq = dna.digitize("TTACATGGCCAT")?; // reverse complement: ATGGCCATGTAA
    /// let peptide: Vec<u8> = gcode.translate_revcomp_frame(&dsq, 0)?.collect();
    /// assert_eq!(amino.textize(&peptide)?, "MAM*");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if the nucleic alphabet has no
    /// complements.
    pub fn translate_revcomp_frame<'s>(
        &'s self,
        codes: &'s [u8],
        frame: usize,
    ) -> Result<impl Iterator<Item = u8> + 's> {
        let table = self.nt.complement_table().ok_or_else(|| {
            Error::invalid(format!("the {} alphabet has no complements", self.nt.kind()))
        })?;
        let complement = move |x: u8| table.get(usize::from(x)).copied().unwrap_or(x);
        let end = codes.len().saturating_sub(frame);
        Ok(codes[..end].rchunks_exact(3).map(move |codon| {
            self.translate_codon([
                complement(codon[2]),
                complement(codon[1]),
                complement(codon[0]),
            ])
        }))
    }

    /// Translate all six reading frames: frames 0, 1 and 2 of `codes`, then
    /// frames 0, 1 and 2 of its reverse complement.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if the nucleic alphabet has no
    /// complements.
    pub fn six_frames(&self, codes: &[u8]) -> Result<[Vec<u8>; 6]> {
        let mut frames: [Vec<u8>; 6] = Default::default();
        for frame in 0..3 {
            frames[frame] = self.translate_frame(codes, frame).collect();
            frames[frame + 3] = self.translate_revcomp_frame(codes, frame)?.collect();
        }
        Ok(frames)
    }

    /// Read a genetic code in NCBI's five line format.
    ///
    /// ```text
    ///     AAs  = FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG
    ///   Starts = ---M---------------M---------------M----------------------------
    ///   Base1  = TTTTTTTTTTTTTTTTCCCCCCCCCCCCCCCCAAAAAAAAAAAAAAAAGGGGGGGGGGGGGGGG
    ///   Base2  = TTTTCCCCAAAAGGGGTTTTCCCCAAAAGGGGTTTTCCCCAAAAGGGGTTTTCCCCAAAAGGGG
    ///   Base3  = TCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAGTCAG
    /// ```
    ///
    /// Blank lines and lines starting with `#` are skipped. The codons may come
    /// in any order, but every one of the 64 must appear, every amino acid
    /// must be encoded and there must be at least one stop. A `*` on the
    /// Starts line over an amino acid marks a context-dependent stop, which is
    /// read as a plain stop.
    ///
    /// Reading stops right after the Base3 line.
    ///
    /// # Errors
    ///
    /// * [`Error::Format`] describing the first problem found.
    /// * [`Error::Io`] if reading fails.
    /// * As for [`new`](Self::new) if the alphabets are unsuitable.
    pub fn read(mut reader: impl BufRead, nt: &'a Alphabet, aa: &'a Alphabet) -> Result<Self> {
        let mut gcode = Self::new(nt, aa)?;
        let mut lines = DataLines::new(&mut reader);

        let (line, start, aas) = lines.field("AAs", "First")?;
        let mut fields = [aas, Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        for (i, (key, ordinal)) in [
            ("Starts", "Second"),
            ("Base1", "Third"),
            ("Base2", "Fourth"),
            ("Base3", "Fifth"),
        ]
        .into_iter()
        .enumerate()
        {
            let (line, s, value) = lines.field(key, ordinal)?;
            if s != start {
                let above = if i == 0 { "AAs data" } else { "data" };
                return Err(Error::format(
                    line,
                    format!("{key} data is not aligned with {above} above it"),
                ));
            }
            fields[i + 1] = value;
        }
        let [aas, starts, base1, base2, base3] = fields;
        let last = lines.line;

        let mut aa_seen = [false; 20];
        let mut stop_seen = false;
        let mut context_stops = 0;
        let mut codon_seen = [false; 64];
        for pos in 0..64 {
            let x = gcode
                .digitize_amino(aas[pos])
                .filter(|&x| aa.is_canonical(x) || aa.is_nonresidue(x))
                .ok_or_else(|| {
                    Error::format(
                        line,
                        format!(
                            "Character {} on AAs line is not an amino acid or a * (stop)",
                            char::from(aas[pos])
                        ),
                    )
                })?;
            let mut codon = 0;
            for (name, bases) in [("Base1", &base1), ("Base2", &base2), ("Base3", &base3)] {
                let b = bases[pos];
                let y = nt.digitize_symbol(b).filter(|&y| nt.is_canonical(y)).ok_or_else(|| {
                    Error::format(
                        last,
                        format!("Character {} on {name} line is not a nucleotide", char::from(b)),
                    )
                })?;
                codon = 4 * codon + usize::from(y);
            }
            let x = match starts[pos] {
                b'-' | b'm' | b'M' => x,
                b'*' if aa.is_nonresidue(x) => x,
                b'*' => {
                    context_stops += 1;
                    aa.nonresidue_code()
                }
                other => {
                    return Err(Error::format(
                        last,
                        format!(
                            "Character {} on Starts line is not a -, M, or *",
                            char::from(other)
                        ),
                    ));
                }
            };

            if aa.is_nonresidue(x) {
                stop_seen = true;
            } else {
                aa_seen[usize::from(x)] = true;
            }
            codon_seen[codon] = true;
            gcode.basic[codon] = x;
            gcode.is_initiator[codon] = matches!(starts[pos], b'm' | b'M');
        }

        if !stop_seen {
            return Err(Error::format(last, "No stop codon found in that genetic code"));
        }
        if codon_seen.contains(&false) {
            return Err(Error::format(last, "Data for fewer than 64 codons was found"));
        }
        if let Some(x) = aa_seen.iter().position(|&seen| !seen) {
            let residue = aa.symbol(as_code(x)).map_or('?', char::from);
            return Err(Error::format(last, format!("No codon for residue {residue} found")));
        }
        if context_stops > 0 {
            warn!(
                codons = context_stops,
                "context-dependent stops read as unconditional stops"
            );
        }

        gcode.id = None;
        gcode.desc.clear();
        debug!("read genetic code");
        Ok(gcode)
    }

    /// Write in NCBI's five line format, codons in `TCAG` order.
    ///
    /// With `add_comment`, codes from the NCBI catalog get a leading
    /// `# <id> <description>` comment line.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] if writing fails.
    pub fn write(&self, mut w: impl Write, add_comment: bool) -> Result<()> {
        if add_comment && let Some(id) = self.id {
            writeln!(w, "# {id} {}", self.desc)?;
        }
        let code = |b: u8| {
            self.nt_code(b).map(usize::from).ok_or_else(|| {
                Error::invalid(format!(
                    "nucleic alphabet {:?} has no code for '{}'",
                    self.nt.symbols(),
                    char::from(b)
                ))
            })
        };
        let mut order = [0; 64];
        for (x, slot) in order.iter_mut().enumerate() {
            *slot = 16 * code(NCBI_ORDER[x / 16])?
                + 4 * code(NCBI_ORDER[x % 16 / 4])?
                + code(NCBI_ORDER[x % 4])?;
        }
        let symbols = self.nt.symbols().as_bytes();
        let base = |digit: fn(usize) -> usize| -> String {
            order
                .iter()
                .map(|&c| char::from(symbols[digit(c)]))
                .collect()
        };

        let aas: String = order
            .iter()
            .map(|&c| self.aa.symbol(self.basic[c]).map_or('?', char::from))
            .collect();
        let starts: String = order
            .iter()
            .map(|&c| if self.is_initiator[c] { 'M' } else { '-' })
            .collect();
        writeln!(w, "    AAs  = {aas}")?;
        writeln!(w, "  Starts = {starts}")?;
        writeln!(w, "  Base1  = {}", base(|c| c / 16))?;
        writeln!(w, "  Base2  = {}", base(|c| c % 16 / 4))?;
        writeln!(w, "  Base3  = {}", base(|c| c % 4))?;
        Ok(())
    }
}

impl PartialEq for GeneticCode<'_> {
    /// Codes are equal when they translate and initiate identically;
    /// id and description are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.basic == other.basic && self.is_initiator == other.is_initiator
    }
}

impl Eq for GeneticCode<'_> {}

impl std::fmt::Debug for GeneticCode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("GeneticCode")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

// Non-comment, non-blank lines of a genetic code file, numbered from 1.
struct DataLines<'r, R> {
    reader: &'r mut R,
    line: usize,
    buf: String,
}

impl<'r, R: BufRead> DataLines<'r, R> {
    fn new(reader: &'r mut R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    fn next_line(&mut self) -> Result<Option<&str>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let trimmed = self.buf.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                break;
            }
        }
        Ok(Some(self.buf.trim_end()))
    }

    // Parse `<key> = <64 chars>`, returning the line number, the column where
    // the value starts and the value itself.
    fn field(&mut self, key: &str, ordinal: &str) -> Result<(usize, usize, Vec<u8>)> {
        let Some(text) = self.next_line()? else {
            let line = self.line;
            return Err(Error::format(
                line,
                format!("File empty or truncated? No {key} line found"),
            ));
        };
        let parsed = parse_field(text, key);
        let line = self.line;
        let (start, value) = parsed.ok_or_else(|| {
            Error::format(line, format!("{ordinal} data line doesn't start with '{key} ='"))
        })?;
        if value.len() != 64 {
            return Err(Error::format(line, format!("Expected 64 char of {key} data")));
        }
        Ok((line, start, value))
    }
}

// Keys match with the first letter in either case.
fn parse_field(text: &str, key: &str) -> Option<(usize, Vec<u8>)> {
    let rest = text.trim_start();
    let (first, tail) = key.split_at(1);
    let rest = rest
        .strip_prefix(first)
        .or_else(|| rest.strip_prefix(&first.to_ascii_lowercase()))?
        .strip_prefix(tail)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    let value = rest.trim_start();
    if value.is_empty() || value.contains(char::is_whitespace) {
        return None;
    }
    Some((text.len() - value.len(), value.as_bytes().to_vec()))
}
