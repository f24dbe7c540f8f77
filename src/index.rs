//! The compiled, positional k-mer index of a feature library: building it from
//! a `FeatureDatabase`, and reading/writing its line-oriented file format.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::{
    errors::AnnotateError,
    feature::{FeatureDatabase, FeatureType},
    kmer::{encode, revcomp, tail_mask, KTUP, MINFRAG},
};

/// One line of the compiled index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Local id within the index; sense and antisense orientations get
    /// separate ids.
    pub feature_index: u32,
    /// 0-based position of this k-mer within the feature, in `KTUP` steps.
    pub fragment_index: u32,
    /// 0 for full-width k-mers. For short tails, the encoding of `T`×len;
    /// the matcher uses it as a prefix bitmask.
    pub mask: u32,
    /// The k-mer code, left-aligned and `A`-padded for short tails.
    pub kmer: u32,
    /// Bases the tail was left-shifted to reach `KTUP` width; added to the
    /// query position at match time.
    pub shift: u32,
}

/// Maps a local id back to its library feature and orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedFeature {
    /// Position within `FeatureDatabase::features`.
    pub ordinal: usize,
    pub antisense: bool,
}

/// The in-memory index the matcher scans. Read-only once built; safe to share
/// across threads by reference.
#[derive(Clone, Debug, Default)]
pub struct FeatureIndex {
    /// Full-width entries (`mask == 0`), sorted by `kmer` for binary search.
    pub sorted: Vec<IndexEntry>,
    /// Short-tail entries (`mask != 0`), matched by masked prefix.
    pub tails: Vec<IndexEntry>,
    /// Local id table, rebuilt deterministically from the database.
    pub features: Vec<IndexedFeature>,
}

/// Assigns local ids: all sense features first, then antisense entries for
/// every non-enzyme feature whose reverse complement differs from its sense
/// sequence. Features shorter than `MINFRAG` are not indexed at all.
fn assign_local_ids(db: &FeatureDatabase) -> Vec<IndexedFeature> {
    let mut result = Vec::new();

    for (ordinal, feature) in db.features.iter().enumerate() {
        if feature.len() < MINFRAG {
            debug!("Ignoring small feature {}", feature.name);
            continue;
        }
        result.push(IndexedFeature {
            ordinal,
            antisense: false,
        });
    }

    let sense_count = result.len();
    for i in 0..sense_count {
        let feature = &db.features[result[i].ordinal];
        if feature.feature_type == FeatureType::Enzyme {
            continue;
        }
        if revcomp(feature.sequence.as_bytes()) != feature.sequence.as_bytes() {
            result.push(IndexedFeature {
                ordinal: result[i].ordinal,
                antisense: true,
            });
        }
    }

    result
}

impl FeatureIndex {
    /// Compiles the library. Deterministic: building twice from the same
    /// database produces identical output, byte for byte.
    pub fn build(db: &FeatureDatabase) -> Result<Self, AnnotateError> {
        let features = assign_local_ids(db);

        let mut sorted = Vec::new();
        let mut tails = Vec::new();

        for (feature_index, indexed) in features.iter().enumerate() {
            let feature = &db.features[indexed.ordinal];

            for &byte in feature.sequence.as_bytes() {
                if !matches!(byte.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N') {
                    return Err(AnnotateError::bad_feature(format!(
                        "feature {} contains a non-ACGTN base",
                        feature.name
                    )));
                }
            }

            let seq = if indexed.antisense {
                revcomp(feature.sequence.as_bytes())
            } else {
                feature.sequence.as_bytes().to_vec()
            };

            for (fragment_index, chunk) in seq.chunks(KTUP).enumerate() {
                let entry = if chunk.len() == KTUP {
                    IndexEntry {
                        feature_index: feature_index as u32,
                        fragment_index: fragment_index as u32,
                        mask: 0,
                        kmer: encode(chunk).unwrap_or(0),
                        shift: 0,
                    }
                } else if chunk.len() >= MINFRAG {
                    // A short tail; matched by its masked prefix.
                    IndexEntry {
                        feature_index: feature_index as u32,
                        fragment_index: fragment_index as u32,
                        mask: tail_mask(chunk.len()),
                        kmer: encode(chunk).unwrap_or(0),
                        shift: 0,
                    }
                } else {
                    // Too short to match on its own: borrow from the previous
                    // fragment so the entry encodes the feature's final KTUP
                    // bases. `assign_local_ids` guarantees a previous fragment
                    // exists.
                    let tail = &seq[seq.len() - KTUP..];
                    IndexEntry {
                        feature_index: feature_index as u32,
                        fragment_index: fragment_index as u32,
                        mask: 0,
                        kmer: encode(tail).unwrap_or(0),
                        shift: (KTUP - chunk.len()) as u32,
                    }
                };

                if entry.mask == 0 {
                    sorted.push(entry);
                } else {
                    tails.push(entry);
                }
            }
        }

        // Stable, so equal hashes keep emission order and the output stays
        // byte-identical across builds.
        sorted.sort_by_key(|e| e.kmer);

        Ok(Self {
            sorted,
            tails,
            features,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.sorted.len() + self.tails.len()
    }

    /// Writes the line-oriented format: a decimal count header, then one
    /// comma-terminated entry per line, full-width entries first.
    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "{}", self.entry_count())?;

        for entry in self.sorted.iter().chain(self.tails.iter()) {
            writeln!(
                w,
                "{},{},{},{},{},",
                entry.feature_index, entry.fragment_index, entry.mask, entry.kmer, entry.shift
            )?;
        }

        Ok(())
    }

    /// Reads and validates a compiled index against its database. The local
    /// id table is not stored in the file; it is rebuilt from the database,
    /// which must be the one the index was compiled from.
    pub fn read(db: &FeatureDatabase, r: impl BufRead) -> Result<Self, AnnotateError> {
        let features = assign_local_ids(db);

        let mut lines = r.lines();
        let header = lines
            .next()
            .ok_or_else(|| AnnotateError::corrupt_index("missing header"))?
            .map_err(AnnotateError::from)?;
        let count: usize = header
            .trim()
            .parse()
            .map_err(|_| AnnotateError::corrupt_index(format!("bad header line: {header}")))?;

        let mut sorted: Vec<IndexEntry> = Vec::new();
        let mut tails = Vec::new();

        for _ in 0..count {
            let line = lines
                .next()
                .ok_or_else(|| AnnotateError::corrupt_index("fewer entries than header count"))?
                .map_err(AnnotateError::from)?;

            let mut fields = [0_u32; 5];
            let mut parts = line.split(',');
            for field in &mut fields {
                *field = parts
                    .next()
                    .and_then(|p| p.trim().parse().ok())
                    .ok_or_else(|| {
                        AnnotateError::corrupt_index(format!("bad entry line: {line}"))
                    })?;
            }

            let entry = IndexEntry {
                feature_index: fields[0],
                fragment_index: fields[1],
                mask: fields[2],
                kmer: fields[3],
                shift: fields[4],
            };

            if entry.feature_index as usize >= features.len() {
                return Err(AnnotateError::corrupt_index(format!(
                    "feature index {} out of range",
                    entry.feature_index
                )));
            }

            let feature = &db.features[features[entry.feature_index as usize].ordinal];
            if entry.fragment_index as usize * KTUP >= feature.len() {
                return Err(AnnotateError::corrupt_index(format!(
                    "fragment index {} beyond feature {}",
                    entry.fragment_index, feature.name
                )));
            }

            if entry.mask == 0 {
                if !tails.is_empty() {
                    return Err(AnnotateError::corrupt_index(
                        "full-width entry after tail partition",
                    ));
                }
                if let Some(prev) = sorted.last() {
                    if entry.kmer < prev.kmer {
                        return Err(AnnotateError::corrupt_index("entries not sorted by k-mer"));
                    }
                }
                sorted.push(entry);
            } else {
                tails.push(entry);
            }
        }

        Ok(Self {
            sorted,
            tails,
            features,
        })
    }
}
