//! The fragment matcher: streams the query's k-mers against the compiled
//! index and emits raw hits for the train builder.

use na_seq::Nucleotide;

use crate::{
    index::FeatureIndex,
    kmer::{nt_value, KMER_MASK, KTUP},
};

/// One match of a query k-mer against an index entry.
///
/// Example: feature_index 56, fragment_index 3, pos 1234: the fourth fragment
/// of local feature 56 was found at query position 1234. For borrowed tails
/// the entry's shift is already folded into `pos`, so positions always refer
/// to the fragment's nominal start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frag {
    pub feature_index: u32,
    pub fragment_index: u32,
    /// 0-based, against the (doubled) query.
    pub pos: usize,
    /// The matched entry's shift, already incorporated into `pos`.
    pub shift: u32,
}

/// Scans every `KTUP` window of `seq` with a rolling hash. Full-width entries
/// are found by binary search; short tails by masked-prefix comparison. Hits
/// are emitted in window order, which is not sorted once tail shifts apply;
/// the train builder sorts.
pub fn find_fragments(index: &FeatureIndex, seq: &[Nucleotide]) -> Vec<Frag> {
    let mut result = Vec::new();

    if seq.len() < KTUP {
        return result;
    }

    let mut hash = 0_u32;
    for (i, &nt) in seq.iter().enumerate() {
        hash = ((hash << 2) | nt_value(nt)) & KMER_MASK;

        if i + 1 < KTUP {
            continue;
        }
        let pos = i + 1 - KTUP;

        // All full-width entries with this exact code.
        let start = index.sorted.partition_point(|e| e.kmer < hash);
        for entry in index.sorted[start..].iter().take_while(|e| e.kmer == hash) {
            result.push(Frag {
                feature_index: entry.feature_index,
                fragment_index: entry.fragment_index,
                pos: pos + entry.shift as usize,
                shift: entry.shift,
            });
        }

        // Short tails: the window's leading bases against the entry's mask.
        for entry in &index.tails {
            if hash & entry.mask == entry.kmer {
                result.push(Frag {
                    feature_index: entry.feature_index,
                    fragment_index: entry.fragment_index,
                    pos: pos + entry.shift as usize,
                    shift: entry.shift,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use na_seq::seq_from_str;

    use super::*;
    use crate::{
        feature::{Feature, FeatureDatabase, FeatureType},
        index::FeatureIndex,
    };

    fn db() -> FeatureDatabase {
        FeatureDatabase {
            name: "test".to_owned(),
            db_version: "v".to_owned(),
            features: vec![
                Feature {
                    id: 1,
                    feature_type: FeatureType::Feature,
                    name: "EK".to_owned(),
                    sequence: "GATGACGACGACAAG".to_owned(),
                    cut_after: None,
                    show_feature: true,
                },
                Feature {
                    id: 2,
                    feature_type: FeatureType::Enzyme,
                    name: "DraI".to_owned(),
                    sequence: "TTTAAA".to_owned(),
                    cut_after: Some(3),
                    show_feature: false,
                },
            ],
        }
    }

    #[test]
    fn test_full_width_and_borrowed_tail_hits() {
        let index = FeatureIndex::build(&db()).unwrap();
        let seq = seq_from_str("gatgacgacgacaag");

        let mut hits: Vec<Frag> = find_fragments(&index, &seq)
            .into_iter()
            .filter(|f| f.feature_index == 0)
            .collect();
        hits.sort_by_key(|f| f.pos);

        // Fragment 0 at 0; the borrowed tail matches at window 3, adjusted by
        // its shift of 9 to the nominal fragment start.
        assert_eq!(
            hits,
            vec![
                Frag {
                    feature_index: 0,
                    fragment_index: 0,
                    pos: 0,
                    shift: 0,
                },
                Frag {
                    feature_index: 0,
                    fragment_index: 1,
                    pos: 12,
                    shift: 9,
                },
            ]
        );
    }

    #[test]
    fn test_masked_tail_hits() {
        let index = FeatureIndex::build(&db()).unwrap();

        // DraI's site followed by arbitrary bases: the 6-base prefix matches.
        let hits = find_fragments(&index, &seq_from_str("tttaaagctagcgt"));
        let dra: Vec<&Frag> = hits.iter().filter(|f| f.feature_index == 1).collect();
        assert_eq!(dra.len(), 1);
        assert_eq!(dra[0].pos, 0);
        assert_eq!(dra[0].fragment_index, 0);

        // An all-T window must not satisfy the masked comparison.
        let hits = find_fragments(&index, &seq_from_str(&"t".repeat(24)));
        assert!(hits.iter().all(|f| f.feature_index != 1));
    }

    #[test]
    fn test_short_query_has_no_hits() {
        let index = FeatureIndex::build(&db()).unwrap();
        assert!(find_fragments(&index, &seq_from_str("acgt")).is_empty());
    }
}
