//! Sequence annotations: converting kept trains into 1-based, origin-wrapped
//! coordinates, enzyme cut sites, and gene variant labels.

use serde::Serialize;

use crate::{
    feature::{FeatureDatabase, FeatureType},
    kmer::KTUP,
    score::{train_matches, WT_THRESHOLD},
    train::FragTrain,
};

/// One detected feature, ORF, or protein tag. Positions are 1-based,
/// inclusive, and wrapped modulo the sequence length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    /// The library feature's stable id; absent for ORFs and protein tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<usize>,
    pub type_id: u8,
    pub start: usize,
    pub end: usize,
    pub clockwise: bool,
    pub show_feature: bool,
    /// Enzymes: the base after which the enzyme cuts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut: Option<usize>,
    /// ORFs: the 0-based reading frame the ORF was found in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orf_frame: Option<usize>,
    /// Genes only: how this match deviates from the library sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
}

impl Annotation {
    pub fn feature_type(&self) -> Option<FeatureType> {
        FeatureType::try_from(self.type_id).ok()
    }
}

/// Maps a position onto `[1, seq_len]`, wrapping in either direction. Unlike
/// a plain modulo, a position of exactly `seq_len` stays `seq_len`.
pub fn normalize_position(pos: i64, seq_len: usize) -> usize {
    let seq_len = seq_len as i64;

    let mut pos = pos;
    while pos < 1 {
        pos += seq_len;
    }
    while pos > seq_len {
        pos -= seq_len;
    }

    pos as usize
}

/// How a gene train deviates from its library sequence, if it does.
fn gene_variant_label(train: &FragTrain, matches: bool) -> Option<String> {
    if !matches && train.is_high_fidelity() {
        // A perfect-identity fragment of the gene: report which part.
        let subset_start = train.head().fragment_index as usize * KTUP;
        let subset_end = subset_start + train.stop_position() - train.start_position();
        Some(format!("subset {}..{}", subset_start + 1, subset_end + 1))
    } else if train.score > WT_THRESHOLD || train.deletes > KTUP {
        Some("variant".to_owned())
    } else if train.inserts > 2 * KTUP {
        Some("has gaps".to_owned())
    } else {
        None
    }
}

/// Promotes a kept train to an annotation, normalizing its coordinates onto
/// the circular sequence.
pub fn train_to_annotation(
    train: &FragTrain,
    db: &FeatureDatabase,
    seq_len: usize,
) -> Annotation {
    let feature = &db.features[train.info.ordinal];

    let start = normalize_position(train.start_position() as i64 + 1, seq_len);
    let end = normalize_position(train.stop_position() as i64 + 1, seq_len);

    let cut = match (feature.feature_type, feature.cut_after) {
        (FeatureType::Enzyme, Some(cut_after)) => {
            let cut = if train.info.clockwise {
                start as i64 + cut_after as i64 - 1
            } else {
                end as i64 - (cut_after as i64 - 1)
            };
            Some(normalize_position(cut, seq_len))
        }
        _ => None,
    };

    let variant_label = if feature.feature_type == FeatureType::Gene {
        gene_variant_label(train, train_matches(train))
    } else {
        None
    };

    Annotation {
        name: feature.name.clone(),
        feature_id: Some(feature.id),
        type_id: feature.feature_type as u8,
        start,
        end,
        clockwise: train.info.clockwise,
        show_feature: feature.show_feature,
        cut,
        orf_frame: None,
        variant_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::Feature,
        fragment::Frag,
        train::{FeatureInfo, FragTrain},
    };

    fn db_with(feature: Feature) -> FeatureDatabase {
        FeatureDatabase {
            name: "test".to_owned(),
            db_version: "v".to_owned(),
            features: vec![feature],
        }
    }

    fn train_at(info: FeatureInfo, positions: &[(u32, usize)]) -> FragTrain {
        let mut iter = positions.iter();
        let &(fragment_index, pos) = iter.next().unwrap();
        let mut train = FragTrain::new(
            info,
            Frag {
                feature_index: 0,
                fragment_index,
                pos,
                shift: 0,
            },
            false,
        );
        for &(fragment_index, pos) in iter {
            train
                .extend(Frag {
                    feature_index: 0,
                    fragment_index,
                    pos,
                    shift: 0,
                })
                .unwrap();
        }
        train
    }

    #[test]
    fn test_normalize_position() {
        assert_eq!(normalize_position(1, 30), 1);
        assert_eq!(normalize_position(30, 30), 30);
        assert_eq!(normalize_position(31, 30), 1);
        assert_eq!(normalize_position(33, 30), 3);
        assert_eq!(normalize_position(0, 30), 30);
        assert_eq!(normalize_position(-5, 30), 25);
    }

    #[test]
    fn test_wrapping_enzyme_cut() {
        let db = db_with(Feature {
            id: 2,
            feature_type: FeatureType::Enzyme,
            name: "DraI".to_owned(),
            sequence: "TTTAAA".to_owned(),
            cut_after: Some(3),
            show_feature: false,
        });
        let info = FeatureInfo {
            ordinal: 0,
            length: 6,
            feature_type: FeatureType::Enzyme,
            clockwise: true,
        };

        // The recognition site starts 3 bases before the origin of a 30-base
        // circular sequence.
        let annotation = train_to_annotation(&train_at(info, &[(0, 27)]), &db, 30);
        assert_eq!(annotation.start, 28);
        assert_eq!(annotation.end, 3);
        assert_eq!(annotation.cut, Some(30));
        assert!(annotation.clockwise);

        // One base later, the cut itself wraps.
        let annotation = train_to_annotation(&train_at(info, &[(0, 28)]), &db, 30);
        assert_eq!(annotation.start, 29);
        assert_eq!(annotation.end, 4);
        assert_eq!(annotation.cut, Some(1));
    }

    fn gene_feature() -> Feature {
        Feature {
            id: 7,
            feature_type: FeatureType::Gene,
            name: "KanR".to_owned(),
            sequence: "A".repeat(60),
            cut_after: None,
            show_feature: true,
        }
    }

    fn gene_info() -> FeatureInfo {
        FeatureInfo {
            ordinal: 0,
            length: 60,
            feature_type: FeatureType::Gene,
            clockwise: true,
        }
    }

    #[test]
    fn test_gene_subset_label() {
        let db = db_with(gene_feature());
        // Fragments 2..=3 only: high fidelity, but not a match.
        let train = train_at(gene_info(), &[(2, 100), (3, 112)]);

        let annotation = train_to_annotation(&train, &db, 4096);
        assert_eq!(annotation.variant_label.as_deref(), Some("subset 25..48"));
    }

    #[test]
    fn test_gene_variant_label() {
        let db = db_with(gene_feature());
        let mut train = train_at(
            gene_info(),
            &[(0, 0), (1, 12), (2, 24), (3, 36), (4, 48)],
        );
        train.score = 0.1;

        let annotation = train_to_annotation(&train, &db, 4096);
        assert_eq!(annotation.variant_label.as_deref(), Some("variant"));
    }

    #[test]
    fn test_gene_gap_label() {
        let db = db_with(gene_feature());
        let mut train = train_at(
            gene_info(),
            &[(0, 0), (1, 12), (2, 24), (3, 36), (4, 48)],
        );
        train.inserts = 25;

        let annotation = train_to_annotation(&train, &db, 4096);
        assert_eq!(annotation.variant_label.as_deref(), Some("has gaps"));
    }

    #[test]
    fn test_wild_type_gene_has_no_label() {
        let db = db_with(gene_feature());
        let train = train_at(
            gene_info(),
            &[(0, 0), (1, 12), (2, 24), (3, 36), (4, 48)],
        );

        let annotation = train_to_annotation(&train, &db, 4096);
        assert_eq!(annotation.variant_label, None);
        assert_eq!(annotation.feature_id, Some(7));
        assert_eq!(annotation.type_id, 5);
        assert_eq!(annotation.start, 1);
        assert_eq!(annotation.end, 60);
    }
}
