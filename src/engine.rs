//! The engine façade: one call that cleans a query, runs fragment matching,
//! train building, scoring, and ORF detection, and returns the final
//! annotation list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    annotate::{train_to_annotation, Annotation},
    errors::AnnotateError,
    feature::{FeatureDatabase, FeatureType},
    fragment::{find_fragments, Frag},
    index::FeatureIndex,
    orf::detect_orfs,
    score::{pick_good_trains, prune_overlaps, train_matches},
    sequence::{clean_sequence, sequence_hash, to_dna},
    train::{frags_to_trains, FeatureInfo, FragTrain, TrainLimits},
};

/// Per-call options.
#[derive(Clone, Copy, Debug)]
pub struct DetectOptions {
    /// Include the cleaned query in the response.
    pub include_sequence: bool,
    /// Report only enzymes whose name appears exactly once.
    pub single_cutters_only: bool,
    pub detect_orfs: bool,
    /// Cap on the position gap a mutation extension may bridge, in bases.
    pub max_mutation_gap: Option<usize>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            include_sequence: false,
            single_cutters_only: false,
            detect_orfs: true,
            max_mutation_gap: None,
        }
    }
}

/// The result of one detection call.
#[derive(Clone, Debug, Serialize)]
pub struct Detection {
    /// SHA-1 of the lowercased cleaned query; the cache key.
    pub sequence_hash: String,
    /// Cleaned query length, in bases.
    pub length: usize,
    /// Sorted by start position.
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
}

impl Detection {
    /// The JSON payload shape consumers expect.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// An immutable, compiled library plus its index. Shareable by reference
/// across threads; every call's mutable state is local to the call.
pub struct Engine {
    db: FeatureDatabase,
    index: FeatureIndex,
}

impl Engine {
    /// Compiles the library in memory.
    pub fn new(db: FeatureDatabase) -> Result<Self, AnnotateError> {
        let index = FeatureIndex::build(&db)?;
        Ok(Self { db, index })
    }

    /// Uses an index loaded from disk; it must have been compiled from `db`.
    pub fn with_index(db: FeatureDatabase, index: FeatureIndex) -> Self {
        Self { db, index }
    }

    pub fn database(&self) -> &FeatureDatabase {
        &self.db
    }

    fn feature_info(&self, local_id: u32) -> FeatureInfo {
        let indexed = self.index.features[local_id as usize];
        let feature = &self.db.features[indexed.ordinal];

        FeatureInfo {
            ordinal: indexed.ordinal,
            length: feature.len(),
            feature_type: feature.feature_type,
            clockwise: !indexed.antisense,
        }
    }

    /// Annotates a query. Pure: the same query and options always produce the
    /// same result, and the engine is untouched by per-query failures.
    pub fn detect(
        &self,
        query: &str,
        options: &DetectOptions,
    ) -> Result<Detection, AnnotateError> {
        let clean = clean_sequence(query)?;
        let sequence_hash = sequence_hash(&clean);

        let dna = to_dna(&clean);
        let seq_len = dna.len();

        // Scan the doubled sequence so features wrapping the origin of a
        // circular query are found; trains may only start within the first
        // copy.
        let mut doubled = dna.clone();
        doubled.extend_from_slice(&dna);

        let mut by_feature: BTreeMap<u32, Vec<Frag>> = BTreeMap::new();
        for frag in find_fragments(&self.index, &doubled) {
            by_feature.entry(frag.feature_index).or_default().push(frag);
        }

        let limits = TrainLimits {
            max_mutation_gap: options.max_mutation_gap,
        };

        let mut kept: Vec<FragTrain> = Vec::new();
        for (local_id, frags) in by_feature {
            let info = self.feature_info(local_id);
            let trains = frags_to_trains(info, frags, seq_len, &limits, train_matches)?;
            kept.extend(pick_good_trains(trains));
        }

        let mut annotations = Vec::new();
        for train in prune_overlaps(kept, &self.db) {
            let annotation = train_to_annotation(&train, &self.db, seq_len);

            // The doubled scan reports a feature at the origin twice.
            if !annotations.contains(&annotation) {
                annotations.push(annotation);
            }
        }

        if options.detect_orfs {
            annotations.append(&mut detect_orfs(&dna));
        }

        annotations.sort_by_key(|a| a.start);

        if options.single_cutters_only {
            annotations = filter_single_cutters(annotations);
        }

        Ok(Detection {
            sequence_hash,
            length: seq_len,
            annotations,
            sequence: options.include_sequence.then_some(clean),
        })
    }
}

/// Drops enzyme annotations whose name cuts the sequence more than once.
fn filter_single_cutters(annotations: Vec<Annotation>) -> Vec<Annotation> {
    let mut cut_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for annotation in &annotations {
        if annotation.feature_type() == Some(FeatureType::Enzyme) {
            *cut_counts.entry(&annotation.name).or_default() += 1;
        }
    }

    let multi: Vec<String> = cut_counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(name, _)| name.to_owned())
        .collect();

    annotations
        .into_iter()
        .filter(|a| {
            a.feature_type() != Some(FeatureType::Enzyme) || !multi.contains(&a.name)
        })
        .collect()
}
