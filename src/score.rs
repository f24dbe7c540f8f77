//! Scoring and pruning: decides which candidate trains become sequence
//! features, and which lose out to overlapping, better-supported matches.

use crate::{
    feature::{FeatureDatabase, FeatureType},
    kmer::KTUP,
    train::FragTrain,
};

/// A train is a feature when its identity error stays below this.
pub const PCT_IDENTITY_ERROR_THRESHOLD: f32 = 0.25;

/// Scores above this mark a gene as a variant rather than wild-type.
pub const WT_THRESHOLD: f32 = 0.05;

/// Inserts above this fraction of a gene's length stop being free.
const MAX_INSERT_FRACTION: f32 = 0.75;

// Scoring weights, per base. The zero weights are real policy (missing ends
// and small in-gene inserts cost nothing), kept explicit so the policy is
// inspectable.
const FACTOR_MATCH: f32 = 1.0;
const FACTOR_MISSING: f32 = 0.0;
const FACTOR_MUTATIONS: f32 = 0.3;
const FACTOR_DELETES: f32 = -0.1;
const FACTOR_INSERTS_GENE: f32 = 0.0;
const FACTOR_INSERTS: f32 = -0.1;

/// The normalized identity error of a train: 0 is a perfect full-length
/// match; 1 is no net support at all.
pub fn pct_error(train: &FragTrain) -> f32 {
    let feature_length = train.info.length as f32;

    let mut net = train.hits as f32 * FACTOR_MATCH;

    // Missing nucleotides at the ends of the sequence.
    net += (feature_length - (net + train.mutations as f32)) * FACTOR_MISSING;
    net += train.mutations as f32 * FACTOR_MUTATIONS;
    net += train.deletes as f32 * FACTOR_DELETES;

    // Genes absorb small inserts without penalty.
    let gene_insert_allowance = (train.info.length as f32 * MAX_INSERT_FRACTION) as usize;
    if train.info.feature_type != FeatureType::Gene || train.inserts > gene_insert_allowance {
        net += train.inserts as f32 * FACTOR_INSERTS;
    } else {
        net += train.inserts as f32 * FACTOR_INSERTS_GENE;
    }

    1. - net / feature_length
}

/// Whether a train is good enough to become a feature. Exact features and
/// enzymes must match base-for-base; everything else goes through the scoring
/// system.
pub fn train_matches(train: &FragTrain) -> bool {
    if train.info.feature_type.is_exacting() {
        train.hits == train.info.length
            && train.inserts == 0
            && train.deletes == 0
            && train.mutations == 0
    } else {
        pct_error(train) < PCT_IDENTITY_ERROR_THRESHOLD
    }
}

/// Per-feature pruning: walks one feature's trains in construction order,
/// dropping any train whose head is engulfed by the previously kept train,
/// and keeps those that match or, for genes, are high-fidelity fragments.
/// Kept trains get their score cached.
pub fn pick_good_trains(trains: Vec<FragTrain>) -> Vec<FragTrain> {
    let mut kept: Vec<FragTrain> = Vec::new();

    for mut train in trains {
        if let Some(prev) = kept.last() {
            if prev.start_position() <= train.start_position()
                && prev.stop_position() >= train.start_position() + KTUP - 1
            {
                continue;
            }
        }

        if train_matches(&train)
            || (train.info.feature_type == FeatureType::Gene && train.is_high_fidelity())
        {
            train.score = pct_error(&train);
            kept.push(train);
        }
    }

    kept
}

/// Cross-feature pruning over every kept train: a non-enzyme train is dropped
/// when an overlapping gene, or an overlapping same-typed feature whose name
/// contains this one's, tells the same stretch of sequence better. Enzymes
/// are always kept.
pub fn prune_overlaps(mut trains: Vec<FragTrain>, db: &FeatureDatabase) -> Vec<FragTrain> {
    trains.sort_by_key(FragTrain::left_position);

    let mut dropped = vec![false; trains.len()];

    for i in 0..trains.len() {
        let outer = &trains[i];
        if outer.info.feature_type == FeatureType::Enzyme {
            continue;
        }
        let outer_name = &db.features[outer.info.ordinal].name;

        for inner in &trains[i + 1..] {
            if inner.left_position() > outer.stop_position() as i64 {
                break;
            }

            let supersedes = inner.info.feature_type == FeatureType::Gene
                || (inner.info.feature_type == outer.info.feature_type
                    && db.features[inner.info.ordinal].name.contains(outer_name));

            if supersedes && inner.score < outer.score {
                dropped[i] = true;
                break;
            }
        }
    }

    let mut dropped = dropped.into_iter();
    trains.retain(|_| !dropped.next().unwrap());
    trains
}
