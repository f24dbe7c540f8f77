//! The train builder: chains raw fragment hits of one feature into candidate
//! contiguous matches, tolerating point mutations and small indels. Where a
//! hit could mean either "one long feature with an indel" or "two adjacent
//! shorter matches", the builder forks and lets the scorer decide.

use log::debug;

use crate::{
    errors::AnnotateError,
    feature::FeatureType,
    fragment::Frag,
    kmer::KTUP,
};

/// Inserts bigger than this fraction of the feature probably mean two
/// separate features, or a feature that is really split.
const MAX_INSERT_FRACTION_NUM: usize = 3;
const MAX_INSERT_FRACTION_DEN: usize = 4;

/// Need at least 20% of the feature length matched to be high-fidelity.
const HIGH_FIDELITY_CUTOFF: f32 = 0.2;

/// The feature a group of hits belongs to, as the train builder and scorer
/// need it: the library ordinal plus the values dispatched on.
#[derive(Clone, Copy, Debug)]
pub struct FeatureInfo {
    /// Position within `FeatureDatabase::features`.
    pub ordinal: usize,
    /// Feature length, in bases.
    pub length: usize,
    pub feature_type: FeatureType,
    /// False when the hits are against the antisense orientation.
    pub clockwise: bool,
}

/// An ordered run of hits of one feature in one orientation: a candidate for
/// promotion to a sequence feature.
#[derive(Clone, Debug)]
pub struct FragTrain {
    pub info: FeatureInfo,
    frags: Vec<Frag>,
    /// Matched bases, counting partial trailing fragments at their true size.
    pub hits: usize,
    /// Born out of a speculative fork; short trains are never extended across
    /// indels, which prevents runaway forking.
    pub short: bool,
    /// Bases in fragments presumed mutated (skipped without displacement).
    pub mutations: usize,
    /// Bases inserted into the query relative to the feature.
    pub inserts: usize,
    /// Bases deleted from the query relative to the feature.
    pub deletes: usize,
    /// `pct_error` cached by the scorer when the train is kept.
    pub score: f32,
}

impl FragTrain {
    pub fn new(info: FeatureInfo, frag: Frag, short: bool) -> Self {
        let mut result = Self {
            info,
            frags: Vec::new(),
            hits: 0,
            short,
            mutations: 0,
            inserts: 0,
            deletes: 0,
            score: 0.,
        };

        // A first fragment can't violate ordering.
        result
            .extend(frag)
            .expect("first fragment always extends an empty train");
        result
    }

    /// How many bases of this fragment were actually matched: `KTUP`, except
    /// for a trailing partial fragment.
    fn hit_score(&self, frag: &Frag) -> usize {
        let score = self.info.length - frag.fragment_index as usize * KTUP;
        score.min(KTUP)
    }

    /// Appends a hit and credits its matched bases.
    pub fn extend(&mut self, frag: Frag) -> Result<(), AnnotateError> {
        if let Some(tail) = self.frags.last() {
            if frag.fragment_index <= tail.fragment_index || frag.pos <= tail.pos {
                return Err(AnnotateError::internal(format!(
                    "non-advancing train extension: {tail:?} -> {frag:?}"
                )));
            }
        }

        self.hits += self.hit_score(&frag);
        self.frags.push(frag);
        Ok(())
    }

    pub fn head(&self) -> &Frag {
        &self.frags[0]
    }

    pub fn tail(&self) -> &Frag {
        self.frags.last().expect("trains are never empty")
    }

    pub fn len(&self) -> usize {
        self.frags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frags.is_empty()
    }

    pub fn start_position(&self) -> usize {
        self.head().pos
    }

    /// The last matched base. If the tail hit is the feature's trailing
    /// partial fragment, only its true width counts.
    pub fn stop_position(&self) -> usize {
        let tail = self.tail();
        let last_fragment = (self.info.length - 1) / KTUP;

        if tail.fragment_index as usize == last_fragment && self.info.length % KTUP != 0 {
            tail.pos + self.info.length % KTUP - 1
        } else {
            tail.pos + KTUP - 1
        }
    }

    /// The left-most sequence position: the start for sense trains; for
    /// antisense, the start minus the spanned length.
    pub fn left_position(&self) -> i64 {
        let start = self.start_position() as i64;
        if self.info.clockwise {
            start
        } else {
            2 * start - self.stop_position() as i64
        }
    }

    /// Perfect identity over at least 20% of the feature.
    pub fn is_high_fidelity(&self) -> bool {
        self.inserts == 0
            && self.deletes == 0
            && self.hits as f32 >= HIGH_FIDELITY_CUTOFF * self.info.length as f32
    }
}

/// Position and alignment differences between a candidate hit and a train's
/// tail fragment.
struct Link {
    frag_index_diff: i64,
    seq_pos_diff: i64,
    insert_size: i64,
}

impl Link {
    fn new(train: &FragTrain, frag: &Frag) -> Self {
        let tail = train.tail();
        let frag_index_diff = frag.fragment_index as i64 - tail.fragment_index as i64;
        let seq_pos_diff = frag.pos as i64 - (tail.pos + KTUP) as i64;

        Self {
            frag_index_diff,
            seq_pos_diff,
            insert_size: seq_pos_diff - (frag_index_diff - 1) * KTUP as i64,
        }
    }

    fn is_consecutive(&self) -> bool {
        self.frag_index_diff == 1 && self.seq_pos_diff == 0
    }

    fn is_nonoverlapping(&self) -> bool {
        self.frag_index_diff > 0 && self.seq_pos_diff >= 0
    }
}

/// Caps on speculative train growth.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrainLimits {
    /// Refuse a same-alignment extension whose position gap exceeds this many
    /// bases. `None` leaves the score threshold as the only safeguard.
    pub max_mutation_gap: Option<usize>,
}

/// Converts the hits of a single local feature into candidate trains.
///
/// `seq_len` is the undoubled query length: hits beyond it may extend existing
/// trains (that is how origin-wrapping features are found) but never start new
/// ones. `matches` is the scorer's quality callback, used when deciding
/// whether a fork is worth keeping.
pub fn frags_to_trains(
    info: FeatureInfo,
    mut frags: Vec<Frag>,
    seq_len: usize,
    limits: &TrainLimits,
    matches: impl Fn(&FragTrain) -> bool,
) -> Result<Vec<FragTrain>, AnnotateError> {
    // The matcher emits hits in window order; tail shifts can perturb that.
    frags.sort_by_key(|f| (f.pos, f.fragment_index));

    let mut trains: Vec<FragTrain> = Vec::new();

    let max_insert_gap = (info.length * MAX_INSERT_FRACTION_NUM / MAX_INSERT_FRACTION_DEN) as i64;

    for frag in frags {
        // Default to making a new train from the fragment; if the fragment
        // extends a train across an indel, the new train is marked short.
        let mut create_new_train = true;
        let mut new_train_is_short = false;

        let mut tx = 0;
        while tx < trains.len() {
            let link = Link::new(&trains[tx], &frag);

            if link.is_consecutive() {
                trains[tx].extend(frag)?;
                create_new_train = false;
            } else if !trains[tx].short && link.is_nonoverlapping() {
                if link.insert_size == 0 {
                    // Mutation: the skipped fragments line up exactly, so
                    // their bases are presumed mutated.
                    let within_cap = limits
                        .max_mutation_gap
                        .map(|cap| link.seq_pos_diff <= cap as i64)
                        .unwrap_or(true);

                    if within_cap {
                        trains[tx].extend(frag)?;
                        trains[tx].mutations += link.seq_pos_diff as usize;
                        create_new_train = false;
                    }
                } else if link.insert_size > 0 && link.seq_pos_diff < max_insert_gap {
                    // Insert. The sequence may really be two separate features
                    // misread as one with an insertion, so hedge: keep a copy
                    // of the train as it stands, and only extend the original.
                    if matches(&trains[tx]) {
                        let mut keep = trains[tx].clone();
                        keep.short = true;
                        trains.push(keep);
                    }

                    trains[tx].extend(frag)?;
                    trains[tx].inserts += link.insert_size as usize;

                    // An insert should only cost one fragment, but the splice
                    // sites may carry mutations, so allow for two; all other
                    // skipped fragments must be mutated.
                    if link.frag_index_diff > 3 {
                        trains[tx].mutations += (link.frag_index_diff as usize - 3) * KTUP;
                    }

                    new_train_is_short = true;
                } else if link.insert_size < 0 {
                    // Delete. Evaluate a hypothetical train with the maximum
                    // possible remaining hits; only fork if it could match.
                    let mut hypo = trains[tx].clone();
                    hypo.deletes += link.insert_size.unsigned_abs() as usize;
                    hypo.hits = KTUP * (hypo.len() + 1) + info.length
                        - frag.fragment_index as usize * KTUP;

                    if matches(&hypo) {
                        // The copy goes before the cursor so it is not
                        // revisited for this fragment; the cursor moves past
                        // it onto the original, which is then extended.
                        let keep = trains[tx].clone();
                        trains.insert(tx, keep);
                        tx += 1;

                        trains[tx].extend(frag)?;
                        trains[tx].deletes += link.insert_size.unsigned_abs() as usize;
                    }
                }
            }

            tx += 1;
        }

        if create_new_train && frag.pos <= seq_len {
            trains.push(FragTrain::new(info, frag, new_train_is_short));
        }
    }

    debug!(
        "{} hits -> {} trains for feature ordinal {}",
        trains.iter().map(FragTrain::len).sum::<usize>(),
        trains.len(),
        info.ordinal
    );

    Ok(trains)
}
