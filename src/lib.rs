//! Feature annotation for plasmid and linear DNA sequences.
//!
//! A curated library of features (genes, promoters, origins, regulatory
//! elements, primers, restriction enzymes) is compiled into a positional
//! k-mer index. Queries are scanned against it, fragment hits are chained
//! into candidate matches tolerant of point mutations and small indels, and
//! the survivors are reported alongside open reading frames and the protein
//! tags within them.
//!
//! ```no_run
//! use plasmap::{feature_db_load::read_library, DetectOptions, Engine};
//!
//! let db = read_library("default", "E:DraI,3/3 TTTAAA").unwrap();
//! let engine = Engine::new(db).unwrap();
//! let result = engine
//!     .detect("aaatgaccctttgggatgaaagggcccttt", &DetectOptions::default())
//!     .unwrap();
//! ```

pub mod annotate;
pub mod engine;
pub mod errors;
pub mod feature;
pub mod feature_db_load;
pub mod fragment;
pub mod index;
pub mod kmer;
pub mod orf;
pub mod score;
pub mod sequence;
pub mod tags;
pub mod train;

pub use crate::{
    annotate::Annotation,
    engine::{DetectOptions, Detection, Engine},
    errors::{AnnotateError, ErrorKind},
    feature::{Feature, FeatureDatabase, FeatureType},
    index::FeatureIndex,
};
