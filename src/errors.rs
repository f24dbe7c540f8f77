//! The errors the annotation engine can return.

use std::{error::Error as StdError, fmt, io};

/// What went wrong, at the level callers dispatch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query contains disallowed characters, or more than one FASTA record.
    BadSequence,
    /// A library feature contains a non-ACGTN base; raised at index-build time.
    BadFeature,
    /// The compiled index file is malformed.
    CorruptIndex,
    /// A train violated its ordering invariants. Fatal for the call.
    InternalInvariant,
}

/// The only error type the engine returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotateError {
    pub kind: ErrorKind,
    /// A description of what went wrong.
    pub msg: String,
}

impl AnnotateError {
    pub fn bad_sequence(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BadSequence,
            msg: msg.into(),
        }
    }

    pub fn bad_feature(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BadFeature,
            msg: msg.into(),
        }
    }

    pub fn corrupt_index(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::CorruptIndex,
            msg: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InternalInvariant,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::BadSequence => write!(f, "Bad sequence: {}", self.msg),
            ErrorKind::BadFeature => write!(f, "Bad feature: {}", self.msg),
            ErrorKind::CorruptIndex => write!(f, "Corrupt index: {}", self.msg),
            ErrorKind::InternalInvariant => write!(f, "Internal invariant violated: {}", self.msg),
        }
    }
}

impl StdError for AnnotateError {}

impl From<io::Error> for AnnotateError {
    fn from(err: io::Error) -> Self {
        // The only I/O the engine itself performs is reading a compiled index.
        Self::corrupt_index(err.to_string())
    }
}
