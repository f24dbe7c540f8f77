//! Query preparation: FASTA stripping, character validation, cache-key
//! hashing, and conversion to the normalized DNA the engine scans.

use na_seq::{seq_from_str, Seq};
use sha1::{Digest, Sha1};

use crate::{errors::AnnotateError, kmer::normalize_base};

/// Characters that may remain after cleaning; degenerate IUPAC codes included.
const ALLOWED: &str = "ATGCNBDHKMRSVWYU*-";

/// Strips one FASTA header and `;` comment lines, removes anything outside
/// `[A-Za-z*-]`, and validates the remainder against the IUPAC alphabet.
///
/// A second `>` record is an error: multi-record input has no single circular
/// coordinate system.
pub fn clean_sequence(raw: &str) -> Result<String, AnnotateError> {
    let mut result = String::with_capacity(raw.len());
    let mut header_seen = false;

    for line in raw.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with(';') {
            continue;
        }
        if trimmed.starts_with('>') {
            if header_seen {
                return Err(AnnotateError::bad_sequence(
                    "more than one FASTA record in input",
                ));
            }
            header_seen = true;
            continue;
        }

        result.extend(
            line.chars()
                .filter(|c| c.is_ascii_alphabetic() || *c == '*' || *c == '-'),
        );
    }

    for c in result.chars() {
        if !ALLOWED.contains(c.to_ascii_uppercase()) {
            return Err(AnnotateError::bad_sequence(format!(
                "disallowed character '{c}'"
            )));
        }
    }

    Ok(result)
}

/// The cache key consumers store results under: SHA-1 of the lowercased
/// cleaned sequence.
pub fn sequence_hash(clean: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(clean.to_lowercase().as_bytes());

    let digest = hasher.finalize();
    let mut result = String::with_capacity(digest.len() * 2);
    for byte in digest {
        result.push_str(&format!("{byte:02x}"));
    }

    result
}

/// The cleaned query, collapsed onto plain DNA for scanning and translation.
pub fn to_dna(clean: &str) -> Seq {
    let normalized: String = clean.bytes().map(|b| normalize_base(b) as char).collect();

    seq_from_str(&normalized)
}
