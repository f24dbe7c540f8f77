//! A library of known sequences we can use to automatically add features to a
//! sequence; loaded from the line-oriented library text format.

use log::warn;
use regex::Regex;

use crate::{
    errors::AnnotateError,
    feature::{Feature, FeatureDatabase, FeatureType},
};

/// Parses a feature library from its text format. One feature per line:
///
/// - `E:<name>,<cut_after>/<cut_before> <sequence>` (enzyme, hidden by default)
/// - `E*:<name>,<cut_after>/<cut_before> <sequence>` (enzyme, shown by default)
/// - `<T>:<name> <sequence>` (generic, where `T` is a type letter)
///
/// Lines starting with `#` and blank lines are comments. Feature ids are
/// 1-based line-order within the library. `db_version` is left empty; the
/// builder stamps it.
pub fn read_library(name: &str, text: &str) -> Result<FeatureDatabase, AnnotateError> {
    // Unwraps are fine here: the patterns are literals.
    let enzyme_re = Regex::new(r"^E(\*)?:(\w+),(\d+)/(\d+)\s+(\S+)\s*$").unwrap();
    let generic_re = Regex::new(r"^(\w):(\S+)\s+(\S+)\s*$").unwrap();

    let mut features = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let id = features.len() + 1;

        if let Some(caps) = enzyme_re.captures(line) {
            let cut_after: usize = caps[3].parse().map_err(|_| {
                AnnotateError::bad_feature(format!("bad cut position in line: {line}"))
            })?;

            features.push(Feature {
                id,
                feature_type: FeatureType::Enzyme,
                name: caps[2].to_owned(),
                sequence: caps[5].to_uppercase(),
                cut_after: Some(cut_after),
                show_feature: caps.get(1).is_some(),
            });
        } else if let Some(caps) = generic_re.captures(line) {
            let Some(feature_type) = FeatureType::from_letter(&caps[1]) else {
                warn!("Unknown feature type letter in line: {line}");
                continue;
            };

            features.push(Feature {
                id,
                feature_type,
                name: caps[2].to_owned(),
                sequence: caps[3].to_uppercase(),
                cut_after: None,
                show_feature: true,
            });
        } else {
            warn!("Skipping unparseable library line: {line}");
        }
    }

    Ok(FeatureDatabase {
        name: name.to_owned(),
        db_version: String::new(),
        features,
    })
}
