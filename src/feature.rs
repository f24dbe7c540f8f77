//! The feature data model: library entries, their types, and the feature
//! database a compiled index is built from.

use std::{
    fs,
    io::{self, ErrorKind},
    path::Path,
};

use bincode::{config, Decode, Encode};
use num_enum::TryFromPrimitive;
use strum_macros::EnumIter;

/// The closed set of feature types the scorer dispatches on. The u8 repr is
/// the type id used in annotation payloads and compiled databases.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, TryFromPrimitive, EnumIter)]
#[repr(u8)]
pub enum FeatureType {
    Feature = 1,
    Promoter = 2,
    Primer = 3,
    Enzyme = 4,
    Gene = 5,
    Origin = 6,
    Regulatory = 7,
    Terminator = 8,
    ExactFeature = 9,
    /// Not a library type; produced by the ORF scanner.
    Orf = 10,
}

impl Default for FeatureType {
    fn default() -> Self {
        Self::Feature
    }
}

impl FeatureType {
    /// For displaying in annotation listings.
    pub fn to_string(self) -> String {
        match self {
            Self::Feature => "Feature",
            Self::Promoter => "Promoter",
            Self::Primer => "Primer",
            Self::Enzyme => "Enzyme",
            Self::Gene => "Gene",
            Self::Origin => "Origin",
            Self::Regulatory => "Regulatory",
            Self::Terminator => "Terminator",
            Self::ExactFeature => "ExactFeature",
            Self::Orf => "ORF",
        }
        .to_owned()
    }

    /// Parse from the library text format's single-letter tag.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "F" => Some(Self::Feature),
            "P" => Some(Self::Promoter),
            "S" => Some(Self::Primer),
            "E" => Some(Self::Enzyme),
            "G" => Some(Self::Gene),
            "O" => Some(Self::Origin),
            "R" => Some(Self::Regulatory),
            "T" => Some(Self::Terminator),
            "f" => Some(Self::ExactFeature),
            _ => None,
        }
    }

    /// Enzymes and exact features must match base-for-base; everything else
    /// goes through the scoring system.
    pub fn is_exacting(self) -> bool {
        matches!(self, Self::Enzyme | Self::ExactFeature)
    }
}

/// One library entry, in canonical (sense) orientation. Immutable once the
/// index is built.
#[derive(Clone, Debug, Encode, Decode)]
pub struct Feature {
    /// Stable within the library; 1-based, in library order.
    pub id: usize,
    pub feature_type: FeatureType,
    pub name: String,
    /// Uppercase IUPAC DNA.
    pub sequence: String,
    /// Enzymes only: 1-based base count from the 5' end of the recognition
    /// site to the cut point.
    pub cut_after: Option<usize>,
    /// Display hint, propagated unchanged into annotations.
    pub show_feature: bool,
}

impl Feature {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A named set of features. `db_version` is opaque to the engine; consumers
/// use it to invalidate cached annotations when the library is rebuilt.
#[derive(Clone, Default, Debug, Encode, Decode)]
pub struct FeatureDatabase {
    pub name: String,
    pub db_version: String,
    pub features: Vec<Feature>,
}

impl FeatureDatabase {
    /// Save as our compact binary format.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let encoded = bincode::encode_to_vec(self, config::standard())
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        fs::write(path, encoded)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        let (db, _): (Self, usize) = bincode::decode_from_slice(&data, config::standard())
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_round_trip() {
        for (id, t) in [
            (1, FeatureType::Feature),
            (4, FeatureType::Enzyme),
            (5, FeatureType::Gene),
            (9, FeatureType::ExactFeature),
            (10, FeatureType::Orf),
        ] {
            assert_eq!(t as u8, id);
            assert_eq!(FeatureType::try_from(id).unwrap(), t);
        }
        assert!(FeatureType::try_from(11).is_err());
    }

    #[test]
    fn test_from_letter() {
        assert_eq!(FeatureType::from_letter("E"), Some(FeatureType::Enzyme));
        assert_eq!(
            FeatureType::from_letter("f"),
            Some(FeatureType::ExactFeature)
        );
        assert_eq!(FeatureType::from_letter("G"), Some(FeatureType::Gene));
        assert_eq!(FeatureType::from_letter("x"), None);
    }

    #[test]
    fn test_db_save_load() {
        let db = FeatureDatabase {
            name: "default".to_owned(),
            db_version: "v1".to_owned(),
            features: vec![Feature {
                id: 1,
                feature_type: FeatureType::Enzyme,
                name: "DraI".to_owned(),
                sequence: "TTTAAA".to_owned(),
                cut_after: Some(3),
                show_feature: false,
            }],
        };

        let file = tempfile::NamedTempFile::new().unwrap();
        db.save(file.path()).unwrap();
        let loaded = FeatureDatabase::load(file.path()).unwrap();

        assert_eq!(loaded.name, db.name);
        assert_eq!(loaded.db_version, db.db_version);
        assert_eq!(loaded.features.len(), 1);
        assert_eq!(loaded.features[0].name, "DraI");
        assert_eq!(loaded.features[0].cut_after, Some(3));
    }
}
