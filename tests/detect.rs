//! End-to-end detection scenarios against a small bundled library, in which
//! EK is feature id 15.

use std::io::{BufReader, Seek, SeekFrom, Write};

use plasmap::{
    errors::ErrorKind, feature_db_load::read_library, DetectOptions, Engine, FeatureIndex,
    FeatureType,
};

const LIBRARY: &str = "\
# test feature library
P:T7 TAATACGACTCACTATAGGG
P:lac TTTACACTTTATGCTTCCGGCTCG
O:ColE1 TTGAGATCCTTTTTTTCTGCGCGTAATC
G:KanR ATGAGCCATATTCAACGGGAAACGTCTTGCTCGAGG
F:FLAGcds GATTACAAGGATGACGACGATAAG
O:pUC_ori GTTCCACTGAGCGTCAGACCCCGTAGAAAAGA
R:lacO AATTGTGAGCGGATAACAATTTCA
T:rrnB_T1 AGGCATCAAATAAAACGAAAGGCTCAGT
S:M13_fwd GTAAAACGACGGCCAGTG
F:RBS AGGAGGACAGCTATGATC
G:AmpR ATGAGTATTCAACATTTCCGTGTCGCCCTTATTCCC
P:CMV TTAGTCATCGCTATTACCATGGTGATGCGGTTTTGG
O:f1_ori ACGCGCCCTGTAGCGGCGCATTAAGCGC
R:araC_op TAGCATTTTTATCCATAAGATTAGCGGATCCT
F:EK GATGACGACGACAAG
E:DraI,3/3 TTTAAA
E*:EcoRI,1/5 GAATTC
";

fn engine() -> Engine {
    Engine::new(read_library("default", LIBRARY).unwrap()).unwrap()
}

#[test]
fn it_detects_a_lone_short_feature() {
    let result = engine()
        .detect("GATGACGACGACAAG", &DetectOptions::default())
        .unwrap();

    assert_eq!(result.length, 15);
    assert_eq!(result.annotations.len(), 1);

    let ek = &result.annotations[0];
    assert_eq!(ek.name, "EK");
    assert_eq!(ek.feature_id, Some(15));
    assert_eq!(ek.start, 1);
    assert_eq!(ek.end, 15);
    assert!(ek.clockwise);
}

#[test]
fn it_detects_features_in_lower_case() {
    let result = engine()
        .detect("gatgacgacgacaag", &DetectOptions::default())
        .unwrap();

    assert_eq!(result.annotations.len(), 1);
    assert_eq!(result.annotations[0].name, "EK");
    assert_eq!(result.annotations[0].feature_id, Some(15));
}

#[test]
fn it_detects_nothing_in_featureless_sequences() {
    let engine = engine();

    for query in ["A", "ATGC", &"T".repeat(4096)] {
        let result = engine.detect(query, &DetectOptions::default()).unwrap();
        assert!(
            result.annotations.is_empty(),
            "unexpected annotations in {} bases",
            result.length
        );
    }
}

#[test]
fn it_ignores_headers_comments_and_invalid_text() {
    let raw = "\n>EK | feature id 15    \n01 GATG 04\n; This is a comment!\n;; So is this!\n05 ACGA 08\n;; this is too\n; is this?\n09 CGAC 10\n11 AAG  13";
    let result = engine().detect(raw, &DetectOptions::default()).unwrap();

    assert_eq!(result.length, 15);
    assert_eq!(result.annotations.len(), 1);
    assert_eq!(result.annotations[0].name, "EK");
    assert_eq!(result.annotations[0].feature_id, Some(15));

    // The cache key hashes the cleaned, lowercased text.
    assert_eq!(
        result.sequence_hash,
        "1b83e37e2e73584eabafc983975e875f62066e9f"
    );
}

#[test]
fn it_rejects_multi_record_input() {
    let err = engine()
        .detect(">a\nGATC\n>b\nGATC", &DetectOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadSequence);
}

#[test]
fn it_maps_an_enzyme_wrapping_the_origin() {
    let result = engine()
        .detect("aaatgaccctttgggatgaaagggcccttt", &DetectOptions::default())
        .unwrap();

    let dra = result
        .annotations
        .iter()
        .find(|a| a.name == "DraI")
        .expect("DraI site wraps the origin");
    assert_eq!(dra.start, 28);
    assert_eq!(dra.end, 3);
    assert_eq!(dra.cut, Some(30));
    assert!(dra.clockwise);
}

#[test]
fn it_wraps_the_cut_position_separately() {
    let result = engine()
        .detect("taaatgaccctttgggatgaaagggccctt", &DetectOptions::default())
        .unwrap();

    let dra = result
        .annotations
        .iter()
        .find(|a| a.name == "DraI")
        .expect("DraI site wraps the origin");
    assert_eq!(dra.start, 29);
    assert_eq!(dra.end, 4);
    assert_eq!(dra.cut, Some(1));
    assert!(dra.clockwise);
}

#[test]
fn it_detects_a_full_length_orf() {
    let query = format!("atg{}tga", "gct".repeat(278));
    let result = engine().detect(&query, &DetectOptions::default()).unwrap();

    assert_eq!(result.length, 840);
    assert_eq!(result.annotations.len(), 1);

    let orf = &result.annotations[0];
    assert_eq!(orf.name, "ORF frame 1");
    assert_eq!(orf.start, 1);
    assert_eq!(orf.end, 840);
    assert!(orf.clockwise);
    assert_eq!(orf.feature_type(), Some(FeatureType::Orf));
}

#[test]
fn it_skips_orfs_when_asked() {
    let query = format!("atg{}tga", "gct".repeat(278));
    let options = DetectOptions {
        detect_orfs: false,
        ..Default::default()
    };

    let result = engine().detect(&query, &options).unwrap();
    assert!(result.annotations.is_empty());
}

#[test]
fn it_filters_multi_cutters_on_request() {
    let query = "gaattcgcatcagtcagggaattctcagcatttaaacgtgca";
    let engine = engine();

    let all = engine.detect(query, &DetectOptions::default()).unwrap();
    let ecori = all.annotations.iter().filter(|a| a.name == "EcoRI").count();
    assert_eq!(ecori, 2);
    assert_eq!(all.annotations.iter().filter(|a| a.name == "DraI").count(), 1);

    let options = DetectOptions {
        single_cutters_only: true,
        ..Default::default()
    };
    let single = engine.detect(query, &options).unwrap();
    assert!(single.annotations.iter().all(|a| a.name != "EcoRI"));
    assert_eq!(
        single.annotations.iter().filter(|a| a.name == "DraI").count(),
        1
    );
}

#[test]
fn it_is_a_pure_function_of_its_inputs() {
    let engine = engine();
    let query = "aaatgaccctttgggatgaaagggcccttt";

    let first = engine.detect(query, &DetectOptions::default()).unwrap();
    let second = engine.detect(query, &DetectOptions::default()).unwrap();

    assert_eq!(first.sequence_hash, second.sequence_hash);
    assert_eq!(first.annotations, second.annotations);
}

#[test]
fn it_keeps_positions_inside_the_sequence() {
    let engine = engine();

    for query in [
        "GATGACGACGACAAG".to_owned(),
        "aaatgaccctttgggatgaaagggcccttt".to_owned(),
        "taaatgaccctttgggatgaaagggccctt".to_owned(),
        format!("atg{}tga", "gct".repeat(278)),
    ] {
        let result = engine.detect(&query, &DetectOptions::default()).unwrap();
        for annotation in &result.annotations {
            assert!(annotation.start >= 1 && annotation.start <= result.length);
            assert!(annotation.end >= 1 && annotation.end <= result.length);
            if let Some(cut) = annotation.cut {
                assert!(cut >= 1 && cut <= result.length);
            }
        }
    }
}

#[test]
fn it_returns_the_cleaned_sequence_on_request() {
    let options = DetectOptions {
        include_sequence: true,
        ..Default::default()
    };
    let result = engine().detect("gatg acgac\ngacaag", &options).unwrap();
    assert_eq!(result.sequence.as_deref(), Some("gatgacgacgacaag"));

    let result = engine()
        .detect("gatgacgacgacaag", &DetectOptions::default())
        .unwrap();
    assert_eq!(result.sequence, None);
}

#[test]
fn it_detects_identically_from_a_compiled_index_file() {
    let db = read_library("default", LIBRARY).unwrap();
    let index = FeatureIndex::build(&db).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    index.write(&mut file).unwrap();
    file.flush().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let loaded = FeatureIndex::read(&db, BufReader::new(file)).unwrap();
    let from_file = Engine::with_index(db, loaded);

    let result = from_file
        .detect("GATGACGACGACAAG", &DetectOptions::default())
        .unwrap();
    let reference = engine()
        .detect("GATGACGACGACAAG", &DetectOptions::default())
        .unwrap();
    assert_eq!(result.annotations, reference.annotations);
}

#[test]
fn it_serializes_to_the_expected_payload_shape() {
    let result = engine()
        .detect("GATGACGACGACAAG", &DetectOptions::default())
        .unwrap();
    let json = result.to_json().unwrap();

    assert!(json.contains("\"sequence_hash\""));
    assert!(json.contains("\"feature_id\":15"));
    assert!(json.contains("\"type_id\":1"));
    // Absent options are skipped entirely.
    assert!(!json.contains("\"sequence\""));
    assert!(!json.contains("\"cut\""));
    assert!(!json.contains("\"variant_label\""));
}
