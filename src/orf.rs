//! Open-reading-frame detection: six-frame translation of the doubled
//! sequence, `M…*` regions of at least 150 amino acids, and known protein
//! tags within them.

use na_seq::{seq_complement, AaIdent, AminoAcid, CodingResult, Nucleotide};

use crate::{
    annotate::{normalize_position, Annotation},
    feature::FeatureType,
    tags::PROTEIN_TAGS,
};

/// Shortest protein worth reporting, in amino acids.
pub const MIN_PROTEIN_LEN: usize = 150;

/// Standard-table translation, stops as `*`. Trailing partial codons are
/// dropped.
fn translate(seq: &[Nucleotide]) -> String {
    let mut result = String::with_capacity(seq.len() / 3);

    for codon in seq.chunks_exact(3) {
        match AminoAcid::from_codons([codon[0], codon[1], codon[2]]) {
            CodingResult::AminoAcid(aa) => result.push_str(&aa.to_str(AaIdent::OneLetter)),
            CodingResult::StopCodon => result.push('*'),
        }
    }

    result
}

/// Finds ORFs across all six reading frames of a circular sequence, plus any
/// known protein tags inside them. `seq` is the undoubled query; doubling
/// happens here so ORFs crossing the origin are found.
pub fn detect_orfs(seq: &[Nucleotide]) -> Vec<Annotation> {
    let mut result = Vec::new();

    let seq_len = seq.len();
    let aa_len = seq_len / 3;

    let mut doubled = seq.to_vec();
    doubled.extend_from_slice(seq);

    for (strand, nuc) in [(1_i64, doubled.clone()), (-1, seq_complement(&doubled))] {
        for frame in 0..3_usize {
            if nuc.len() < frame {
                continue;
            }
            let trans = translate(&nuc[frame..]);
            let trans_len = trans.len();

            // Walk the translation, pairing each start codon with the next
            // stop that follows it.
            let mut aa_start = 0;
            while aa_start < trans_len && aa_start < aa_len {
                let Some(found) = trans[aa_start..].find('*') else {
                    break;
                };
                let aa_end = aa_start + found;

                // Don't let an ORF grow bigger than one copy of the sequence.
                if aa_end + 1 > aa_len && aa_start < aa_end + 1 - aa_len {
                    aa_start = aa_end + 1 - aa_len;
                }

                let start_codon = trans[aa_start..aa_end].find('M').map(|i| aa_start + i);

                // A start codon beyond one sequence copy belongs to the
                // doubled half: the same ORF was, or will be, seen already.
                let Some(m) = start_codon.filter(|&m| m < aa_len) else {
                    aa_start = aa_end + 1;
                    continue;
                };

                if aa_end - m >= MIN_PROTEIN_LEN {
                    let (start, end) = if strand == 1 {
                        (
                            frame as i64 + m as i64 * 3 + 1,
                            frame as i64 + aa_end as i64 * 3 + 3,
                        )
                    } else {
                        (
                            seq_len as i64 - frame as i64 - aa_end as i64 * 3 - 3 + 1,
                            seq_len as i64 - frame as i64 - m as i64 * 3,
                        )
                    };

                    result.push(Annotation {
                        name: format!("ORF frame {}", frame + 1),
                        feature_id: None,
                        type_id: FeatureType::Orf as u8,
                        start: normalize_position(start, seq_len),
                        end: normalize_position(end, seq_len),
                        clockwise: strand == 1,
                        show_feature: true,
                        cut: None,
                        orf_frame: Some(frame),
                        variant_label: None,
                    });

                    // Known peptide tags within the ORF.
                    for &(tag_name, peptide) in PROTEIN_TAGS {
                        let Some(found) = trans[m..aa_end].find(peptide) else {
                            continue;
                        };
                        let tag_aa_start = m + found;
                        if tag_aa_start >= aa_len {
                            continue;
                        }
                        let tag_aa_end = tag_aa_start + peptide.len();

                        let (tag_start, tag_end) = if strand == 1 {
                            (
                                frame as i64 + tag_aa_start as i64 * 3 + 1,
                                frame as i64 + tag_aa_end as i64 * 3,
                            )
                        } else {
                            (
                                seq_len as i64 - frame as i64 - tag_aa_end as i64 * 3 + 1,
                                seq_len as i64 - frame as i64 - tag_aa_start as i64 * 3,
                            )
                        };

                        result.push(Annotation {
                            name: tag_name.to_owned(),
                            feature_id: None,
                            type_id: FeatureType::Feature as u8,
                            start: normalize_position(tag_start, seq_len),
                            end: normalize_position(tag_end, seq_len),
                            clockwise: strand == 1,
                            show_feature: true,
                            cut: None,
                            orf_frame: None,
                            variant_label: None,
                        });
                    }
                }

                aa_start = aa_end + 1;
            }
        }
    }

    result
}
