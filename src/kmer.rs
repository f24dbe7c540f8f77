//! Fixed-width k-mer encoding: the integer codes stored in the compiled index,
//! and the normalization rules shared by the index builder and the query path.

use na_seq::Nucleotide;

/// Fragment width, in bases.
pub const KTUP: usize = 12;

/// Shortest tail fragment kept in the index.
pub const MINFRAG: usize = 6;

/// All `2·KTUP` code bits set; `(4^KTUP) - 1`.
pub const KMER_MASK: u32 = (1 << (2 * KTUP)) - 1;

/// 2-bit code for a single base. `N` codes as 0, same as `A`; anything else
/// fails the fragment, not the run.
pub fn base_value(base: u8) -> Option<u32> {
    match base {
        b'A' | b'a' | b'N' | b'n' => Some(0),
        b'G' | b'g' => Some(1),
        b'C' | b'c' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Code for a query base. The query is DNA-normalized before it reaches the
/// engine, so every base has a value.
pub fn nt_value(nt: Nucleotide) -> u32 {
    match nt {
        Nucleotide::A => 0,
        Nucleotide::G => 1,
        Nucleotide::C => 2,
        Nucleotide::T => 3,
    }
}

/// Encodes up to `KTUP` bases as an integer, left-aligned: shorter fragments
/// are padded on the right with `A` (value 0), matching the index format.
pub fn encode(frag: &[u8]) -> Option<u32> {
    debug_assert!(frag.len() <= KTUP);

    let mut sum = 0;
    for &base in frag {
        sum = (sum << 2) | base_value(base)?;
    }

    Some(sum << (2 * (KTUP - frag.len())))
}

/// The mask marking a short tail of `len` bases: the encoding of `T`×`len`
/// padded with `A`, i.e. the high `2·len` bits set.
pub fn tail_mask(len: usize) -> u32 {
    debug_assert!(len <= KTUP);

    let mut mask = 0;
    for _ in 0..len {
        mask = (mask << 2) | 0b11;
    }

    mask << (2 * (KTUP - len))
}

/// Reverse direction and swap A for T, G for C. `N` stays `N`.
pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(seq.len());

    for &base in seq.iter().rev() {
        result.push(match base {
            b'A' | b'a' => b'T',
            b'T' | b't' => b'A',
            b'G' | b'g' => b'C',
            b'C' | b'c' => b'G',
            other => other.to_ascii_uppercase(),
        });
    }

    result
}

/// Collapses a degenerate IUPAC base onto plain DNA, uppercased. The index is
/// built on normalized DNA, so queries must be normalized with the same rule.
pub fn normalize_base(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' | b'D' | b'H' | b'M' | b'N' | b'R' | b'V' | b'W' | b'*' | b'-' => b'A',
        b'C' | b'B' | b'Y' | b'S' => b'C',
        b'G' | b'K' => b'G',
        b'T' | b'U' => b'T',
        other => other,
    }
}
