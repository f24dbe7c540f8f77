//! Common protein tags, scanned for within detected ORFs.

/// `(display name, peptide)`. Several tags have more than one known peptide;
/// each entry is searched independently.
pub const PROTEIN_TAGS: &[(&str, &str)] = &[
    ("FLAG", "DYKDDDDK"),
    ("FLAG", "DYKDHDI"),
    ("FLAG", "DYKDHDG"),
    ("HA", "YPYDVPDYA"),
    ("6xHIS", "HHHHHH"),
    ("Myc", "EQKLISEEDL"),
    ("TEV", "ENLYFQG"),
    ("Myr", "MGSNKSKPKDASQRR"),
    ("Myr", "MGSSKSKPKDPSQRA"),
    ("V5", "GKPIPNPLLGLDST"),
    ("S15", "KETAAAKFERQHMDS"),
    ("Strep Tag", "WSHPQFEK"),
    ("SBP Tag", "MDEKTTGWRGGHVVEGLAGELEQLRARLEHHPQGQREP"),
    (
        "TAP",
        "GRRIPGLINPWKRRWKKNFIAVSAANRFKKISSSGALDYDIPTTASENLYFQGEFGLAQHDEAVDNKFNKEQQNAFYEILHLPNLNEEQRNAFIQSLKDDPSQSANLLAEAKKLNDAQAPKVDNKFNKEQQNAFYEILHLPNLNEEQRNAFIQSLKDDPSQSANLLAEAKKLNDAQAPKVDANHQ",
    ),
];
