use std::fs;
use std::path::{Path, PathBuf};

const UPDATE_VAR: &str = "BAITFINDER_UPDATE_SNAPSHOTS";

/// Compare a rendered report with `tests/snapshots/reports/<file>`.
///
/// Lines are compared after stripping carriage returns; the first differing
/// line is reported. With `BAITFINDER_UPDATE_SNAPSHOTS` set the stored report
/// is replaced instead.
#[allow(dead_code)]
pub fn assert_report_matches(file: &str, rendered: &str) {
    let stored = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/snapshots/reports")
        .join(file);
    if std::env::var_os(UPDATE_VAR).is_some() {
        fs::create_dir_all(stored.parent().unwrap()).unwrap();
        fs::write(&stored, rendered).unwrap();
        return;
    }

    let expected = fs::read_to_string(&stored)
        .unwrap_or_else(|err| panic!("cannot read stored report {}: {err}", stored.display()));
    let want: Vec<&str> = expected.lines().map(|l| l.trim_end_matches('\r')).collect();
    let got: Vec<&str> = rendered.lines().map(|l| l.trim_end_matches('\r')).collect();
    if let Some(row) = (0..want.len().max(got.len())).find(|&i| want.get(i) != got.get(i)) {
        panic!(
            "report {file} differs at line {}: expected {:?}, got {:?} (rerun with {UPDATE_VAR}=1 to accept)",
            row + 1,
            want.get(row),
            got.get(row),
        );
    }
}

/// Write `blocks` as a `.loci` file in a fresh temporary directory.
///
/// Each block is a list of `(name, sequence)` rows.
#[allow(dead_code)]
pub fn write_loci_file(blocks: &[Vec<(&str, String)>]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("input.loci");
    let mut text = String::new();
    for block in blocks {
        for (name, seq) in block {
            text.push_str(&format!(">{name} {seq}\n"));
        }
        text.push_str("//\n");
    }
    fs::write(&path, text).expect("write loci file");
    (dir, path)
}

/// Four small loci exercising a variable column, gap columns, a shallow
/// locus and a missing-only column.
#[allow(dead_code)]
pub fn reference_blocks() -> Vec<Vec<(&'static str, String)>> {
    let base = "ACGT".repeat(10);
    let mut variable = base.clone().into_bytes();
    variable[12] = b'G';

    let mut gapped = "TTGCA".repeat(6).into_bytes();
    gapped[14] = b'-';
    gapped[15] = b'-';
    let gapped = String::from_utf8(gapped).expect("ascii");

    let mut unknown = format!("{}C", "CATG".repeat(11)).into_bytes();
    unknown[22] = b'N';
    let unknown = String::from_utf8(unknown).expect("ascii");

    vec![
        vec![
            ("alpha", base.clone()),
            ("beta", base),
            ("gamma", String::from_utf8(variable).expect("ascii")),
        ],
        vec![("alpha", gapped.clone()), ("beta", gapped)],
        vec![("alpha", "G".repeat(40))],
        vec![
            ("alpha", unknown.clone()),
            ("beta", unknown.clone()),
            ("gamma", unknown),
        ],
    ]
}

/// Configuration paired with [`reference_blocks`].
#[allow(dead_code)]
pub fn reference_config() -> baitfinder::DesignConfig {
    baitfinder::DesignConfig {
        threshold: 0.75,
        win_width: 10,
        win_shift: 5,
        var_max: 1,
        min_region_len: 20,
        min_locus_len: 20,
        min_coverage: 2,
        multi_region: true,
        filters: vec![baitfinder::FilterOption::MaxGaps(0)],
        ..baitfinder::DesignConfig::default()
    }
}
