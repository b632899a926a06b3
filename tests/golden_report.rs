#[path = "common/mod.rs"]
mod common;
use baitfinder::report::{render_regions_fasta, render_regions_tsv};
use baitfinder::{AlignmentSource, BaitDesigner, LocusStore};
use common::{assert_report_matches, reference_blocks, reference_config, write_loci_file};

fn reference_run() -> LocusStore {
    let (_dir, path) = write_loci_file(&reference_blocks());
    let source = AlignmentSource::detect(&path).expect(".loci extension is recognised");
    let designer = BaitDesigner::new(reference_config()).expect("configuration is valid");
    let mut store = LocusStore::in_memory().expect("in-memory store");
    designer.run(&source, &mut store).expect("design run succeeds");
    store
}

#[test]
fn region_table_matches_golden() {
    let store = reference_run();
    let regions = store.surviving_regions().expect("regions readable");
    let actual = render_regions_tsv(&regions).expect("TSV rendering should succeed");
    assert_report_matches("reference.tsv", &actual);
}

#[test]
fn region_fasta_matches_golden() {
    let store = reference_run();
    let regions = store.surviving_regions().expect("regions readable");
    let actual = render_regions_fasta(&regions).expect("FASTA rendering should succeed");
    assert_report_matches("reference.fasta", &actual);
}
