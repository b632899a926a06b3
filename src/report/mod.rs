//! Plain-text reports of surviving regions.

use std::io::{self, Write};

use crate::store::RegionRecord;

const TSV_HEADER: &str = "locus\tregion\tstart\tstop\tgaps\tbad\tvariants\tsequence\n";

/// Write regions as a tab-separated table with a header row.
pub fn write_regions_tsv<W: Write>(writer: &mut W, regions: &[RegionRecord]) -> io::Result<()> {
    writer.write_all(TSV_HEADER.as_bytes())?;

    for region in regions {
        writeln!(
            writer,
            "{locus}\t{id}\t{start}\t{stop}\t{gaps}\t{bad}\t{variants}\t{sequence}",
            locus = region.locus_id,
            id = region.id,
            start = region.start,
            stop = region.stop,
            gaps = region.gap_count,
            bad = region.bad_count,
            variants = region.variant_count,
            sequence = region.sequence,
        )?;
    }

    writer.flush()
}

/// Write regions as FASTA records named `id_<region>`.
///
/// This is the form consumed by external pairwise-similarity tools whose
/// hits feed [`crate::filter::parse_pairwise_hits`].
pub fn write_regions_fasta<W: Write>(writer: &mut W, regions: &[RegionRecord]) -> io::Result<()> {
    for region in regions {
        writeln!(
            writer,
            ">id_{} locus={} start={} stop={}\n{}",
            region.id, region.locus_id, region.start, region.stop, region.sequence
        )?;
    }
    writer.flush()
}

fn render_with(
    regions: &[RegionRecord],
    write: fn(&mut Vec<u8>, &[RegionRecord]) -> io::Result<()>,
) -> io::Result<String> {
    let mut buffer = Vec::new();
    write(&mut buffer, regions)?;
    String::from_utf8(buffer)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "report is not valid UTF-8"))
}

/// Render the TSV report into a string (used by tests and snapshots).
pub fn render_regions_tsv(regions: &[RegionRecord]) -> io::Result<String> {
    render_with(regions, write_regions_tsv)
}

/// Render the FASTA report into a string.
pub fn render_regions_fasta(regions: &[RegionRecord]) -> io::Result<String> {
    render_with(regions, write_regions_fasta)
}
