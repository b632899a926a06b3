use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use baitfinder::filter::{exclude_redundant, parse_pairwise_hits};
use baitfinder::report::{write_regions_fasta, write_regions_tsv};
use baitfinder::{
    AlignmentFormat, AlignmentSource, BaitDesigner, DesignConfig, LocusStore, RunSummary,
    SelectRule,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "baitfinder", about = "Design capture bait regions from multi-sample alignments")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build consensus loci, scan for regions and filter them.
    Design(DesignArgs),
    /// Exclude both members of each redundant region pair in an existing store.
    Exclude {
        /// Store written by an earlier `design` run.
        #[arg(long, default_value = "baits.sqlite")]
        db: PathBuf,
        /// Tab-separated pairwise hits (`id_<a>\tid_<b>` per line).
        hits: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct DesignArgs {
    /// Alignment file (`.loci` or `.maf`).
    input: PathBuf,
    /// Alignment format; inferred from the extension when omitted.
    #[arg(long)]
    format: Option<AlignmentFormat>,
    /// SQLite store to create (overwritten).
    #[arg(long, default_value = "baits.sqlite")]
    db: PathBuf,
    /// TOML configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Consensus majority fraction.
    #[arg(long)]
    threshold: Option<f64>,
    /// Scanner window width.
    #[arg(long)]
    win_width: Option<usize>,
    /// Scanner window shift.
    #[arg(long)]
    win_shift: Option<usize>,
    /// Maximum variable sites per window.
    #[arg(long)]
    var_max: Option<u32>,
    /// Maximum missing bases per window.
    #[arg(long)]
    num_n: Option<u32>,
    /// Maximum gaps per window.
    #[arg(long)]
    num_g: Option<u32>,
    /// Minimum region length.
    #[arg(long, alias = "blen")]
    min_region_len: Option<usize>,
    /// Minimum locus length.
    #[arg(long)]
    min_locus_len: Option<usize>,
    /// Minimum locus depth.
    #[arg(long)]
    min_coverage: Option<usize>,
    /// Keep more than one region per locus.
    #[arg(long)]
    multi_region: bool,
    /// Region kept per locus: first, most-variants, fewest-variants, fewest-bad, random.
    #[arg(long)]
    select_rule: Option<SelectRule>,
    /// Region filter code (g=<n>, n=<n>, m=<n>[,<flank>], M=<n>[,<flank>], r=<k>); repeatable.
    #[arg(short, long = "filter")]
    filters: Vec<String>,
    /// Seed for random selection and downsampling.
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads.
    #[arg(long)]
    threads: Option<usize>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write the TSV report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write surviving regions as FASTA.
    #[arg(long)]
    fasta: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Design(args) => run_design(args)?,
        Commands::Exclude { db, hits, output } => run_exclude(&db, &hits, &output)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(args: &DesignArgs) -> Result<DesignConfig> {
    let mut config = match &args.config {
        Some(path) => DesignConfig::from_toml_file(path)?,
        None => DesignConfig::default(),
    };

    macro_rules! override_with {
        ($($field:ident),*) => {
            $(if let Some(value) = args.$field {
                config.$field = value;
            })*
        };
    }
    override_with!(
        threshold,
        win_width,
        win_shift,
        var_max,
        num_n,
        num_g,
        min_region_len,
        min_locus_len,
        min_coverage,
        select_rule,
        threads
    );
    if args.multi_region {
        config.multi_region = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if !args.filters.is_empty() {
        config.filters = DesignConfig::parse_filters(&args.filters)?;
    }

    config.validate()?;
    Ok(config)
}

fn run_design(args: DesignArgs) -> Result<()> {
    let config = resolve_config(&args).context("invalid configuration")?;
    let source = match args.format {
        Some(format) => AlignmentSource::new(&args.input, format),
        None => AlignmentSource::detect(&args.input).ok_or_else(|| {
            anyhow!(
                "cannot infer alignment format of {}; pass --format",
                args.input.display()
            )
        })?,
    };

    let designer = BaitDesigner::new(config).context("failed to initialise designer")?;
    let mut store = LocusStore::create(&args.db)
        .with_context(|| format!("failed to create store {}", args.db.display()))?;

    let summary = designer
        .run(&source, &mut store)
        .with_context(|| format!("design run over {} failed", source.path().display()))?;
    log_summary(&summary);

    write_reports(&store, &args.output)?;
    store
        .close()
        .with_context(|| format!("failed to close store {}", args.db.display()))?;
    Ok(())
}

fn run_exclude(db: &Path, hits: &Path, output: &OutputArgs) -> Result<()> {
    let mut store = LocusStore::open(db)
        .with_context(|| format!("failed to open store {}", db.display()))?;
    let reader = BufReader::new(
        File::open(hits).with_context(|| format!("failed to open hits {}", hits.display()))?,
    );
    let pairs = parse_pairwise_hits(reader)
        .with_context(|| format!("failed to parse hits {}", hits.display()))?;
    exclude_redundant(&mut store, &pairs).context("failed to exclude redundant regions")?;

    write_reports(&store, output)?;
    store
        .close()
        .with_context(|| format!("failed to close store {}", db.display()))?;
    Ok(())
}

fn write_reports(store: &LocusStore, output: &OutputArgs) -> Result<()> {
    let regions = store
        .surviving_regions()
        .context("failed to read surviving regions")?;

    match &output.out {
        Some(path) => {
            let mut writer = BufWriter::new(
                File::create(path)
                    .with_context(|| format!("failed to create report {}", path.display()))?,
            );
            write_regions_tsv(&mut writer, &regions)
                .with_context(|| format!("failed to write report {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_regions_tsv(&mut writer, &regions).context("failed to write report")?;
            writer.flush()?;
        }
    }

    if let Some(path) = &output.fasta {
        let mut writer = BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create FASTA {}", path.display()))?,
        );
        write_regions_fasta(&mut writer, &regions)
            .with_context(|| format!("failed to write FASTA {}", path.display()))?;
    }

    info!(regions = regions.len(), "wrote reports");
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    info!(
        blocks = summary.blocks_read,
        skipped = summary.blocks_skipped,
        loci = summary.loci_stored,
        prefiltered = summary.loci_prefiltered,
        "loci summary"
    );
    for outcome in &summary.filter_outcomes {
        info!(filter = %outcome.option, excluded = outcome.excluded, "filter summary");
    }
    info!(
        found = summary.regions_found,
        deselected = summary.regions_deselected,
        surviving = summary.regions_surviving,
        "region summary"
    );
}
