use anyhow::Context;
use clap::{Parser, ValueEnum};
use lineage_clusters::distances::{DistanceMatrix, Metric};
use lineage_clusters::io::{load_population, write_cluster_report, write_matrix_tsv};
use lineage_clusters::picker::{
    DEFAULT_CUTOFF, DEFAULT_MAX_PICKS, PickIdentity, PickerConfig, assign_to_representatives,
    pick_representatives,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Reconstruct lineage distances for a sampled population and pick a small set
/// of representative organisms covering it.
#[derive(Parser, Debug)]
#[command(name = "lineage-clusters", version, about = "Greedy lineage clustering of a sampled population")]
struct Args {
    /// Current population dump (optionally .gz)
    #[arg(short = 'd', long = "detail")]
    detail: PathBuf,

    /// Historic population dump (optionally .gz)
    #[arg(short = 'H', long = "historic")]
    historic: PathBuf,

    /// Output path for the cluster report
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Minimum coverage value for every pick after the first
    #[arg(short = 'c', long = "cutoff", default_value_t = DEFAULT_CUTOFF, allow_negative_numbers = true)]
    cutoff: i64,

    /// Maximum number of representatives to pick
    #[arg(long = "max-picks", default_value_t = DEFAULT_MAX_PICKS)]
    max_picks: usize,

    /// Distance metric to compute: tree | hamming | mrca-birth
    #[arg(long = "metric", value_enum, default_value_t = MetricArg::Tree)]
    metric: MetricArg,

    /// Index recorded for each pick and used by the assignment pass
    #[arg(long = "pick-identity", value_enum, default_value_t = PickIdentityArg::ActiveSetPosition)]
    pick_identity: PickIdentityArg,

    /// Also write the distance matrix as TSV (.gz compresses)
    #[arg(long = "matrix")]
    matrix: Option<PathBuf>,

    /// Run even if the output file already exists
    #[arg(short = 'f', long = "force", default_value_t = false)]
    force: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MetricArg { Tree, Hamming, MrcaBirth }

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Tree => Metric::Tree,
            MetricArg::Hamming => Metric::Hamming,
            MetricArg::MrcaBirth => Metric::MrcaBirth,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PickIdentityArg { ActiveSetPosition, StableRow }

impl From<PickIdentityArg> for PickIdentity {
    fn from(arg: PickIdentityArg) -> Self {
        match arg {
            PickIdentityArg::ActiveSetPosition => PickIdentity::ActiveSetPosition,
            PickIdentityArg::StableRow => PickIdentity::StableRow,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("lineage_clusters=debug,info")
    } else if args.quiet {
        EnvFilter::new("lineage_clusters=warn")
    } else {
        EnvFilter::new("lineage_clusters=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if args.max_picks == 0 {
        anyhow::bail!("--max-picks must be at least 1");
    }

    if args.output.exists() && !args.force {
        info!("Cluster report {:?} exists already. Skipping.", args.output);
        return Ok(());
    }

    let t0 = Instant::now();
    let (bank, population) = load_population(&args.detail, &args.historic)
        .with_context(|| format!("Failed to load {:?} and {:?}", args.detail, args.historic))?;
    info!("Loading data {:.3}s: {} organisms in genebank", t0.elapsed().as_secs_f64(), bank.len());
    for row in bank.summary().iter().filter(|row| row.coalescent) {
        debug!("Coalescent: {} (depth {}, count {})", row.id, row.tree_depth, row.count);
    }

    let t1 = Instant::now();
    let metric = Metric::from(args.metric);
    let n = population.len();
    info!("Determining {} distances for {} comparisons", metric.label(), n * (n + 1) / 2);
    let matrix = DistanceMatrix::compute(&bank, &population, metric)
        .context("Failed to compute distance matrix")?;
    info!(
        "Determining distances {:.3}s: max {}, average {:.3}",
        t1.elapsed().as_secs_f64(),
        matrix.max_distance,
        matrix.average_distance
    );
    if matrix.undefined_pairs > 0 {
        info!("{} pairs have an undefined distance", matrix.undefined_pairs);
    }

    let t2 = Instant::now();
    let config = PickerConfig {
        cutoff: args.cutoff,
        max_picks: args.max_picks,
        identity: args.pick_identity.into(),
    };
    let picks = pick_representatives(&matrix, &config);
    let assignments = assign_to_representatives(&matrix, &picks)?;
    info!("Clustering {:.3}s: {} clusters", t2.elapsed().as_secs_f64(), picks.len());

    let t3 = Instant::now();
    write_cluster_report(&args.output, &matrix, &picks, &assignments, args.cutoff)
        .with_context(|| format!("Failed to write output {:?}", args.output))?;
    if let Some(path) = &args.matrix {
        write_matrix_tsv(path, &matrix)
            .with_context(|| format!("Failed to write matrix {path:?}"))?;
    }
    info!("Writing to output {:.3}s", t3.elapsed().as_secs_f64());

    Ok(())
}
