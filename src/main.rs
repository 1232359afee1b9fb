// For drawing random subsets
use rand::{rngs::SmallRng, SeedableRng};

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nn_mnist::classify::{DistanceClassifier, Strategy};
use nn_mnist::experiment::{ExperimentRunner, Schedule, ScheduleEntry, DEFAULT_QUERY_COUNT};
use nn_mnist::mnist::load_mnist;
use nn_mnist::report::{print_curve, write_curve};

/// Nearest-neighbour accuracy on MNIST as a function of reference-set size
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file the reference sets are drawn from
    #[arg(long, default_value = "mnist_train.csv")]
    train: PathBuf,

    /// CSV file the query set is drawn from
    #[arg(long, default_value = "mnist_test.csv")]
    test: PathBuf,

    /// Only use the first N rows of the training file
    #[arg(long, default_value_t = usize::MAX, hide_default_value = true)]
    train_limit: usize,

    /// Number of queries drawn once from the test file
    #[arg(long, default_value_t = DEFAULT_QUERY_COUNT)]
    queries: usize,

    /// Comma separated size:repetitions pairs, repetitions must not grow with size.
    /// Omit to use the built-in table from 50:100 up to 10000:1
    #[arg(long, value_delimiter = ',')]
    schedule: Option<Vec<ScheduleEntry>>,

    /// How distances are computed
    #[arg(long, value_enum, default_value_t = Strategy::Auto)]
    strategy: Strategy,

    /// Memory budget for the batched distance computation, in MiB
    #[arg(long, default_value_t = 1024)]
    memory_budget_mb: usize,

    /// Seed for every random draw
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Also write the curve to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let schedule = match args.schedule {
        Some(entries) => Schedule::new(entries)?,
        None => Schedule::default(),
    };
    let mut rng = SmallRng::seed_from_u64(args.seed);

    // Load the datasets - raw pixels and labels
    let now = Instant::now();
    let train_pool = load_mnist(&args.train, args.train_limit)?;
    info!(
        examples = train_pool.len(),
        file = %args.train.display(),
        elapsed_ms = now.elapsed().as_millis() as u64,
        "loaded reference pool"
    );

    let now = Instant::now();
    let test_pool = load_mnist(&args.test, usize::MAX)?;
    info!(
        examples = test_pool.len(),
        file = %args.test.display(),
        elapsed_ms = now.elapsed().as_millis() as u64,
        "loaded query pool"
    );

    let classifier = DistanceClassifier::new(
        args.strategy,
        args.memory_budget_mb.saturating_mul(1024 * 1024),
    );
    let runner = ExperimentRunner::new(args.queries, classifier);

    let now = Instant::now();
    let curve = runner.run(&train_pool, &test_pool, &schedule, &mut rng)?;
    info!(
        points = curve.len(),
        elapsed_ms = now.elapsed().as_millis() as u64,
        "experiment finished"
    );

    print_curve(&curve);
    if let Some(path) = args.output {
        write_curve(File::create(&path)?, &curve)?;
        info!(file = %path.display(), "wrote accuracy curve");
    }
    Ok(())
}
