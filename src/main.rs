use bibfs::graph::AdjacencyGraph;
use bibfs::search::{DEFAULT_CONFIG, FinderConfig, PathFinder, SearchOutcome, SearchResult};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser, Debug)]
#[command(name = "bibfs")]
#[command(about = "bibfs - shortest paths with concurrent bidirectional BFS")]
#[command(version)]
struct Args {
    /// Edge-list file: one `SOURCE TARGET` pair per line
    #[arg(long)]
    graph: PathBuf,
    /// Node to start from
    #[arg(long)]
    source: String,
    /// Node to reach
    #[arg(long)]
    target: String,

    // --- Engine options ---
    /// Number of worker threads
    #[arg(long, short = 'j', default_value_t = DEFAULT_CONFIG.thread_count)]
    threads: usize,
    /// Maximum number of coordinator trials (rounds)
    #[arg(long, default_value_t = DEFAULT_CONFIG.master_trials)]
    master_trials: usize,
    /// Coordinator sleep after a failed trial, in milliseconds
    #[arg(long, default_value_t = (DEFAULT_CONFIG.master_sleep.as_millis() as u64))]
    master_sleep_ms: u64,
    /// Idle poll interval of worker threads, in milliseconds
    #[arg(long, default_value_t = (DEFAULT_CONFIG.slave_sleep.as_millis() as u64))]
    slave_sleep_ms: u64,
    /// Time to wait for one round of expansions, in milliseconds
    #[arg(long, default_value_t = (DEFAULT_CONFIG.join_timeout.as_millis() as u64))]
    expansion_timeout_ms: u64,
    /// Time to wait for the search state lock, in milliseconds
    #[arg(long, default_value_t = (DEFAULT_CONFIG.lock_wait.as_millis() as u64))]
    lock_wait_ms: u64,

    // --- Simulation and output ---
    /// Artificial delay added to every expansion, in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
    /// Print search statistics after the path
    #[arg(long)]
    stats: bool,
    /// Also write the report to this file
    #[arg(long)]
    out: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_threads(self.threads)
            .with_master_trials(self.master_trials)
            .with_master_sleep(Duration::from_millis(self.master_sleep_ms))
            .with_slave_sleep(Duration::from_millis(self.slave_sleep_ms))
            .with_join_timeout(Duration::from_millis(self.expansion_timeout_ms))
            .with_lock_wait(Duration::from_millis(self.lock_wait_ms))
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// --- Report ---

fn format_report(result: &SearchResult<String>, show_stats: bool) -> String {
    let mut report = String::new();

    match &result.outcome {
        SearchOutcome::Found(path) => {
            let width = path.len().to_string().len();
            for (i, node) in path.iter().enumerate() {
                report.push_str(&format!("{:>width$}. {}\n", i + 1, node, width = width));
            }
        }
        SearchOutcome::Exhausted | SearchOutcome::TrialsExhausted => {
            report.push_str("No path found.\n");
        }
    }

    if show_stats {
        report.push_str(&format!(
            "[STATISTICS] Duration: {} milliseconds, expanded nodes: {} nodes.\n",
            result.duration().as_millis(),
            result.expanded_nodes()
        ));
    }

    report
}

fn save_report(path: &Path, report: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, report).map_err(|e| format!("Could not write \"{}\": {}", path.display(), e))?;
    Ok(())
}

// --- Search ---

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.finder_config();
    let finder = PathFinder::new(config)?;

    let graph = AdjacencyGraph::load_edge_list(&args.graph)?
        .with_latency(Duration::from_millis(args.latency_ms));
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );

    let (forward, backward) = graph.into_expanders();
    let result = finder.search(args.source.clone(), args.target.clone(), forward, backward)?;

    if args.verbose {
        eprint!("{}", result.statistics.format_summary());
    }

    let report = format_report(&result, args.stats);
    print!("{}", report);

    if let Some(out) = &args.out {
        save_report(out, &report)?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
