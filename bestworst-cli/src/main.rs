mod config;
mod output;
mod sheet;

use bestworst_core::constants::{DEFAULT_ITEMS_PER_TRIAL, DEFAULT_ITERATIONS, DEFAULT_TRIALS_PER_ITEM};
use bestworst_core::{
    assess_compliance, generate_trials, retain_compliant, score_trials, simulate_judgments, Method,
    ScoringOptions, Strategy, TrialColumns,
};
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::BestworstConfig;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "bestworst", version, about = "Design best-worst trials and score the judgments")]
struct Cli {
    /// Log progress (-v) or debug detail (-vv). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file (default: ~/.config/bestworst/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Generate groups of items to show raters
    Generate(GenerateArgs),
    /// Score judged trials
    Score(ScoreArgs),
    /// Simulate raters from known latent values and score the result
    Simulate(SimulateArgs),
    /// Measure how well each participant agrees with consensus scores
    Compliance(ComplianceArgs),
    /// Create a default config file at ~/.config/bestworst/config.toml
    Init,
}

#[derive(Parser)]
struct GenerateArgs {
    /// Item list: whitespace-separated .txt, or a .csv/.tsv with --column
    input: PathBuf,

    /// Number of trials (default: 8 per item)
    n: Option<usize>,

    /// Items per trial
    k: Option<usize>,

    /// random, even, norepeat, norepeateven or semirandom
    #[arg(long)]
    generator: Option<String>,

    /// Column holding the items, for .csv/.tsv input
    #[arg(long)]
    column: Option<String>,

    /// Column separator ("\t" for tab)
    #[arg(long)]
    sep: Option<String>,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct ScoreArgs {
    /// Sheets of judged trials
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Column separator ("\t" for tab)
    #[arg(long)]
    sep: Option<String>,

    /// Header of the item column in the output
    #[arg(long, default_value = "Word")]
    name: String,

    /// Column holding the best pick
    #[arg(long, default_value = "best")]
    best: String,

    /// Column holding the worst pick
    #[arg(long, default_value = "worst")]
    worst: String,

    /// Comma-separated scoring methods, in output order
    #[arg(long)]
    methods: Option<String>,

    /// Passes over the pairings for the iterative methods
    #[arg(long)]
    iterations: Option<usize>,

    /// Do not bound iterative scores with dummy anchors
    #[arg(long)]
    no_dummy: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON instead of CSV
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Sheet of items and their latent values
    input: PathBuf,

    /// Number of trials
    n: usize,

    /// Items per trial
    k: Option<usize>,

    /// Standard deviation of the per-decision noise
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// random, even, norepeat, norepeateven or semirandom
    #[arg(long, default_value = "even")]
    generator: String,

    /// Column separator ("\t" for tab)
    #[arg(long)]
    sep: Option<String>,

    /// Column holding the item label
    #[arg(long, default_value = "Item")]
    item: String,

    /// Column holding the latent value
    #[arg(long, default_value = "LatentValue")]
    latent_value: String,

    /// Comma-separated scoring methods, in output order
    #[arg(long)]
    methods: Option<String>,

    #[arg(long)]
    iterations: Option<usize>,

    /// Do not bound iterative scores with dummy anchors
    #[arg(long)]
    no_dummy: bool,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct ComplianceArgs {
    /// Scores computed over all participants (output of `score`)
    scores: PathBuf,

    /// Sheets of judged trials
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Column holding the participant id (default: one participant per file)
    #[arg(long)]
    id_column: Option<String>,

    #[arg(long, default_value = "best")]
    best: String,

    #[arg(long, default_value = "worst")]
    worst: String,

    /// Score column to measure agreement against
    #[arg(long, default_value = "Value")]
    score_method: String,

    /// Print the trials of participants at or above this compliance instead
    #[arg(long)]
    filter: Option<f64>,

    /// Column separator ("\t" for tab)
    #[arg(long)]
    sep: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn separator(path: &Path, flag: Option<&str>, config: &BestworstConfig) -> u8 {
    sheet::separator_for(path, flag.or(config.separator.as_deref())).unwrap_or_else(|e| bail(e))
}

/// `--methods`, else the config list, else the default set.
fn resolve_methods(flag: Option<&str>, config: &BestworstConfig) -> Vec<Method> {
    let methods = match (flag, &config.methods) {
        (Some(list), _) => Method::parse_list(list),
        (None, Some(names)) => names.iter().map(|name| name.parse::<Method>()).collect(),
        (None, None) => Ok(Method::DEFAULT.to_vec()),
    }
    .unwrap_or_else(|e| bail(e));

    if methods.is_empty() {
        bail("No scoring methods selected");
    }
    methods
}

fn scoring_options(
    methods: Option<&str>,
    iterations: Option<usize>,
    no_dummy: bool,
    config: &BestworstConfig,
) -> ScoringOptions {
    ScoringOptions {
        methods: resolve_methods(methods, config),
        iterations: iterations.or(config.iterations).unwrap_or(DEFAULT_ITERATIONS),
        use_dummy_anchors: !no_dummy && config.dummy_anchors.unwrap_or(true),
    }
}

fn write_stdout(result: csv::Result<()>) {
    result.unwrap_or_else(|e| bail(format!("Failed to write output: {e}")));
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Generate(args) => run_generate(args, &config::load_config(&config_path)),
        Commands::Score(args) => run_score(args, &config::load_config(&config_path)),
        Commands::Simulate(args) => run_simulate(args, &config::load_config(&config_path)),
        Commands::Compliance(args) => run_compliance(args, &config::load_config(&config_path)),
        Commands::Init => {
            config::create_default_config(&config_path);
            println!("Created config at {}", config_path.display());
            println!("Edit it to set your default iterations, methods, etc.");
        }
    }
}

fn run_generate(args: GenerateArgs, config: &BestworstConfig) {
    let sep = separator(&args.input, args.sep.as_deref(), config);
    let items = sheet::read_items(&args.input, args.column.as_deref(), sep).unwrap_or_else(|e| bail(e));

    let k = args.k.or(config.per_trial).unwrap_or(DEFAULT_ITEMS_PER_TRIAL);
    let n = args.n.unwrap_or(items.len() * DEFAULT_TRIALS_PER_ITEM);
    let strategy: Strategy = args
        .generator
        .as_deref()
        .or(config.generator.as_deref())
        .unwrap_or("norepeateven")
        .parse()
        .unwrap_or_else(|e| bail(e));

    info!("Generating {n} trials of {k} from {} items ({strategy})", items.len());
    let mut rng = make_rng(args.seed.or(config.seed));
    let groups = generate_trials(&items, n, k, strategy, &mut rng).unwrap_or_else(|e| bail(e));

    write_stdout(output::write_groups(io::stdout().lock(), &groups));
}

fn run_score(args: ScoreArgs, config: &BestworstConfig) {
    let options = scoring_options(args.methods.as_deref(), args.iterations, args.no_dummy, config);
    let columns = TrialColumns {
        best: args.best.clone(),
        worst: args.worst.clone(),
        ..TrialColumns::default()
    };

    let mut trials = Vec::new();
    for path in &args.inputs {
        let sep = separator(path, args.sep.as_deref(), config);
        let mut read = sheet::read_trials(path, sep, &columns).unwrap_or_else(|e| bail(e));
        info!("{}: {} trials", path.display(), read.len());
        trials.append(&mut read);
    }

    info!("Scoring {} trials ({} iterations)", trials.len(), options.iterations);
    let mut rng = make_rng(args.seed.or(config.seed));
    let table = score_trials(&trials, &options, &mut rng).unwrap_or_else(|e| bail(e));

    if args.json {
        let json = output::render_json(&table, options.iterations)
            .unwrap_or_else(|e| bail(format!("Failed to serialize scores: {e}")));
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}").unwrap_or_else(|e| bail(format!("Failed to write output: {e}")));
    } else {
        write_stdout(output::write_score_table(io::stdout().lock(), &args.name, &table));
    }
}

fn run_simulate(args: SimulateArgs, config: &BestworstConfig) {
    let options = scoring_options(args.methods.as_deref(), args.iterations, args.no_dummy, config);
    let sep = separator(&args.input, args.sep.as_deref(), config);
    let (items, latent_values) = sheet::read_latent_values(&args.input, sep, &args.item, &args.latent_value)
        .unwrap_or_else(|e| bail(e));

    let k = args.k.or(config.per_trial).unwrap_or(DEFAULT_ITEMS_PER_TRIAL);
    let strategy: Strategy = args.generator.parse().unwrap_or_else(|e| bail(e));
    let mut rng = make_rng(args.seed.or(config.seed));

    info!("Simulating {} trials of {k} over {} items (noise sd {})", args.n, items.len(), args.noise);
    let groups = generate_trials(&items, args.n, k, strategy, &mut rng).unwrap_or_else(|e| bail(e));
    let trials = simulate_judgments(&groups, &latent_values, args.noise, &mut rng).unwrap_or_else(|e| bail(e));
    let table = score_trials(&trials, &options, &mut rng).unwrap_or_else(|e| bail(e));

    write_stdout(output::write_simulation(
        io::stdout().lock(),
        &args.item,
        &args.latent_value,
        &table,
        &latent_values,
    ));
}

fn run_compliance(args: ComplianceArgs, config: &BestworstConfig) {
    let scores_sep = separator(&args.scores, args.sep.as_deref(), config);
    let scores = sheet::read_scores(&args.scores, scores_sep, &args.score_method).unwrap_or_else(|e| bail(e));

    let columns = TrialColumns {
        best: args.best.clone(),
        worst: args.worst.clone(),
        ..TrialColumns::default()
    };
    let mut responses = Vec::new();
    for path in &args.inputs {
        let sep = separator(path, args.sep.as_deref(), config);
        let mut read = sheet::read_responses(path, sep, &columns, args.id_column.as_deref())
            .unwrap_or_else(|e| bail(e));
        responses.append(&mut read);
    }

    let report = assess_compliance(&responses, &scores).unwrap_or_else(|e| bail(e));
    info!("{} participants, {} trials", report.len(), responses.len());

    match args.filter {
        None => write_stdout(output::write_compliance(io::stdout().lock(), &report)),
        Some(threshold) => {
            let kept = retain_compliant(report, threshold);
            info!("{} participants at or above {threshold}", kept.len());
            write_stdout(output::write_participant_trials(io::stdout().lock(), &kept));
        }
    }
}
