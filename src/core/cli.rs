use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// All relative paths will be interpreted relative to this directory.
    /// All child processes will be run in this directory.
    #[arg(long, global = true)]
    pub cwd: Option<String>,

    /// Name of the configuration file to search for (default: faultline.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Logging level (overrides env/config). One of: trace, debug, info, warn, error
    #[arg(long = "log.level", global = true)]
    pub log_level: Option<String>,

    /// Logging color control: "on" to force colors, "off" to disable; omit for auto
    #[arg(long = "log.color", global = true)]
    pub log_color: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new workspace (config file)
    Init,

    /// Analyze the target repository's history: run the test harness on every
    /// selected commit, score each statement, and render heat maps
    Run(RunArgs),

    /// Score a single harness output file without touching any repository
    Score(ScoreArgs),

    /// Print various information about the tool's setup
    Print {
        #[command(subcommand)]
        command: PrintArgs,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the target program's git repository.
    /// Replaces config [repo].path if provided.
    #[arg(long)]
    pub repo: Option<String>,

    /// Arguments passed to `git log` to select and order commits.
    /// Replaces config [repo].git_args if provided.
    #[arg(long = "git-args")]
    pub git_args: Option<String>,

    /// Path to the coverage-collecting test harness script.
    /// Replaces config [harness].path if provided.
    #[arg(long)]
    pub harness: Option<String>,

    /// Per-commit harness timeout in seconds.
    /// Replaces config [harness].timeout if provided.
    #[arg(long = "harness.timeout")]
    pub harness_timeout: Option<u64>,

    /// Where the harness writes its spectrum file.
    /// Replaces config [harness].output if provided.
    #[arg(long = "harness.output")]
    pub harness_output: Option<String>,

    /// Scoring algorithm: "ochiai" or "proximity".
    /// Replaces config [engine].algorithm if provided.
    #[arg(long)]
    pub algorithm: Option<String>,

    /// Lower threshold policy for proximity weighting: none, quartile, or tail.
    /// Replaces config [engine].lower_bound if provided.
    #[arg(long = "lower-bound")]
    pub lower_bound: Option<String>,

    /// Upper threshold policy for proximity weighting: none, quartile, or tail.
    /// Replaces config [engine].upper_bound if provided.
    #[arg(long = "upper-bound")]
    pub upper_bound: Option<String>,

    /// Directory the images and score files are written to.
    /// Replaces config [image].output_dir if provided.
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,
}

/// Arguments for the score command
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Harness output file to score
    #[arg(value_name = "SPECTRUM_FILE")]
    pub file: String,

    /// Scoring algorithm: "ochiai" or "proximity".
    /// Replaces config [engine].algorithm if provided.
    #[arg(long)]
    pub algorithm: Option<String>,

    /// Lower threshold policy for proximity weighting: none, quartile, or tail.
    /// Replaces config [engine].lower_bound if provided.
    #[arg(long = "lower-bound")]
    pub lower_bound: Option<String>,

    /// Upper threshold policy for proximity weighting: none, quartile, or tail.
    /// Replaces config [engine].upper_bound if provided.
    #[arg(long = "upper-bound")]
    pub upper_bound: Option<String>,

    /// Output format: "table" (default) or "json"
    #[arg(long, default_value = "table")]
    pub format: String,
}

/// Arguments for the print command
#[derive(Subcommand, Debug)]
pub enum PrintArgs {
    /// Print the effective global configuration
    Config(PrintConfigArgs),
}

/// Arguments for the print config subcommand
#[derive(Parser, Debug)]
pub struct PrintConfigArgs {
    /// Output format: "table" (default) or "json"
    #[arg(long, default_value = "table")]
    pub format: String,
}
