use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::core::engine::{Algorithm, AlgorithmKind, ThresholdPolicy};
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub color: Option<bool>, // None = auto-detect (semantic)
}

impl LogConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn color(&self) -> Option<bool> {
        self.color // None has semantic meaning (auto-detect)
    }

    pub fn to_effective(&self) -> Self {
        Self {
            level: Some(self.level().to_string()),
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RepoConfig {
    /// Root of the target program's git repository.
    pub path: Option<String>,
    /// Extra arguments appended to `git log` to select which commits get
    /// analyzed and in what order.
    pub git_args: Option<String>,
}

impl RepoConfig {
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn git_args(&self) -> &str {
        self.git_args.as_deref().unwrap_or("")
    }

    pub fn to_effective(&self) -> Self {
        Self {
            path: self.path.clone(),
            git_args: Some(self.git_args().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HarnessConfig {
    /// Path to the coverage-collecting test harness script.
    pub path: Option<String>,
    /// Per-commit timeout for the harness, in seconds.
    pub timeout: Option<u64>,
    /// Where the harness writes its spectrum file.
    pub output: Option<String>,
}

impl HarnessConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_OUTPUT: &'static str = "temp/test_out.txt";

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT_SECS)
    }

    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(Self::DEFAULT_OUTPUT)
    }

    pub fn to_effective(&self) -> Self {
        Self {
            path: self.path.clone(),
            timeout: Some(self.timeout()),
            output: Some(self.output().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EngineConfig {
    /// "ochiai" or "proximity".
    pub algorithm: Option<String>,
    /// Threshold policies for proximity-based weighting: "none", "quartile",
    /// or "tail". Only consulted when algorithm = "proximity".
    pub lower_bound: Option<String>,
    pub upper_bound: Option<String>,
}

impl EngineConfig {
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    pub fn lower_bound(&self) -> Option<&str> {
        self.lower_bound.as_deref()
    }

    pub fn upper_bound(&self) -> Option<&str> {
        self.upper_bound.as_deref()
    }

    pub fn to_effective(&self) -> Self {
        self.clone()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ImageConfig {
    /// Height in pixels of each statement's bar.
    pub statement_height: Option<u32>,
    /// Width in pixels of each file's column.
    pub statement_width: Option<u32>,
    /// Horizontal gap in pixels between file columns.
    pub file_margin: Option<u32>,
    /// Blank band at the top of the image, above the first statement bar.
    pub header_height: Option<u32>,
    /// Directory the PNGs and score sidecars are written to.
    pub output_dir: Option<String>,
}

impl ImageConfig {
    pub fn statement_height(&self) -> u32 {
        self.statement_height.unwrap_or(10)
    }

    pub fn statement_width(&self) -> u32 {
        self.statement_width.unwrap_or(50)
    }

    pub fn file_margin(&self) -> u32 {
        self.file_margin.unwrap_or(10)
    }

    pub fn header_height(&self) -> u32 {
        self.header_height.unwrap_or(12)
    }

    pub fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or("out")
    }

    pub fn to_effective(&self) -> Self {
        Self {
            statement_height: Some(self.statement_height()),
            statement_width: Some(self.statement_width()),
            file_margin: Some(self.file_margin()),
            header_height: Some(self.header_height()),
            output_dir: Some(self.output_dir().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub repo: Option<RepoConfig>,
    pub harness: Option<HarnessConfig>,
    pub engine: Option<EngineConfig>,
    pub image: Option<ImageConfig>,
    pub log: Option<LogConfig>,
}

impl Config {
    pub fn repo(&self) -> RepoConfig {
        self.repo.clone().unwrap_or_default()
    }

    pub fn harness(&self) -> HarnessConfig {
        self.harness.clone().unwrap_or_default()
    }

    pub fn engine(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }

    pub fn image(&self) -> ImageConfig {
        self.image.clone().unwrap_or_default()
    }

    pub fn log(&self) -> LogConfig {
        self.log.clone().unwrap_or_default()
    }

    pub fn to_effective(&self) -> Self {
        Self {
            repo: Some(self.repo().to_effective()),
            harness: Some(self.harness().to_effective()),
            engine: Some(self.engine().to_effective()),
            image: Some(self.image().to_effective()),
            log: Some(self.log().to_effective()),
        }
    }

    /// Resolves the scoring algorithm from CLI flags layered over the config
    /// file. The algorithm name is mandatory; proximity additionally requires
    /// both threshold policies.
    pub fn resolve_algorithm(
        &self,
        cli_algorithm: Option<&str>,
        cli_lower: Option<&str>,
        cli_upper: Option<&str>,
    ) -> AppResult<Algorithm> {
        let engine = self.engine();
        let name = cli_algorithm
            .or(engine.algorithm())
            .ok_or_else(|| AppError::Config("engine.algorithm must be set".to_string()))?;

        let kind = AlgorithmKind::from_str(name)
            .map_err(|_| AppError::Config(format!("algorithm {name:?} is invalid")))?;

        match kind {
            AlgorithmKind::Ochiai => Ok(Algorithm::Ochiai),
            AlgorithmKind::Proximity => {
                let lower =
                    resolve_bound(cli_lower.or(engine.lower_bound()), "engine.lower_bound")?;
                let upper =
                    resolve_bound(cli_upper.or(engine.upper_bound()), "engine.upper_bound")?;
                Ok(Algorithm::Proximity { lower, upper })
            }
        }
    }

    /// Resolves the target repository settings needed by `run`.
    pub fn resolve_repo(
        &self,
        cli_repo: Option<&str>,
        cli_git_args: Option<&str>,
    ) -> AppResult<RepoSettings> {
        let repo = self.repo();
        let path = cli_repo
            .or(repo.path())
            .ok_or_else(|| AppError::Config("repo.path must be set".to_string()))?;

        Ok(RepoSettings {
            path: PathBuf::from(path),
            git_args: cli_git_args.unwrap_or(repo.git_args()).to_string(),
        })
    }

    /// Resolves the harness invocation settings needed by `run`.
    pub fn resolve_harness(
        &self,
        cli_harness: Option<&str>,
        cli_timeout: Option<u64>,
        cli_output: Option<&str>,
    ) -> AppResult<HarnessSettings> {
        let harness = self.harness();
        let path = cli_harness
            .or(harness.path())
            .ok_or_else(|| AppError::Config("harness.path must be set".to_string()))?;

        Ok(HarnessSettings {
            path: PathBuf::from(path),
            timeout: Duration::from_secs(cli_timeout.unwrap_or(harness.timeout())),
            output_file: PathBuf::from(cli_output.unwrap_or(harness.output())),
        })
    }
}

fn resolve_bound(value: Option<&str>, key: &str) -> AppResult<ThresholdPolicy> {
    let name = value.ok_or_else(|| {
        AppError::Config(format!("{key} must be set when algorithm = \"proximity\""))
    })?;
    ThresholdPolicy::from_str(name)
        .map_err(|_| AppError::Config(format!("{key} of {name:?} is invalid")))
}

/// Validated `[repo]` values for a campaign.
#[derive(Debug, Clone)]
pub struct RepoSettings {
    pub path: PathBuf,
    pub git_args: String,
}

/// Validated `[harness]` values for a campaign.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub path: PathBuf,
    pub timeout: Duration,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_color: Option<String>, // "on" | "off"
}

static CONFIG_FILENAME: OnceCell<String> = OnceCell::new();
static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn set_config_filename(filename: &str) {
    let _ = CONFIG_FILENAME.set(filename.to_string());
}

pub fn get_config_filename() -> &'static str {
    CONFIG_FILENAME
        .get()
        .map(|s| s.as_str())
        .unwrap_or("faultline.toml")
}

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let mut cfg = Config::default();
        // Apply nearest config file found by walking up from cwd
        if let Some(path) = find_nearest_config_file()
            && let Some(file_cfg) = read_config_file(&path)
        {
            apply_file_config(&mut cfg, &file_cfg);
        }
        cfg
    })
}

pub fn init_with_overrides(overrides: &CliOverrides) {
    let mut cfg = Config::default();

    // 1) Config file: walk up from cwd and use the first config file found
    if let Some(path) = find_nearest_config_file()
        && let Some(file_cfg) = read_config_file(&path)
    {
        apply_file_config(&mut cfg, &file_cfg);
    }

    // 2) CLI arguments (highest priority). Only override if user specified.
    apply_cli_overrides(&mut cfg, overrides);

    let _ = CONFIG.set(cfg);
}

fn read_config_file(path: &Path) -> Option<Config> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<Config>(&contents).ok(),
        Err(_) => None,
    }
}

fn apply_file_config(cfg: &mut Config, file: &Config) {
    if let Some(file_repo) = &file.repo {
        let mut repo = cfg.repo.clone().unwrap_or_default();
        if file_repo.path.is_some() {
            repo.path = file_repo.path.clone();
        }
        if file_repo.git_args.is_some() {
            repo.git_args = file_repo.git_args.clone();
        }
        cfg.repo = Some(repo);
    }

    if let Some(file_harness) = &file.harness {
        let mut harness = cfg.harness.clone().unwrap_or_default();
        if file_harness.path.is_some() {
            harness.path = file_harness.path.clone();
        }
        if file_harness.timeout.is_some() {
            harness.timeout = file_harness.timeout;
        }
        if file_harness.output.is_some() {
            harness.output = file_harness.output.clone();
        }
        cfg.harness = Some(harness);
    }

    if let Some(file_engine) = &file.engine {
        let mut engine = cfg.engine.clone().unwrap_or_default();
        if file_engine.algorithm.is_some() {
            engine.algorithm = file_engine.algorithm.clone();
        }
        if file_engine.lower_bound.is_some() {
            engine.lower_bound = file_engine.lower_bound.clone();
        }
        if file_engine.upper_bound.is_some() {
            engine.upper_bound = file_engine.upper_bound.clone();
        }
        cfg.engine = Some(engine);
    }

    if let Some(file_image) = &file.image {
        let mut image = cfg.image.clone().unwrap_or_default();
        if file_image.statement_height.is_some() {
            image.statement_height = file_image.statement_height;
        }
        if file_image.statement_width.is_some() {
            image.statement_width = file_image.statement_width;
        }
        if file_image.file_margin.is_some() {
            image.file_margin = file_image.file_margin;
        }
        if file_image.header_height.is_some() {
            image.header_height = file_image.header_height;
        }
        if file_image.output_dir.is_some() {
            image.output_dir = file_image.output_dir.clone();
        }
        cfg.image = Some(image);
    }

    if let Some(file_log) = &file.log {
        let mut log = cfg.log.clone().unwrap_or_default();
        if file_log.level.is_some() {
            log.level = file_log.level.clone();
        }
        if file_log.color.is_some() {
            log.color = file_log.color;
        }
        cfg.log = Some(log);
    }
}

fn apply_cli_overrides(cfg: &mut Config, overrides: &CliOverrides) {
    let mut log = cfg.log.clone().unwrap_or_default();
    if let Some(level) = &overrides.log_level
        && !level.trim().is_empty()
    {
        log.level = Some(level.trim().to_string());
    }
    if let Some(color_str) = &overrides.log_color {
        match color_str.to_lowercase().as_str() {
            "on" => log.color = Some(true),
            "off" => log.color = Some(false),
            _ => {}
        }
    }
    if overrides.log_level.is_some() || overrides.log_color.is_some() {
        cfg.log = Some(log);
    }
}

fn find_nearest_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let config_filename = get_config_filename();
    for dir in cwd.ancestors() {
        let candidate = dir.join(config_filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

pub fn colors_enabled() -> bool {
    match config().log().color() {
        Some(force) => force,
        None => console::colors_enabled(),
    }
}
