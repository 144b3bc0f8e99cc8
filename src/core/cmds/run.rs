use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::core::cli::RunArgs;
use crate::core::harness::TestHarness;
use crate::core::repo;
use crate::core::visualizer::{RenderOptions, render_all_commits};
use crate::types::config::config;
use crate::types::{AppResult, CommitScores};

/// What a campaign got through, for reporting and the exit code.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub analyzed: usize,
    pub skipped: usize,
}

/// Runs the full historical analysis: enumerate commits, and for each one
/// check it out, run the harness, score the spectrum, then render everything
/// that succeeded. A commit that fails at any step is logged and skipped so
/// the rest of the history still gets analyzed.
pub async fn execute_run(args: RunArgs, running: Arc<AtomicBool>) -> AppResult<RunSummary> {
    let repo_settings = config().resolve_repo(args.repo.as_deref(), args.git_args.as_deref())?;
    let harness_settings = config().resolve_harness(
        args.harness.as_deref(),
        args.harness_timeout,
        args.harness_output.as_deref(),
    )?;
    let algorithm = config().resolve_algorithm(
        args.algorithm.as_deref(),
        args.lower_bound.as_deref(),
        args.upper_bound.as_deref(),
    )?;

    let image = config().image();
    let render_options = RenderOptions {
        statement_height: image.statement_height(),
        statement_width: image.statement_width(),
        file_margin: image.file_margin(),
        header_height: image.header_height(),
    };
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| image.output_dir().to_string());

    let commits = repo::list_commits(&repo_settings.path, &repo_settings.git_args).await?;
    info!("Found {} commits to process", commits.len());

    let harness = TestHarness::new(harness_settings);
    let calculator = algorithm.calculator();

    let progress = ProgressBar::new(commits.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let mut summary = RunSummary::default();
    let mut all_scores: Vec<CommitScores> = Vec::new();

    for (index, commit) in commits.iter().enumerate() {
        if !running.load(Ordering::SeqCst) {
            warn!("Campaign interrupted, stopping...");
            break;
        }

        let order = index + 1;
        progress.set_message(commit.hash.clone());
        info!(
            "Collecting test coverage for commit {} ({}/{})...",
            commit.hash,
            order,
            commits.len()
        );

        let result = async {
            repo::checkout(&repo_settings.path, &commit.hash).await?;
            harness.execute(&repo_settings.path, commit).await
        }
        .await;

        match result {
            Ok(spectrum) => {
                let scores = calculator.calculate_suspiciousness(&spectrum);
                all_scores.push(CommitScores::new(commit.hash.clone(), order, scores));
                summary.analyzed += 1;
            }
            Err(e) => {
                warn!("Skipping commit {}: {e}", commit.hash);
                summary.skipped += 1;
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    render_all_commits(&render_options, std::path::Path::new(&output_dir), &all_scores);

    info!(
        "Campaign finished: {} commits analyzed, {} skipped",
        summary.analyzed, summary.skipped
    );

    Ok(summary)
}
