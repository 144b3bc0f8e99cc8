//! Renders per-commit suspiciousness heat maps.
//!
//! Each analyzed commit becomes one PNG: a column of stacked horizontal bars
//! per file (first-seen order, left to right), one bar per line, colored from
//! blue (innocent) to red (suspicious). Lines below a file's highest scored
//! line that received no score are painted black. A JSON sidecar next to each
//! image records the column order and the raw scores, since the image itself
//! carries no text.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use log::{error, info};
use serde::Serialize;

use crate::types::{AppResult, CommitScores, Statement};

/// Pixel geometry for the rendered images.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub statement_height: u32,
    pub statement_width: u32,
    pub file_margin: u32,
    pub header_height: u32,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    commit_hash: &'a str,
    order_processed: usize,
    /// Files in column order, left to right.
    files: &'a [String],
    scores: &'a [crate::types::SuspiciousnessScore],
}

/// Renders every commit's scores, logging and skipping commits that fail so
/// one bad render never loses the rest of the campaign's output.
pub fn render_all_commits(
    options: &RenderOptions,
    output_dir: &Path,
    all_scores: &[CommitScores],
) {
    for commit_scores in all_scores {
        match render_commit(options, output_dir, commit_scores) {
            Ok(path) => info!("Wrote {}", path.display()),
            Err(e) => error!(
                "Could not visualize commit #{} (hash: {}): {e}",
                commit_scores.order_processed, commit_scores.commit_hash
            ),
        }
    }
}

/// Renders one commit's scores to `<order>-<hash>.png` plus a JSON sidecar,
/// returning the image path.
pub fn render_commit(
    options: &RenderOptions,
    output_dir: &Path,
    commit_scores: &CommitScores,
) -> AppResult<PathBuf> {
    let files = files_in_order(commit_scores);
    let max_line = commit_scores
        .scores
        .iter()
        .map(|s| s.statement.line)
        .max()
        .unwrap_or(0);

    if files.is_empty() || max_line == 0 {
        return Err(crate::types::AppError::Custom(format!(
            "commit {} has no scored statements to draw",
            commit_scores.commit_hash
        )));
    }

    let width =
        options.file_margin * (files.len() as u32 - 1) + options.statement_width * files.len() as u32;
    let height = max_line * options.statement_height + 2 * options.header_height;

    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let columns: HashMap<&str, u32> = files
        .iter()
        .enumerate()
        .map(|(i, f)| (f.as_str(), i as u32))
        .collect();

    // Bars for scored statements
    for score in &commit_scores.scores {
        let column = columns[score.statement.file.as_str()];
        fill_statement_bar(
            &mut image,
            options,
            column,
            score.statement.line,
            heat_color(score.suspiciousness),
        );
    }

    // Unscored lines up to each file's highest scored line get a black bar
    for statement in missing_statements(commit_scores, &files) {
        let column = columns[statement.file.as_str()];
        fill_statement_bar(
            &mut image,
            options,
            column,
            statement.line,
            Rgba([0, 0, 0, 255]),
        );
    }

    fs::create_dir_all(output_dir)?;
    let stem = format!(
        "{}-{}",
        commit_scores.order_processed, commit_scores.commit_hash
    );

    let sidecar_path = output_dir.join(format!("{stem}.json"));
    let sidecar = Sidecar {
        commit_hash: &commit_scores.commit_hash,
        order_processed: commit_scores.order_processed,
        files: &files,
        scores: &commit_scores.scores,
    };
    fs::write(&sidecar_path, serde_json::to_string_pretty(&sidecar)?)?;

    let image_path = output_dir.join(format!("{stem}.png"));
    image.save(&image_path)?;

    Ok(image_path)
}

/// Distinct files in the order their first score appears.
fn files_in_order(commit_scores: &CommitScores) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for score in &commit_scores.scores {
        if !files.iter().any(|f| *f == score.statement.file) {
            files.push(score.statement.file.clone());
        }
    }
    files
}

/// Every (file, line) combination up to each file's highest scored line that
/// has no score of its own.
fn missing_statements(commit_scores: &CommitScores, files: &[String]) -> Vec<Statement> {
    let mut missing = Vec::new();

    for file in files {
        let max_line = commit_scores
            .scores
            .iter()
            .filter(|s| s.statement.file == *file)
            .map(|s| s.statement.line)
            .max()
            .unwrap_or(0);

        for line in 1..=max_line {
            let candidate = Statement::new(file.clone(), line);
            let scored = commit_scores
                .scores
                .iter()
                .any(|s| s.statement == candidate);
            if !scored {
                missing.push(candidate);
            }
        }
    }

    missing
}

fn fill_statement_bar(
    image: &mut RgbaImage,
    options: &RenderOptions,
    column: u32,
    line: u32,
    color: Rgba<u8>,
) {
    let top = (line - 1) * options.statement_height + options.header_height;
    let left = column * (options.statement_width + options.file_margin);

    for y in top..top + options.statement_height {
        for x in left..left + options.statement_width {
            image.put_pixel(x, y, color);
        }
    }
}

/// Maps suspiciousness onto a hue ramp from blue (0.0) through green to red
/// (1.0), fully saturated.
fn heat_color(suspiciousness: f64) -> Rgba<u8> {
    let clamped = suspiciousness.clamp(0.0, 1.0);
    let hue = (1.0 - clamped) * (240.0 / 360.0);
    hsv_to_rgba(hue)
}

/// Converts a hue in [0, 1] at full saturation and value to RGBA.
fn hsv_to_rgba(hue: f64) -> Rgba<u8> {
    let h = (hue * 6.0).rem_euclid(6.0);
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Rgba([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255])
}
