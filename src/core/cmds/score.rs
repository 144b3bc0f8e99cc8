use std::path::Path;

use log::info;

use crate::core::cli::ScoreArgs;
use crate::core::harness::parse_spectrum_file;
use crate::types::config::config;
use crate::types::{AppResult, SuspiciousnessScore, rank_descending};

/// Scores one harness output file and prints the result, most suspicious
/// statement first.
pub async fn execute_score(args: ScoreArgs) -> AppResult<()> {
    let algorithm = config().resolve_algorithm(
        args.algorithm.as_deref(),
        args.lower_bound.as_deref(),
        args.upper_bound.as_deref(),
    )?;

    let spectrum = parse_spectrum_file(Path::new(&args.file))?;
    let mut scores = algorithm.calculator().calculate_suspiciousness(&spectrum);
    rank_descending(&mut scores);

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        _ => {
            print_table_format(&args.file, &spectrum_summary(&spectrum), &scores);
        }
    }

    Ok(())
}

fn spectrum_summary(spectrum: &crate::types::ExecutionSpectrum) -> String {
    let passing = spectrum.test_ids(true).len();
    let failing = spectrum.test_ids(false).len();
    format!(
        "{} statements, {} tests ({} passing, {} failing)",
        spectrum.statement_count(),
        spectrum.tests().len(),
        passing,
        failing
    )
}

fn print_table_format(file: &str, summary: &str, scores: &[SuspiciousnessScore]) {
    info!("Suspiciousness for {file}");
    info!("{summary}");
    info!("");

    for score in scores {
        info!("{:8.4}  {}", score.suspiciousness, score.statement);
    }
}
