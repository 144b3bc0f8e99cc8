use log::info;

use crate::types::AppResult;
use crate::types::config::config;

pub async fn execute(format: String) -> AppResult<()> {
    let effective_config = config().to_effective();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&effective_config)?);
    } else {
        // Table format
        info!("Effective Configuration:");
        info!("");
        info!("Repo:");
        if let Some(repo) = &effective_config.repo {
            match &repo.path {
                Some(path) => info!("  path: {}", path),
                None => info!("  path: (not set)"),
            }
            info!("  git_args: {}", repo.git_args.as_deref().unwrap_or(""));
        }

        info!("");
        info!("Harness:");
        if let Some(harness) = &effective_config.harness {
            match &harness.path {
                Some(path) => info!("  path: {}", path),
                None => info!("  path: (not set)"),
            }
            if let Some(timeout) = harness.timeout {
                info!("  timeout: {}s", timeout);
            }
            if let Some(output) = &harness.output {
                info!("  output: {}", output);
            }
        }

        info!("");
        info!("Engine:");
        if let Some(engine) = &effective_config.engine {
            match &engine.algorithm {
                Some(algorithm) => info!("  algorithm: {}", algorithm),
                None => info!("  algorithm: (not set)"),
            }
            match &engine.lower_bound {
                Some(bound) => info!("  lower_bound: {}", bound),
                None => info!("  lower_bound: (not set)"),
            }
            match &engine.upper_bound {
                Some(bound) => info!("  upper_bound: {}", bound),
                None => info!("  upper_bound: (not set)"),
            }
        } else {
            info!("  (not configured)");
        }

        info!("");
        info!("Image:");
        if let Some(image) = &effective_config.image {
            info!(
                "  statement: {}x{} px",
                image.statement_width.unwrap_or_default(),
                image.statement_height.unwrap_or_default()
            );
            info!("  file_margin: {}", image.file_margin.unwrap_or_default());
            info!(
                "  header_height: {}",
                image.header_height.unwrap_or_default()
            );
            if let Some(dir) = &image.output_dir {
                info!("  output_dir: {}", dir);
            }
        }

        info!("");
        info!("Log:");
        if let Some(log) = &effective_config.log {
            info!("  level: {}", log.level.as_deref().unwrap_or("info"));
            match log.color {
                Some(true) => info!("  color: on"),
                Some(false) => info!("  color: off"),
                None => info!("  color: auto"),
            }
        }
    }

    Ok(())
}
