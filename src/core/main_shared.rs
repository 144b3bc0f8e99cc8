use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use log::{debug, warn};

use crate::core::cli::{Args, Commands, PrintArgs};
use crate::core::cmds;
use crate::core::logging::init_logging;
use crate::types::AppResult;
use crate::types::config::{CliOverrides, init_with_overrides, set_config_filename};

pub async fn run_main() -> AppResult<()> {
    let args = Args::parse();

    // Handle global arguments
    if let Some(cwd_arg) = args.cwd.as_ref() {
        let cwd = PathBuf::from(cwd_arg).canonicalize()?;
        let _ = env::set_current_dir(&cwd);
    }
    if let Some(config_filename) = args.config.as_ref() {
        set_config_filename(config_filename);
    }

    // Build CLI overrides for config precedence
    let cli_overrides = CliOverrides {
        log_level: args.log_level.clone(),
        log_color: args.log_color.clone(),
    };

    // Initialize configuration (file, then CLI overrides)
    init_with_overrides(&cli_overrides);

    // Initialize logging after config so level/color are applied
    init_logging();

    let cwd = env::current_dir()?;
    debug!("Current working directory: {}", cwd.display());

    // Setup running flag to handle signals from ctrl-c
    let running = Arc::new(AtomicBool::new(true));
    let running_ctrlc = Arc::clone(&running);

    ctrlc::set_handler(move || {
        warn!("Received Ctrl-C, cleaning up..");
        running_ctrlc.store(false, Ordering::SeqCst);
    })
    .expect("Error creating a Ctrl-C handler");

    // Dispatch to appropriate command
    let exit_code = match args.command {
        Commands::Init => {
            cmds::execute_init().await?;
            0
        }
        Commands::Run(run_args) => {
            let summary = cmds::execute_run(run_args, Arc::clone(&running)).await?;

            if !running.load(Ordering::SeqCst) {
                // Campaign was interrupted
                2
            } else if summary.analyzed == 0 && summary.skipped > 0 {
                // Every commit failed; the output directory is empty
                1
            } else {
                0
            }
        }
        Commands::Score(score_args) => {
            cmds::execute_score(score_args).await?;
            0
        }
        Commands::Print {
            command: print_args,
        } => {
            match print_args {
                PrintArgs::Config(config_args) => {
                    cmds::execute_print(cmds::print::PrintCommand::Config(config_args.format))
                        .await?
                }
            }
            0
        }
    };

    // Exit with appropriate code
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
