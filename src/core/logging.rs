use log::{Level, LevelFilter};

use crate::types::config::{colors_enabled, config};

/// Installs the global logger. Info-level messages print bare so command
/// output reads like plain text; everything else is prefixed with its level,
/// colored when the terminal (or config) allows it.
pub fn init_logging() {
    let level = match config().log().level() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let colors = colors_enabled();

    // A second apply can only happen in tests; the first logger wins.
    let _ = fern::Dispatch::new()
        .format(move |out, message, record| {
            if record.level() == Level::Info {
                out.finish(format_args!("{message}"));
            } else {
                let label = level_label(record.level(), colors);
                out.finish(format_args!("{label}: {message}"));
            }
        })
        .level(level)
        .chain(std::io::stdout())
        .apply();
}

fn level_label(level: Level, colors: bool) -> String {
    let name = level.as_str().to_lowercase();
    if !colors {
        return name;
    }
    let styled = match level {
        Level::Error => console::style(name).red(),
        Level::Warn => console::style(name).yellow(),
        Level::Debug | Level::Trace => console::style(name).dim(),
        Level::Info => console::style(name),
    };
    styled.to_string()
}
