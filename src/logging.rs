use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Level for the process logger: warnings and errors, or everything down to debug
/// when `DEBUG=1` asks for request/response echo.
pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

pub fn init_logger(debug: bool) {
    let mut builder = Builder::new();
    builder.filter_level(level_for(debug));

    builder.format(|buf, record| {
        let level = record.level();

        let level_label = match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn  => "WARN ".yellow().bold(),
            Level::Info  => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(
            buf,
            "{} {}",
            level_label,
            record.args()
        )
    });

    // Writes to stderr so debug output never mixes with the message preview.
    builder.target(env_logger::Target::Stderr);
    let _ = builder.try_init();
}
