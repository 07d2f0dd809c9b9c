use std::fs::File;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::Config;

/// Installs the global logger: terminal output, plus a log file when one is
/// configured.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let log_config = ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Error)
        .set_time_format_rfc3339()
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        loggers.push(WriteLogger::new(
            config.log_level,
            log_config,
            File::create(path)?,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
