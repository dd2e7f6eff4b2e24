use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use crate::config::General;
use crate::errors::ConfigError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

/// Sets up log4rs with a console and/or file appender given general configuration
///
/// # Arguments
///
/// * 'general' - the general section of the configuration
pub fn setup_logger(general: &General) -> Result<Handle, ConfigError> {
    let config = build_config(general)?;

    Ok(log4rs::init_config(config)?)
}

fn build_config(general: &General) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .target(Target::Stdout)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn builds_console_only_config() {
        let general = General { log_path: None, log_level: LevelFilter::Debug, log_to_stdout: true };
        let config = build_config(&general).unwrap();

        assert_eq!(config.appenders().len(), 1);
        assert_eq!(config.root().level(), LevelFilter::Debug);
    }

    #[test]
    fn builds_silent_config_without_appenders() {
        let general = General { log_path: None, log_level: LevelFilter::Off, log_to_stdout: false };
        let config = build_config(&general).unwrap();

        assert!(config.appenders().is_empty());
    }
}
