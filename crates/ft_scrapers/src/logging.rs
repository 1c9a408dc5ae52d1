use std::collections::VecDeque;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Prefix-carrying wrapper over the `tracing` macros, so every line of one
/// batch carries its source tag.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_new_prefixes(mut self, prefix: String) -> Self {
        self.prefixes.clear();
        self.prefixes.push_back(prefix);
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.prefix(), message);
    }
}

/// Installs the global fmt subscriber once. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Logger {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        // Another subscriber may already be installed (tests, embedding apps).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prefixes_replace_old_ones() {
        let logger = Logger::new();
        assert_eq!(logger.prefix(), "");

        let logger = logger.with_new_prefixes("[goal]".to_string());
        assert_eq!(logger.prefix(), "[goal] ");

        let logger = logger.with_new_prefixes("[espn]".to_string());
        assert_eq!(logger.prefix(), "[espn] ");
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging("debug").info("first");
        init_logging("not a level ((").info("second");
    }
}
