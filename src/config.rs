use crate::error::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: Option<usize>,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub idle_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name_prefix: "rondo-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            idle_wait: Duration::from_millis(1),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(Error::config("num_threads must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_threads too large (max 1024)"));
            }
        }

        if self.idle_wait.is_zero() {
            return Err(Error::config("idle_wait must be non-zero"));
        }

        Ok(())
    }

    /// Worker count the pool will actually use: the configured override, or
    /// the detected hardware concurrency with a floor of one thread.
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn idle_wait(mut self, wait: Duration) -> Self {
        self.config.idle_wait = wait;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(Config::builder().num_threads(0).build().is_err());
    }

    #[test]
    fn test_zero_idle_wait_rejected() {
        assert!(Config::builder().idle_wait(Duration::ZERO).build().is_err());
    }

    #[test]
    fn test_worker_threads_floor() {
        let config = Config::default();
        assert!(config.worker_threads() >= 1);

        let config = Config::builder().num_threads(3).build().unwrap();
        assert_eq!(config.worker_threads(), 3);
    }
}
