use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod logger {
    use super::*;

    /// Installs `env_logger` with a default filter of `info`.
    pub fn init() {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }

    /// Append-only activity log. A disabled log accepts and drops every line.
    #[derive(Debug, Clone, Default)]
    pub struct ActivityLog {
        path: Option<Arc<Path>>,
    }

    impl ActivityLog {
        pub fn new(path: &Path) -> Self {
            ActivityLog {
                path: Some(Arc::from(path)),
            }
        }

        pub fn disabled() -> Self {
            ActivityLog::default()
        }

        pub fn log_new_line(&self, line: &str) -> std::io::Result<()> {
            match &self.path {
                Some(path) => append_line(path, line),
                None => Ok(()),
            }
        }
    }

    pub fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(path)?;

        writeln!(file, "{}", line.trim_end())?;
        Ok(())
    }
}
