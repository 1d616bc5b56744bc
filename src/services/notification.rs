use log::info;

mod logging {
    pub use super::super::logging::logger;
}
use logging::logger::ActivityLog;

/// The single status banner shared by every flow. Last write wins.
#[derive(Debug, Default, Clone)]
pub struct Notification {
    text: String,
    visible: bool,
    echo: bool,
    log: ActivityLog,
}

impl Notification {
    /// A banner that also prints every message to stdout and records it
    /// in `log`.
    pub fn terminal(log: ActivityLog) -> Self {
        Notification {
            echo: true,
            log,
            ..Default::default()
        }
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.visible = true;

        info!("{}", self.text);
        if let Err(err) = self.log.log_new_line(&self.text) {
            log::warn!("activity log unavailable: {}", err);
        }
        if self.echo {
            println!("{}", self.text);
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Text of the last `show`, kept even while hidden.
    pub fn text(&self) -> &str {
        &self.text
    }
}
