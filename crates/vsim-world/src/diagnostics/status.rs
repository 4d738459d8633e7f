/// Somewhere to show a one-line status message. Fire-and-forget.
pub trait StatusDisplay {
    fn show_message(&mut self, message: &str);
}

/// Sends status messages to the log at debug level.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogStatus;

impl StatusDisplay for LogStatus {
    fn show_message(&mut self, message: &str) {
        log::debug!("{message}");
    }
}

impl StatusDisplay for Vec<String> {
    fn show_message(&mut self, message: &str) {
        self.push(message.to_string());
    }
}
