use vsim_engine::device::{
    error_code, DebugMessage, GraphicsContext, MessageKind, Severity, DEBUG_OUTPUT_EXTENSION,
};

/// How driver errors reach the log.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiagnosticsTier {
    /// The context delivers categorized messages.
    Structured,
    /// Only numeric error codes are available; they are polled every frame.
    Polling,
}

/// Reports graphics-driver error state through `log`.
#[derive(Debug)]
pub struct Diagnostics {
    tier: DiagnosticsTier,
}

impl Diagnostics {
    /// Picks the best tier the context supports and switches it on.
    pub fn start(ctx: &mut dyn GraphicsContext) -> Self {
        if !ctx.has_extension(DEBUG_OUTPUT_EXTENSION) {
            log::info!(
                "This system can not deliver structured debug messages, so we revert to polling error codes"
            );
            return Self { tier: DiagnosticsTier::Polling };
        }

        log::info!("This system can log extended graphics errors");
        if ctx.enable_debug_messages() {
            log::info!("Started structured debug message logger");
            Self { tier: DiagnosticsTier::Structured }
        } else {
            log::warn!("structured debug messages advertised but could not be enabled");
            Self { tier: DiagnosticsTier::Polling }
        }
    }

    pub fn tier(&self) -> DiagnosticsTier {
        self.tier
    }

    /// Drains pending driver errors and logs them. Returns how many were logged.
    pub fn check(&self, ctx: &mut dyn GraphicsContext) -> usize {
        match self.tier {
            DiagnosticsTier::Structured => {
                let mut logged = 0;
                for msg in ctx.take_debug_messages() {
                    if log_message(&msg) {
                        logged += 1;
                    }
                }
                logged
            }
            DiagnosticsTier::Polling => {
                let mut logged = 0;
                while let Some(code) = ctx.poll_error() {
                    log_code(code);
                    logged += 1;
                }
                logged
            }
        }
    }
}

/// Name and explanation for the codes worth explaining.
pub fn explain_code(code: u32) -> Option<(&'static str, &'static str)> {
    match code {
        error_code::INVALID_ENUM => Some((
            "INVALID_ENUM",
            "an enumeration parameter is not legal for the function",
        )),
        error_code::INVALID_VALUE => Some((
            "INVALID_VALUE",
            "a value parameter is not legal for the function",
        )),
        error_code::INVALID_OPERATION => Some((
            "INVALID_OPERATION",
            "the set of state for a command is not legal for the parameters given",
        )),
        _ => None,
    }
}

pub fn level_for(severity: Severity) -> log::Level {
    match severity {
        Severity::High => log::Level::Error,
        Severity::Medium => log::Level::Warn,
        Severity::Low => log::Level::Info,
        Severity::Notification => log::Level::Debug,
    }
}

/// Memory placement hints and similar chatter are not worth logging.
pub fn is_noise(msg: &DebugMessage) -> bool {
    msg.kind == MessageKind::Other
}

fn log_message(msg: &DebugMessage) -> bool {
    if is_noise(msg) {
        return false;
    }
    log::log!(level_for(msg.severity), "{:?}: {}", msg.kind, msg.text);
    true
}

fn log_code(code: u32) {
    match explain_code(code) {
        Some((name, explanation)) => log::error!("graphics error {name} ({code:#06x}): {explanation}"),
        None => log::warn!("graphics error {code:#06x}"),
    }
}
