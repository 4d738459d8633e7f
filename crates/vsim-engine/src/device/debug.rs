use std::collections::VecDeque;

/// Numeric driver error codes reported on the polling tier.
pub mod error_code {
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const OUT_OF_MEMORY: u32 = 0x0505;
    pub const CONTEXT_LOST: u32 = 0x0507;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Notification,
    Low,
    Medium,
    High,
}

/// Category of a structured debug message.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageKind {
    Error,
    UndefinedBehavior,
    Performance,
    Portability,
    /// Driver chatter such as buffer memory placement hints.
    Other,
}

/// A structured message from the driver's debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    pub kind: MessageKind,
    pub severity: Severity,
    pub text: String,
}

impl DebugMessage {
    pub fn new(kind: MessageKind, severity: Severity, text: impl Into<String>) -> Self {
        Self { kind, severity, text: text.into() }
    }

    pub(crate) fn from_wgpu(err: &wgpu::Error) -> Self {
        match err {
            wgpu::Error::OutOfMemory { .. } => {
                Self::new(MessageKind::Error, Severity::High, err.to_string())
            }
            wgpu::Error::Validation { .. } => {
                Self::new(MessageKind::Error, Severity::High, err.to_string())
            }
            wgpu::Error::Internal { .. } => {
                Self::new(MessageKind::UndefinedBehavior, Severity::Medium, err.to_string())
            }
        }
    }
}

pub(crate) fn code_for(err: &wgpu::Error) -> u32 {
    match err {
        wgpu::Error::OutOfMemory { .. } => error_code::OUT_OF_MEMORY,
        wgpu::Error::Validation { .. } => error_code::INVALID_OPERATION,
        wgpu::Error::Internal { .. } => error_code::CONTEXT_LOST,
    }
}

/// Collects device errors raised outside of error scopes.
///
/// Fed from wgpu's uncaptured-error callback, drained on the render thread.
#[derive(Debug, Default)]
pub(crate) struct DebugSink {
    pub structured: bool,
    pub messages: Vec<DebugMessage>,
    pub codes: VecDeque<u32>,
}

impl DebugSink {
    pub fn record(&mut self, err: &wgpu::Error) {
        if self.structured {
            self.messages.push(DebugMessage::from_wgpu(err));
        } else {
            self.codes.push_back(code_for(err));
        }
    }
}
