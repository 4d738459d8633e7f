use super::types::{InputEvent, Modifiers};

/// Keyboard modifier state for a single window, read when translating key
/// events.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    pub modifiers: Modifiers,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,
            InputEvent::Key { modifiers, .. } => self.modifiers = *modifiers,
            InputEvent::Focused(_) => {}
        }
    }
}
