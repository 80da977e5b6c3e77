/// Convenience result type used across midiroll.
pub type MidirollResult<T> = Result<T, MidirollError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum MidirollError {
    /// Parameters that are invalid and have no sensible fallback.
    #[error("validation error: {0}")]
    Validation(String),

    /// Nothing to render.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// The MIDI container could not be read or uses an unsupported layout.
    #[error("midi error: {0}")]
    Midi(String),

    /// A rendered frame could not be persisted.
    #[error("encode error: {0}")]
    Encode(String),

    /// The export pipeline shut down unexpectedly.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MidirollError {
    /// Build a [`MidirollError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MidirollError::EmptyInput`] value.
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Build a [`MidirollError::Midi`] value.
    pub fn midi(msg: impl Into<String>) -> Self {
        Self::Midi(msg.into())
    }

    /// Build a [`MidirollError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MidirollError::Pipeline`] value.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
