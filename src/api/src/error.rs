//! Error types for the pace engine.

use thiserror::Error;

/// Race context or runner list that breaks the engine's input contract.
///
/// Sparse history is never an error; these only fire when the caller hands
/// the engine something it cannot score at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaceError {
    #[error("race distance must be positive")]
    InvalidDistance,

    #[error("field size must be positive")]
    InvalidFieldSize,

    #[error("field size {field_size} is smaller than the {runners} runners supplied")]
    FieldSizeMismatch { field_size: u32, runners: usize },

    #[error("race has no runners")]
    EmptyField,

    #[error("horse number must be positive")]
    InvalidHorseNumber,

    #[error("horse number {0} appears more than once")]
    DuplicateHorseNumber(u32),

    #[error("jump races cannot be scored")]
    UnsupportedTrack,
}

impl PaceError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            PaceError::InvalidDistance => "distance",
            PaceError::InvalidFieldSize | PaceError::FieldSizeMismatch { .. } => "field_size",
            PaceError::EmptyField => "horses",
            PaceError::InvalidHorseNumber | PaceError::DuplicateHorseNumber(_) => "horse_number",
            PaceError::UnsupportedTrack => "track_type",
        }
    }
}
