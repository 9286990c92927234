//! Ошибки генератора карт

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapgenError {
    /// Параметр генерации вне допустимого диапазона
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("cannot sample an empty field")]
    EmptyField,

    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to create image buffer {width}×{height}")]
    ImageBuffer { width: u32, height: u32 },
}

impl MapgenError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapgenError>;

/// Неудачный поиск пути
///
/// `Unreachable` означает, что фронт поиска опустел (цель недостижима),
/// `Exhausted` — что поиск упёрся в лимит раскрытий.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no path: end cell is unreachable")]
    Unreachable,

    #[error("no path: search gave up after {expansions} expansions")]
    Exhausted { expansions: usize },

    #[error("cell {index} is outside of a grid with {len} cells")]
    InvalidCell { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_parameter() {
        let err = MapgenError::invalid("sea_ratio", "must be within [0, 1], got 1.5");
        assert_eq!(
            err.to_string(),
            "invalid parameter `sea_ratio`: must be within [0, 1], got 1.5"
        );

        let err = PathError::Exhausted { expansions: 10_000 };
        assert!(err.to_string().contains("10000"));
    }
}
