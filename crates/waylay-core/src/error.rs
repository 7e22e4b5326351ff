//! Error types for the interception engine

use thiserror::Error;

use crate::point::PointName;

/// Result type alias for hook operations
pub type HookResult<T> = Result<T, HookError>;

/// Main error type for the interception engine
#[derive(Error, Debug)]
pub enum HookError {
    /// Installing on a point with no registered target behavior
    #[error("no target registered for point `{point}` on class {class} or its ancestors")]
    MissingTarget {
        class: &'static str,
        point: PointName,
    },

    /// Failure raised by a hook procedure or by the original behavior it
    /// reached; carried through every still-active `proceed` frame
    /// unmodified
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl HookError {
    /// Create a new missing-target error
    pub fn missing_target(class: &'static str, point: &PointName) -> Self {
        Self::MissingTarget {
            class,
            point: point.clone(),
        }
    }

    /// Wrap an arbitrary failure as a hook error
    pub fn hook(error: impl Into<anyhow::Error>) -> Self {
        Self::Hook(error.into())
    }
}

impl From<serde_json::Error> for HookError {
    fn from(error: serde_json::Error) -> Self {
        Self::Hook(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_names_class_and_point() {
        let error = HookError::missing_target("Widget", &PointName::from("render"));
        assert_eq!(
            error.to_string(),
            "no target registered for point `render` on class Widget or its ancestors"
        );
    }

    #[test]
    fn hook_errors_display_transparently() {
        let error = HookError::hook(anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "boom");
        assert!(matches!(error, HookError::Hook(_)));
    }

    #[test]
    fn json_errors_convert() {
        let bad: Result<u32, serde_json::Error> = serde_json::from_str("not json");
        let error: HookError = bad.unwrap_err().into();
        assert!(matches!(error, HookError::Hook(_)));
    }
}
