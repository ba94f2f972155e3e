use thiserror::Error;

/// Validation failures raised while building scene configuration or wishes.
///
/// The animators themselves never fail; everything that could make the math
/// ill-defined is rejected here, up front.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("damping rate `{name}` must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f32 },

    #[error("time window `{name}` must be finite and non-negative, got {value}")]
    InvalidWindow { name: &'static str, value: f32 },

    #[error("gallery needs at least one photo")]
    EmptyGallery,

    #[error("layer `{0}` has no particles")]
    EmptyLayer(&'static str),

    #[error("wish {field} is empty")]
    EmptyField { field: &'static str },

    #[error("wish {field} is {len} characters, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;

pub(crate) fn check_rate(name: &'static str, value: f32) -> SceneResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidRate { name, value })
    }
}

pub(crate) fn check_window(name: &'static str, value: f32) -> SceneResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidWindow { name, value })
    }
}
