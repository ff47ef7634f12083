use thiserror::Error;

/// Errors decoding a guest-supplied effect parameter block
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("unsupported parameter version {0}")]
    UnsupportedVersion(u32),
    #[error("parameter block too short: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },
    #[error("invalid parameter state {0}")]
    InvalidState(u8),
    #[error("invalid parameter JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors validating or loading a renderer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sample count must be non-zero")]
    ZeroSampleCount,
    #[error("mix buffer count must be non-zero")]
    ZeroMixBufferCount,
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    #[error("rendering time limit must be within 1..=100 percent, got {0}")]
    InvalidTimeLimit(u32),
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported to the control thread by a `RendererController`
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("renderer command queue is full")]
    QueueFull,
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
