use std::fmt;

/// Which half of the shader pair a diagnostic belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failure to bring the ray background up. Never fatal for the page: the
/// effect is simply absent.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompileFailed { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {0}")]
    ProgramLinkFailed(String),

    #[error("gpu resource setup failed: {0}")]
    Resource(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The frame callback has already been torn down.
    #[error("frame callback detached")]
    Detached,

    #[error("frame request rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_failure_names_the_stage() {
        let err = InitError::ShaderCompileFailed {
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:3: syntax error".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader failed to compile: ERROR: 0:3: syntax error"
        );
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: ConfigError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
