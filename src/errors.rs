use miette::Diagnostic;
use thiserror::Error;

use crate::authz::errors::AuthzError;

#[derive(Debug, Error, Diagnostic)]
pub enum WarrantError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(warrant::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(warrant::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(warrant::serde))]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Authz(#[from] AuthzError),

    #[error("Bad listen address `{0}`")]
    #[diagnostic(
        code(warrant::bad_addr),
        help("Set server.host and server.port, e.g. WARRANT__SERVER__PORT=9090")
    )]
    BadAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_context_json_is_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{requester:")
            .map_err(WarrantError::from)
            .unwrap_err();
        assert!(matches!(err, WarrantError::Serde(_)));
        assert_eq!(err.code().unwrap().to_string(), "warrant::serde");
    }
}
