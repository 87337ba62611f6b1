//! Setup errors raised while binding an API description.

use thiserror::Error;

/// Errors raised synchronously at bind time.
///
/// These are configuration mistakes and are fatal: the binder stops at the
/// first one instead of registering a partially wired API.
#[derive(Debug, Error)]
pub enum BindError {
    /// A base path was neither empty nor absolute.
    #[error("invalid base path '{0}': must be empty or begin with '/'")]
    InvalidBasePath(String),

    /// The configured docs path was not absolute.
    #[error("invalid docs path '{0}': must begin with '/'")]
    InvalidDocsPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let error = BindError::InvalidBasePath("v2".to_string());
        assert!(error.to_string().contains("'v2'"));

        let error = BindError::InvalidDocsPath("docs".to_string());
        assert!(error.to_string().contains("'docs'"));
    }
}
