//! Centralized Error Handling Module
//!
//! Every failure of a discovery request flows through [`DiscoveryError`] and
//! carries a unique [`ErrorCode`], so logs and CLI exit statuses stay stable.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR

use std::fmt;

/// Discovery error type
#[derive(Debug)]
pub struct DiscoveryError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DiscoveryError {
    /// Create a new DiscoveryError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create DiscoveryError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Window-level faults are only swallowed for this kind
    pub fn is_transient(&self) -> bool {
        self.code == ErrorCode::TransientRpc
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed token address, rejected before any RPC
    InvalidInput,
    /// Adapter call still failing after retry exhaustion
    TransientRpc,
    /// A matched mint log lacks the topics the schema requires
    InvalidEventFormat,
    /// Search range exhausted without a structural match
    NotFound,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::TransientRpc => "RPC_TRANSIENT",
            Self::InvalidEventFormat => "EVENT_INVALID_FORMAT",
            Self::NotFound => "LOCKER_NOT_FOUND",
        }
    }

    /// Process exit status for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput => 2,
            Self::NotFound => 3,
            Self::InvalidEventFormat => 4,
            Self::TransientRpc => 5,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl DiscoveryError {
    /// Invalid token address
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    /// RPC call failed after all attempts; the last failure is kept as source
    pub fn transient_rpc(operation: &str, last: eyre::Report) -> Self {
        let message = format!("{} failed: {}", operation, last);
        Self::with_source(ErrorCode::TransientRpc, message, last)
    }

    /// Malformed mint event
    pub fn invalid_event_format(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidEventFormat, msg)
    }

    /// Token not found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Scout Result type
pub type ScoutResult<T> = Result<T, DiscoveryError>;
