//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No response was received (connect refused, DNS, elapsed timeout).
    Transport,
    /// The server answered with a non-2xx status.
    Application,
    /// The server answered 2xx but with an unexpected body.
    Decoding,
    Configuration,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// The request can be reissued as-is once connectivity returns.
    RetryLater,
    /// The request was rejected; the input has to change.
    FixRequest,
    CheckServerVersion,
    CheckConfiguration,
    ContactSupport,
}
