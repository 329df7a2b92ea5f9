//! Error kinds raised while decoding, validating, merging, and resolving specs.
//!
//! Every failure in the spec pipeline is a [`SpecError`]. Decode-time failures
//! (empty input, malformed documents, provider payloads that cannot populate
//! their declared shape) are kept apart from validation-time failures
//! (well-formed documents that break an invariant) so callers can tell the two
//! apart via [`SpecError::is_decode_error`].

use clic_util::FormatError;
use thiserror::Error;

use crate::ParamType;

/// Coarse classification of a [`SpecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    Decode,
    UnsupportedExtension,
    InvalidAppSpec,
    InvalidCommandSpec,
    InvalidParameterSpec,
    MergeConflict,
}

/// Errors raised by the spec pipeline. All checks are fail-fast: the first
/// violation found is the one reported.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    /// Zero-length spec content.
    #[error("nothing to decode: spec content is empty")]
    EmptyInput,
    /// Malformed JSON/YAML or a document of the wrong shape.
    #[error("failed to decode spec: {0}")]
    Decode(String),
    /// A spec file with an unrecognised extension.
    #[error("unsupported spec file extension '{0}'")]
    UnsupportedExtension(String),
    /// App-level invariant violation.
    #[error("invalid app spec: {0}")]
    InvalidApp(String),
    /// Command-level invariant violation.
    #[error("invalid command spec: {0}")]
    InvalidCommand(String),
    /// A command key that matches no registered provider.
    #[error("invalid command spec: unknown provider '{key}' on command '{command}'")]
    UnknownProvider { command: String, key: String },
    /// A command carrying more than one registered provider key.
    #[error("invalid command spec: command '{command}' declares more than one provider ({})", .providers.join(", "))]
    AmbiguousProvider { command: String, providers: Vec<String> },
    /// A provider whose own validation contract failed.
    #[error("invalid {provider} provider: {reason}")]
    InvalidProvider { provider: String, reason: String },
    /// A provider payload that could not populate the provider's shape.
    #[error("failed to decode {provider} provider: {reason}")]
    ProviderDecode { provider: String, reason: String },
    /// Parameter-level invariant violation.
    #[error("invalid parameter spec: {0}")]
    InvalidParameter(String),
    /// Fragments that cannot be combined into one app.
    #[error("merge conflict: {0}")]
    MergeConflict(#[from] MergeConflict),
}

impl SpecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::Decode(_) | Self::ProviderDecode { .. } => ErrorKind::Decode,
            Self::UnsupportedExtension(_) => ErrorKind::UnsupportedExtension,
            Self::InvalidApp(_) => ErrorKind::InvalidAppSpec,
            Self::InvalidCommand(_) | Self::UnknownProvider { .. } | Self::AmbiguousProvider { .. } | Self::InvalidProvider { .. } => {
                ErrorKind::InvalidCommandSpec
            }
            Self::InvalidParameter(_) => ErrorKind::InvalidParameterSpec,
            Self::MergeConflict(_) => ErrorKind::MergeConflict,
        }
    }

    /// True when the input could not be read as a spec at all, as opposed to a
    /// well-formed spec that breaks an invariant.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EmptyInput | ErrorKind::Decode | ErrorKind::UnsupportedExtension
        )
    }
}

impl From<FormatError> for SpecError {
    fn from(error: FormatError) -> Self {
        match error {
            FormatError::Empty => Self::EmptyInput,
            FormatError::UnsupportedExtension(extension) => Self::UnsupportedExtension(extension),
            other => Self::Decode(other.to_string()),
        }
    }
}

/// Reasons a set of fragments cannot be merged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    /// The caller supplied nothing to merge.
    #[error("no spec fragments to merge")]
    NoFragments,
    /// Two fragments name different apps.
    #[error("app name mismatch: '{expected}' vs '{found}'")]
    NameMismatch { expected: String, found: String },
    /// Two fragments declare the same command at the same position.
    #[error("command '{0}' is declared by more than one fragment")]
    DuplicateCommand(String),
}

/// Errors raised while resolving parameter values for one invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("missing value for required parameter '{0}'")]
    MissingRequired(String),
    #[error("parameter '{name}' expects a {expected} value")]
    TypeMismatch { name: String, expected: ParamType },
    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Errors raised while preparing a provider payload for execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}
