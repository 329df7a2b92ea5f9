//! # Clic Engine
//!
//! The Clic engine turns declarative app documents (JSON or YAML) into a
//! validated command tree that a presentation layer can render as CLI flags
//! and dispatch.
//!
//! ## Key Features
//!
//! - **Format detection**: JSON or YAML, sniffed from content or chosen by extension
//! - **Provider dispatch**: each command node is bound to exactly one registered provider,
//!   inferred from which key it carries
//! - **Fragment merging**: several documents naming the same app combine into one tree
//! - **Validation**: fail-fast, returning a normalized copy of the tree
//!
//! ## Usage
//!
//! ```rust
//! use clic_engine::{ProviderRegistry, decode_app, validate_app};
//! use clic_types::SpecPolicy;
//!
//! let registry = ProviderRegistry::with_defaults();
//! let policy = SpecPolicy::default();
//! let document = br#"
//! name: greeter
//! description: says hello
//! commands:
//!   - name: hello
//!     description: print a greeting
//!     exec:
//!       path: echo
//!       args: ["{{params.greeting}}"]
//!       params:
//!         - name: greeting
//!           type: string
//!           default: hello
//! "#;
//!
//! let app = validate_app(&decode_app(document, &registry, &policy)?, &policy)?;
//! assert_eq!(app.leaf_paths(), vec![vec!["hello".to_string()]]);
//! # Ok::<(), clic_types::SpecError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`provider`**: provider registry and the built-in providers
//! - **`resolve`**: command resolution from the generic decoded tree
//! - **`merge`**: fragment merging
//! - **`validate`**: the validation pipeline

use clic_types::{App, SpecError, SpecPolicy};
use clic_util::{SpecFormat, decode_document};
use tracing::debug;

pub mod merge;
pub mod provider;
pub mod resolve;
pub mod validate;

pub use merge::merge_apps;
pub use provider::{
    ExecProvider, LambdaProvider, NoopProvider, ProviderConstructor, ProviderRegistry, RegistrationError, RestProvider,
};
pub use resolve::{resolve_app, resolve_command};
pub use validate::{validate_app, validate_command};

/// Decodes and resolves one app document, sniffing its format.
///
/// The result is not yet validated; pass it (or the merge of several
/// fragments) through [`validate_app`] before use.
///
/// # Errors
///
/// - [`SpecError::EmptyInput`] when `bytes` is empty
/// - [`SpecError::Decode`] when the document is malformed or of the wrong shape
/// - resolution errors (unknown/ambiguous providers, provider decode failures)
pub fn decode_app(bytes: &[u8], registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App, SpecError> {
    let (format, raw) = decode_document(bytes)?;
    debug!(format = %format, bytes = bytes.len(), "decoded app document");
    resolve_app(&raw, registry, policy)
}

/// Like [`decode_app`] but with the format chosen by the caller, e.g. from a
/// file extension.
pub fn decode_app_with_format(
    bytes: &[u8],
    format: SpecFormat,
    registry: &ProviderRegistry,
    policy: &SpecPolicy,
) -> Result<App, SpecError> {
    let raw = format.decode(bytes)?;
    resolve_app(&raw, registry, policy)
}

/// Merges fragments and validates the result.
pub fn assemble_app(fragments: Vec<App>, policy: &SpecPolicy) -> Result<App, SpecError> {
    let merged = merge_apps(fragments)?;
    validate_app(&merged, policy)
}
