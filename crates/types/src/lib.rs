//! Shared types for clic: the app model, providers, parameters and the
//! errors the spec pipeline reports.

pub mod app;
pub mod error;
pub mod parameter;
pub mod policy;
pub mod provider;
pub mod values;

pub use app::{App, Command, CommandBody};
pub use error::{ErrorKind, InvocationError, MergeConflict, ResolveError, SpecError};
pub use parameter::{ParamType, ParamValue, Parameter, ParameterSet};
pub use policy::{EmptyCommandPolicy, SchemaMode, SpecPolicy};
pub use provider::{ExecInvocation, HttpInvocation, Invocation, Provider, RemoteInvocation};
pub use values::{FlagSource, NoFlags, ResolvedValues};
