pub mod flag_name;
pub mod format;
pub mod path_processing;
pub mod placeholders;

pub use flag_name::{from_flag_name, to_flag_name};
pub use format::{FormatError, SpecFormat, decode_document};
pub use path_processing::expand_tilde;
pub use placeholders::{extract_placeholder_names, placeholder_for, substitute_placeholders};
