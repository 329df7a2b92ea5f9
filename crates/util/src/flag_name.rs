/// Converts a parameter name into its CLI flag form (`dry_run` -> `dry-run`).
pub fn to_flag_name(parameter_name: &str) -> String {
    parameter_name.replace('_', "-")
}

/// Inverse of [`to_flag_name`] (`dry-run` -> `dry_run`).
pub fn from_flag_name(flag_name: &str) -> String {
    flag_name.replace('-', "_")
}
