//! Path helpers

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` syntax
/// - `${VAR}` syntax
/// - `~` for home directory
///
/// Unresolvable variables leave the input untouched.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_is_unchanged() {
        assert_eq!(expand_env_vars("models/engine.json"), "models/engine.json");
    }

    #[test]
    fn unknown_variable_leaves_input_untouched() {
        assert_eq!(
            expand_env_vars("$CADTREE_SURELY_UNSET_VAR/x.step"),
            "$CADTREE_SURELY_UNSET_VAR/x.step"
        );
    }
}
