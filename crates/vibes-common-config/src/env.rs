//! Environment variable handling.

/// Environment variable names.
pub mod vars {
    pub const VIBES_CONFIG: &str = "VIBES_CONFIG";
    pub const VIBES_PROJECT_ROOT: &str = "VIBES_PROJECT_ROOT";
    pub const VIBES_LOG_LEVEL: &str = "VIBES_LOG_LEVEL";
    pub const VIBES_LOG_FORMAT: &str = "VIBES_LOG_FORMAT";
    pub const VIBES_LOG_FILE: &str = "VIBES_LOG_FILE";
    pub const CLAUDE_PROJECT_DIR: &str = "CLAUDE_PROJECT_DIR";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Load `.env` then `.env.local` from the working directory.
///
/// Missing files are ignored; variables already set are kept.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env");
    let _ = dotenvy::from_filename(".env.local");
}

/// Read a variable, treating an empty value as unset.
pub fn get(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_ignores_empty() {
        std::env::set_var("VIBES_TEST_EMPTY_VAR", "");
        assert_eq!(get("VIBES_TEST_EMPTY_VAR"), None);
        std::env::set_var("VIBES_TEST_EMPTY_VAR", "x");
        assert_eq!(get("VIBES_TEST_EMPTY_VAR"), Some("x".to_string()));
        std::env::remove_var("VIBES_TEST_EMPTY_VAR");
    }
}
