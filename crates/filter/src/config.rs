use serde::{Deserialize, Serialize};

const LOAD_DEPENDENCIES_ENV: &str = "PROJECT_FILTER_LOAD_DEPENDENCIES";
const EXPAND_LOADED_ENV: &str = "PROJECT_FILTER_EXPAND_LOADED";

/// User preferences applied when building filter options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Pull in build dependencies of loaded projects
    pub load_dependencies: bool,

    /// Expand the explorer folders containing newly loaded projects
    pub expand_loaded_projects: bool,

    /// Title shown by the progress UI
    pub progress_title: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            load_dependencies: true,
            expand_loaded_projects: true,
            progress_title: "Filtering projects".to_string(),
        }
    }
}

impl FilterConfig {
    /// Defaults overridden by `PROJECT_FILTER_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            load_dependencies: parse_flag(
                std::env::var(LOAD_DEPENDENCIES_ENV).ok().as_deref(),
                defaults.load_dependencies,
            ),
            expand_loaded_projects: parse_flag(
                std::env::var(EXPAND_LOADED_ENV).ok().as_deref(),
                defaults.expand_loaded_projects,
            ),
            ..defaults
        }
    }
}

fn parse_flag(raw: Option<&str>, default_value: bool) -> bool {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return default_value;
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default_value,
    }
}
