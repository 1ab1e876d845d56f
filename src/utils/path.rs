use std::path::PathBuf;

/// Get the home directory, with fallback to "/"
pub fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Get the config directory path (always ~/.config/neurostream, regardless of OS)
pub fn get_config_dir() -> PathBuf {
    get_home_dir().join(".config").join("neurostream")
}

/// Get the config file path (always ~/.config/neurostream/config.toml, regardless of OS)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Directory for the log file: the OS cache dir, or the home dir without one
pub fn get_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(get_home_dir)
        .join("neurostream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        assert!(get_config_path().ends_with(".config/neurostream/config.toml"));
        assert!(get_log_dir().ends_with("neurostream"));
    }
}
