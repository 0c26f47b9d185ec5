//! General utility functions.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Name of the data folder holding settings and logs
pub const DATA_FOLDER_NAME: &str = ".figkit";

/// Resolve the working directory and its data folder.
///
/// A data folder in the current working directory wins; otherwise the
/// folder is created under the home directory.
fn get_data_dir(temp_name: &str) -> (PathBuf, PathBuf) {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let temp_path = cwd.join(temp_name);

    if temp_path.exists() {
        return (cwd, temp_path);
    }

    let home_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let temp_path = home_path.join(temp_name);

    if !temp_path.exists() {
        let _ = fs::create_dir_all(&temp_path);
    }

    (home_path, temp_path)
}

/// Data directory
pub static DATA_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let (_, data_dir) = get_data_dir(DATA_FOLDER_NAME);
    data_dir
});

/// Get path for a file inside the data directory
pub fn get_file_path(filename: &str) -> PathBuf {
    DATA_DIR.join(filename)
}

/// Get path for a folder inside the data directory, creating it if needed
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = DATA_DIR.join(folder_name);
    if !folder_path.exists() {
        let _ = fs::create_dir_all(&folder_path);
    }
    folder_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_name() {
        let (_, data_dir) = get_data_dir(DATA_FOLDER_NAME);
        assert!(data_dir.ends_with(DATA_FOLDER_NAME));
    }

    #[test]
    fn test_get_file_path() {
        let path = get_file_path("figkit_setting.json");
        assert!(path.ends_with("figkit_setting.json"));
        assert!(path.starts_with(&*DATA_DIR));
    }
}
