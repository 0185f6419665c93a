//! Vault-relative path helpers.

/// Normalize a vault-relative path: `/` separators, no empty segments,
/// no leading or trailing separator, no `.` segments.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a directory and a file name into one normalized path.
pub fn join_path(dir: &str, name: &str) -> String {
    normalize_path(&format!("{}/{}", dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("attachments/backup"), "attachments/backup");
        assert_eq!(normalize_path("/attachments//backup/"), "attachments/backup");
        assert_eq!(normalize_path("attachments\\backup"), "attachments/backup");
        assert_eq!(normalize_path("./a/./b"), "a/b");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("attachments/backup/", "cat.png"), "attachments/backup/cat.png");
        assert_eq!(join_path("", "cat.png"), "cat.png");
    }
}
