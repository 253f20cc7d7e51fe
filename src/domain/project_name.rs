use std::path::{Path, PathBuf};

/// Encode an absolute working-directory path as a project identifier, the way
/// log directories are named on disk: path separators become `-`, so
/// `/home/user/app` is stored under `-home-user-app`.
pub fn encode_project_name(path: &Path) -> String {
    path.to_string_lossy().replace('/', "-")
}

/// Reverse of [`encode_project_name`]. Lossy for paths whose segments contain
/// hyphens, which is why resolved directories are preferred over this and the
/// decoded path serves only as the deterministic fallback.
pub fn decode_project_path(name: &str) -> PathBuf {
    PathBuf::from(name.replace('-', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_separators_as_markers() {
        assert_eq!(
            encode_project_name(Path::new("/home/user/app")),
            "-home-user-app"
        );
    }

    #[test]
    fn decode_inverts_encode_for_plain_segments() {
        let name = encode_project_name(Path::new("/home/user/app"));
        assert_eq!(decode_project_path(&name), PathBuf::from("/home/user/app"));
    }

    #[test]
    fn decode_is_lossy_for_hyphenated_segments() {
        assert_eq!(
            decode_project_path("-home-user-my-app"),
            PathBuf::from("/home/user/my/app")
        );
    }
}
