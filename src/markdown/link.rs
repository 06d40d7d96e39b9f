use crate::sync::paths;

/// URL of a remote path under the WebDAV endpoint
pub fn remote_url(base_url: &str, remote_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = paths::ensure_leading_slash(remote_path);
    format!("{}{}", base, paths::encode_remote_path(&path))
}

/// `file://` URL for an absolute local path
pub fn local_url(local_path: &str) -> String {
    let path = paths::ensure_leading_slash(&paths::to_forward_slashes(local_path));
    format!("file://{}", paths::encode_uri(&path))
}

/// Markdown link to an uploaded copy
pub fn remote_link(name: &str, base_url: &str, remote_path: &str) -> String {
    format!("[{}]({})", name, remote_url(base_url, remote_path))
}

/// Markdown link to a file that stays on this machine
pub fn local_link(name: &str, local_path: &str) -> String {
    format!("[{}]({})", name, local_url(local_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_link() {
        assert_eq!(
            remote_link("a b.png", "https://dav.example.com/files/", "/img/a b.png"),
            "[a b.png](https://dav.example.com/files/img/a%20b.png)"
        );
    }

    #[test]
    fn test_remote_link_encodes_segments_only() {
        assert_eq!(
            remote_url("http://host", "/dir?x/50%#1.png"),
            "http://host/dir%3Fx/50%25%231.png"
        );
    }

    #[test]
    fn test_local_link_unix() {
        assert_eq!(
            local_link("report.pdf", "/home/me/My Docs/report.pdf"),
            "[report.pdf](file:///home/me/My%20Docs/report.pdf)"
        );
    }

    #[test]
    fn test_local_link_windows() {
        assert_eq!(
            local_url("C:\\Users\\Me\\a b.png"),
            "file:///C:/Users/Me/a%20b.png"
        );
    }
}
