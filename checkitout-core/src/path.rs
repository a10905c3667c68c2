//! slash-delimited relative path helpers

use crate::{Sandbox, StoreDirectory};

use std::path::Path;

/// split `path` at its last `/` into (parent, leaf)
///
/// An empty parent is reported as `None`, so `"a.wav"` and `"/a.wav"` both
/// yield `(None, "a.wav")`.
pub fn parse_path(path: &str) -> (Option<String>, String) {
    match path.rsplit_once('/') {
        Some((parent, leaf)) if !parent.is_empty() => (Some(parent.to_string()), leaf.to_string()),
        Some((_, leaf)) => (None, leaf.to_string()),
        None => (None, path.to_string()),
    }
}

/// drop a single trailing `/`
pub fn to_dir_name(dir_name: &str) -> &str {
    dir_name.strip_suffix('/').unwrap_or(dir_name)
}

/// join a parent and a leaf with `/`, skipping an empty parent
pub fn join(parent: &str, leaf: &str) -> String {
    if parent.is_empty() {
        leaf.to_string()
    } else {
        format!("{}/{}", to_dir_name(parent), leaf)
    }
}

/// find which root an absolute path (or `file://` url) lives under
///
/// The deepest matching root wins, so a file in the inbox resolves to
/// [`StoreDirectory::Inbox`] rather than to the library or the home.
pub fn parse_absolute<S: Sandbox + ?Sized>(
    sandbox: &S,
    absolute: &str,
) -> Option<(StoreDirectory, Option<String>, String)> {
    let absolute = absolute.strip_prefix("file://").unwrap_or(absolute);
    let absolute = Path::new(absolute);
    let (directory, rest) = [
        StoreDirectory::Inbox,
        StoreDirectory::Cache,
        StoreDirectory::Document,
        StoreDirectory::Library,
        StoreDirectory::Temp,
        StoreDirectory::Home,
    ]
    .into_iter()
    .filter_map(|directory| {
        let root = directory.path(sandbox).ok()?;
        let rest = absolute.strip_prefix(&root).ok()?;
        Some((directory, root.components().count(), rest.to_path_buf()))
    })
    .max_by_key(|(_, depth, _)| *depth)
    .map(|(directory, _, rest)| (directory, rest))?;
    let rest = rest.to_str()?;
    let (dir_name, file_name) = parse_path(rest);
    Some((directory, dir_name, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedSandbox;

    #[test]
    fn split_without_slash() {
        assert_eq!(parse_path("kick.wav"), (None, "kick.wav".to_string()));
        assert_eq!(parse_path(""), (None, String::new()));
    }

    #[test]
    fn split_with_one_slash() {
        assert_eq!(
            parse_path("drums/kick.wav"),
            (Some("drums".to_string()), "kick.wav".to_string())
        );
        assert_eq!(parse_path("/kick.wav"), (None, "kick.wav".to_string()));
        assert_eq!(parse_path("drums/"), (Some("drums".to_string()), String::new()));
    }

    #[test]
    fn split_with_many_slashes() {
        assert_eq!(
            parse_path("a/b/c/kick.wav"),
            (Some("a/b/c".to_string()), "kick.wav".to_string())
        );
    }

    #[test]
    fn trailing_slash_dropped_once() {
        assert_eq!(to_dir_name("drums/"), "drums");
        assert_eq!(to_dir_name("drums//"), "drums/");
        assert_eq!(to_dir_name("drums"), "drums");
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("x/", "a"), "x/a");
    }

    #[test]
    fn absolute_resolves_deepest_root() {
        let sandbox = FixedSandbox::new("/app");
        assert_eq!(
            parse_absolute(&sandbox, "/app/Library/Inbox/mail.txt"),
            Some((StoreDirectory::Inbox, None, "mail.txt".to_string()))
        );
        assert_eq!(
            parse_absolute(&sandbox, "file:///app/Documents/takes/one.wav"),
            Some((
                StoreDirectory::Document,
                Some("takes".to_string()),
                "one.wav".to_string()
            ))
        );
        assert_eq!(
            parse_absolute(&sandbox, "/app/Library/Caches/c"),
            Some((StoreDirectory::Cache, None, "c".to_string()))
        );
        assert_eq!(
            parse_absolute(&sandbox, "/app/notes.txt"),
            Some((StoreDirectory::Home, None, "notes.txt".to_string()))
        );
        assert_eq!(parse_absolute(&sandbox, "/elsewhere/a.wav"), None);
    }
}
