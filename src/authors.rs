//! Author lookup table: raw RCS usernames to `Name <email>` identities
//!
//! Entries come from an optional authors file (`username = Full Name
//! <email>` per line). Usernames with no entry get a synthesized placeholder
//! identity so the stream is always well-formed.

use std::collections::HashMap;
use std::path::Path;

/// Mapping from RCS username to display identity.
#[derive(Debug, Clone, Default)]
pub struct AuthorMap {
    entries: HashMap<String, String>,
}

impl AuthorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an authors file. Blank lines and `#` comments are skipped;
    /// duplicate usernames are warned about and the last entry wins. A
    /// missing file warns and yields an empty map, matching the "never
    /// abort the import over auxiliary input" policy.
    pub fn load(path: &Path) -> Self {
        let mut map = Self::new();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Authors file {} not readable: {}", path.display(), e);
                return map;
            }
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((username, author)) = line.split_once('=') {
                let username = username.trim();
                let author = author.trim();
                if map.entries.contains_key(username) {
                    tracing::warn!("Username {} redefined to {}", username, author);
                }
                map.entries.insert(username.to_string(), author.to_string());
            }
        }
        map
    }

    pub fn insert(&mut self, username: impl Into<String>, author: impl Into<String>) {
        self.entries.insert(username.into(), author.into());
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    /// Resolve a username to a display identity, synthesizing a placeholder
    /// when the table has no entry.
    pub fn resolve(&self, username: &str) -> String {
        match self.entries.get(username) {
            Some(author) => author.clone(),
            None => format!("{username} <{username}@example.com>"),
        }
    }

    /// Seed the current operator's identity from `git config` when the
    /// authors file did not cover them.
    pub fn seed_current_user(&mut self) {
        let Some(user) = current_username() else {
            return;
        };
        if self.contains(&user) {
            return;
        }
        if let (Some(name), Some(email)) = (git_config("user.name"), git_config("user.email")) {
            self.entries.insert(user, format!("{name} <{email}>"));
        }
    }
}

fn current_username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

fn git_config(key: &str) -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["config", key])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_known_user() {
        let mut map = AuthorMap::new();
        map.insert("joe", "Joe Hacker <joe@example.org>");
        assert_eq!(map.resolve("joe"), "Joe Hacker <joe@example.org>");
    }

    #[test]
    fn test_resolve_synthesizes_fallback() {
        let map = AuthorMap::new();
        assert_eq!(map.resolve("jane"), "jane <jane@example.com>");
    }

    #[test]
    fn test_load_authors_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.txt");
        fs::write(
            &path,
            "# project authors\n\njoe = Joe Hacker <joe@example.org>\njane= Jane Doe <jane@example.org>\n",
        )
        .unwrap();

        let map = AuthorMap::load(&path);
        assert_eq!(map.resolve("joe"), "Joe Hacker <joe@example.org>");
        assert_eq!(map.resolve("jane"), "Jane Doe <jane@example.org>");
    }

    #[test]
    fn test_load_duplicate_last_writer_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.txt");
        fs::write(
            &path,
            "joe = First <first@example.org>\njoe = Second <second@example.org>\n",
        )
        .unwrap();

        let map = AuthorMap::load(&path);
        assert_eq!(map.resolve("joe"), "Second <second@example.org>");
    }

    #[test]
    fn test_load_missing_file_yields_empty_map() {
        let map = AuthorMap::load(Path::new("/nonexistent/authors.txt"));
        assert!(!map.contains("anyone"));
    }

    #[test]
    fn test_lines_without_equals_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.txt");
        fs::write(&path, "not a mapping line\njoe = Joe <joe@x.org>\n").unwrap();

        let map = AuthorMap::load(&path);
        assert!(map.contains("joe"));
        assert!(!map.contains("not a mapping line"));
    }
}
