use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Derives destination-unique names for keep-both resolutions by splicing a
/// bracketed numeric token in front of the extension: `photo.png` becomes
/// `photo[1712345678901].png`.
///
/// The token seeds from the current wall-clock milliseconds and increments
/// on every call, so renames within one session never repeat regardless of
/// clock resolution. Names created by other sessions in the meantime can
/// still collide; the server re-validates on write.
#[derive(Debug)]
pub struct UniqueNameGenerator {
    next_token: AtomicU64,
}

impl UniqueNameGenerator {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);

        Self {
            next_token: AtomicU64::new(seed),
        }
    }

    /// Returns `name` with a fresh token in front of the extension; names
    /// without an extension get the token appended instead.
    pub fn make_unique(&self, name: &str) -> String {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        match split_extension(name) {
            (base, Some(extension)) => format!("{base}[{token}].{extension}"),
            (base, None) => format!("{base}[{token}]"),
        }
    }
}

impl Default for UniqueNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits on the last dot. A dot in the leading position (dotfiles) does
/// not count as an extension separator.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(position) => (&name[..position], Some(&name[position + 1..])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(unique: &str, prefix: &str, suffix: &str) -> u64 {
        let inner = unique
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .unwrap();
        inner.parse().unwrap()
    }

    #[test]
    fn test_token_lands_before_the_extension() {
        let namer = UniqueNameGenerator::new();
        let unique = namer.make_unique("photo.png");
        token_of(&unique, "photo[", "].png");
    }

    #[test]
    fn test_only_the_last_extension_moves() {
        let namer = UniqueNameGenerator::new();
        let unique = namer.make_unique("archive.tar.gz");
        token_of(&unique, "archive.tar[", "].gz");
    }

    #[test]
    fn test_no_extension_appends_the_token() {
        let namer = UniqueNameGenerator::new();
        let unique = namer.make_unique("README");
        token_of(&unique, "README[", "]");
        assert!(!unique.contains('.'));
    }

    #[test]
    fn test_dotfiles_keep_their_leading_dot_intact() {
        let namer = UniqueNameGenerator::new();
        let unique = namer.make_unique(".env");
        token_of(&unique, ".env[", "]");
    }

    #[test]
    fn test_tokens_increase_within_a_session() {
        let namer = UniqueNameGenerator::new();
        let first = token_of(&namer.make_unique("a.txt"), "a[", "].txt");
        let second = token_of(&namer.make_unique("a.txt"), "a[", "].txt");
        let third = token_of(&namer.make_unique("b"), "b[", "]");
        assert_eq!(second, first + 1);
        assert_eq!(third, second + 1);
    }

    #[test]
    fn test_split_extension_edge_cases() {
        assert_eq!(split_extension("a.b"), ("a", Some("b")));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing", Some("")));
    }
}
