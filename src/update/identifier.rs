//! Group identifiers, slugs and changelog text

use crate::domain::ResolvedPackage;
use regex::Regex;
use std::sync::LazyLock;

/// Digits of the base-61 rendering; `Z` is reserved for the sign
const ALPHABET: &[u8; 61] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXY";

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());
static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// Short deterministic code for an ordered sequence of package names.
///
/// The names are concatenated and hashed with a 32-bit rolling hash
/// (`h = h * 31 + unit` over UTF-16 code units), which is then written in
/// base 61. Negative hashes are prefixed with `Z` instead of `-`.
pub fn identifier<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hash: i32 = 0;
    for name in names {
        for unit in name.as_ref().encode_utf16() {
            hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
    }
    to_base61(hash)
}

fn to_base61(value: i32) -> String {
    let mut magnitude = i64::from(value).unsigned_abs();
    let mut digits = Vec::new();

    loop {
        digits.push(ALPHABET[(magnitude % 61) as usize]);
        magnitude /= 61;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push(b'Z');
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Branch-friendly `name-version` slug, e.g. `foo_bar-1_3_0`
pub fn slug(name: &str, version: &str) -> String {
    let name = name.to_lowercase().replacen('@', "", 1);
    format!(
        "{}-{}",
        NON_WORD_RE.replace_all(&name, "_"),
        NON_DIGIT_RE.replace_all(version, "_")
    )
}

/// Markdown bullet list with one `- Bumps ...` line per package
pub fn changelog_body(packages: &[ResolvedPackage]) -> String {
    let mut body = String::new();
    for pkg in packages {
        let line = match &pkg.repository_url {
            Some(url) => format!(
                "- Bumps [{}]({}) from {} to {}\n",
                pkg.name, url, pkg.current_version, pkg.latest_version
            ),
            None => format!(
                "- Bumps {} from {} to {}\n",
                pkg.name, pkg.current_version, pkg.latest_version
            ),
        };
        body.push_str(&line);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strip_range;

    fn resolved(name: &str, current: &str, latest: &str, url: Option<&str>) -> ResolvedPackage {
        ResolvedPackage::new(
            name,
            strip_range(current).unwrap(),
            strip_range(latest).unwrap(),
            url.map(str::to_string),
        )
    }

    #[test]
    fn test_identifier_known_values() {
        assert_eq!(identifier(Vec::<&str>::new()), "0");
        // "a" hashes to 97 = 1 * 61 + 36
        assert_eq!(identifier(["a"]), "1A");
        // "ab" hashes to 97 * 31 + 98 = 3105 = 50 * 61 + 55
        assert_eq!(identifier(["ab"]), "OT");
    }

    #[test]
    fn test_identifier_concatenates_names() {
        assert_eq!(identifier(["a", "b"]), identifier(["ab"]));
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let names = ["@foo/a", "@foo/b", "left-pad"];
        assert_eq!(identifier(names), identifier(names));
        assert_ne!(identifier(["@foo/a", "@foo/b"]), identifier(["@foo/b", "@foo/a"]));
    }

    #[test]
    fn test_identifier_negative_hash_has_no_dash() {
        // "lodash" and "typescript" both hash below zero
        for id in [identifier(["lodash"]), identifier(["typescript"])] {
            assert!(id.starts_with('Z'));
            assert!(!id.contains('-'));
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_to_base61_extremes() {
        assert_eq!(to_base61(-1), "Z1");
        assert_eq!(to_base61(60), "Y");
        assert_eq!(to_base61(61), "10");
        let min = to_base61(i32::MIN);
        assert!(min.starts_with('Z'));
        assert_eq!(min.matches('Z').count(), 1);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("left-pad", "1.3.0"), "left_pad-1_3_0");
        assert_eq!(slug("@foo/a", "1.1.0"), "foo_a-1_1_0");
        assert_eq!(slug("foo", "2.0.0-beta.1"), "foo-2_0_0______1");
        assert_eq!(slug("React", "18.2.0"), "react-18_2_0");
    }

    #[test]
    fn test_changelog_body_with_url() {
        let pkgs = [resolved(
            "left-pad",
            "1.2.0",
            "1.3.0",
            Some("https://github.com/x/left-pad"),
        )];
        assert_eq!(
            changelog_body(&pkgs),
            "- Bumps [left-pad](https://github.com/x/left-pad) from 1.2.0 to 1.3.0\n"
        );
    }

    #[test]
    fn test_changelog_body_mixed() {
        let pkgs = [
            resolved("react", "^18.0.0", "18.2.0", Some("https://github.com/facebook/react")),
            resolved("@types/react", "^18.0.1", "18.2.7", None),
        ];
        assert_eq!(
            changelog_body(&pkgs),
            "- Bumps [react](https://github.com/facebook/react) from 18.0.0 to 18.2.0\n\
             - Bumps @types/react from 18.0.1 to 18.2.7\n"
        );
    }

    #[test]
    fn test_changelog_body_empty() {
        assert_eq!(changelog_body(&[]), "");
    }
}
