//! Ordinal suffixes of managed channel names.
//!
//! A managed channel is named `"{prefix} {n}"`. The ordinal `n` orders the
//! channels at seed time and names the next channel when the tail fills.

/// The numeric suffix parsed from a channel's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    /// The name ended in an integer.
    Parsed(i64),
    /// The remainder after the prefix was not an integer.
    Malformed,
}

impl Ordinal {
    /// Parse the ordinal of `name` relative to `prefix`.
    ///
    /// Strips `prefix` plus one separating space, then parses what is left as a
    /// signed integer. A name that lacks the prefix is parsed whole.
    pub fn parse(name: &str, prefix: &str) -> Self {
        let rest = name
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix(' '))
            .unwrap_or(name);

        match rest.parse::<i64>() {
            Ok(n) => Ordinal::Parsed(n),
            Err(_) => Ordinal::Malformed,
        }
    }

    /// Key used for ordering. Malformed names sort as 0.
    pub fn sort_key(self) -> i64 {
        match self {
            Ordinal::Parsed(n) => n,
            Ordinal::Malformed => 0,
        }
    }

    /// Whether the name carried a usable suffix.
    pub fn is_parsed(self) -> bool {
        matches!(self, Ordinal::Parsed(_))
    }
}

/// Display name for the channel at 1-based ordinal `n`.
pub fn channel_name(prefix: &str, n: usize) -> String {
    format!("{} {}", prefix, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffix_after_prefix() {
        assert_eq!(Ordinal::parse("Voice 3", "Voice"), Ordinal::Parsed(3));
        assert_eq!(Ordinal::parse("Voice 12", "Voice"), Ordinal::Parsed(12));
    }

    #[test]
    fn accepts_signed_suffix() {
        assert_eq!(Ordinal::parse("Voice +4", "Voice"), Ordinal::Parsed(4));
        assert_eq!(Ordinal::parse("Voice -2", "Voice"), Ordinal::Parsed(-2));
    }

    #[test]
    fn malformed_suffix_sorts_first() {
        let ord = Ordinal::parse("Voice lounge", "Voice");
        assert_eq!(ord, Ordinal::Malformed);
        assert_eq!(ord.sort_key(), 0);
        assert!(!ord.is_parsed());
    }

    #[test]
    fn name_without_prefix_is_parsed_whole() {
        assert_eq!(Ordinal::parse("42", "Voice"), Ordinal::Parsed(42));
        assert_eq!(Ordinal::parse("Voice", "Voice"), Ordinal::Malformed);
        assert_eq!(Ordinal::parse("Music 2", "Voice"), Ordinal::Malformed);
    }

    #[test]
    fn prefix_needs_separating_space() {
        assert_eq!(Ordinal::parse("Voice2", "Voice"), Ordinal::Malformed);
    }
}
