// Input validators: small pure checks that gate every command before any
// file or network work happens. The patterns are compiled once and matched
// with the `regex` crate, which runs in linear time on its input.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i-u)^https?://([a-z0-9-]+\.)+[a-z]{2,}(:[0-9]+)?(/[-a-z0-9@:%_+.~#?&/=]*)?$",
    )
    .expect("URL pattern is valid")
});

static EXPIRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+[dhmy]|never)$").expect("expiry pattern is valid")
});

/// Returns true when `url` is an absolute http(s) URL with a dotted host
/// and a top-level label of at least two letters.
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Returns true for non-empty strings made only of ASCII letters and digits.
pub fn is_alphabet_numeric(sequence: &str) -> bool {
    !sequence.is_empty() && sequence.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Returns true for non-empty strings made only of ASCII digits.
pub fn is_number(sequence: &str) -> bool {
    !sequence.is_empty() && sequence.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true for `never` or a count followed by one unit letter
/// (`d`ays, `h`ours, `m`onths, `y`ears), e.g. `12h`.
pub fn is_expiry(expiry: &str) -> bool {
    EXPIRY_PATTERN.is_match(expiry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_urls() {
        for url in [
            "https://www.google.com",
            "http://www.google.com",
            "https://google.com",
            "https://google.com/test",
            "https://google.com/test?query=1",
            "https://google.com/test#hash",
            "https://sub.domain-name.example.org:8443/a/b?c=d&e=f",
            "HTTPS://GOOGLE.COM",
        ] {
            assert!(is_valid_url(url), "{url} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in [
            "ftp://google.com",
            "https://google",
            "google.com",
            "http://",
            "https://",
            "",
            "https://google.com/with space",
            "https://goo_gle.com",
        ] {
            assert!(!is_valid_url(url), "{url} should be rejected");
        }
    }

    #[test]
    fn long_hostile_input_is_rejected() {
        let hostile = format!("https://{}!", "a.".repeat(50_000));
        assert!(!is_valid_url(&hostile));
    }

    #[test]
    fn number_requires_only_digits() {
        assert!(is_number("1234567890"));
        assert!(!is_number("1234567890a"));
        assert!(!is_number("1234567890.5"));
        assert!(!is_number("1234567890-"));
        assert!(!is_number(""));
    }

    #[test]
    fn alphanumeric_rejects_symbols_and_empty() {
        assert!(is_alphabet_numeric("1234567890"));
        assert!(is_alphabet_numeric("1234567890a"));
        assert!(is_alphabet_numeric("abcXYZ"));
        assert!(!is_alphabet_numeric("1234567890.5"));
        assert!(!is_alphabet_numeric("1234567890-"));
        assert!(!is_alphabet_numeric("abc-123"));
        assert!(!is_alphabet_numeric("é1"));
        assert!(!is_alphabet_numeric(""));
    }

    #[test]
    fn expiry_accepts_single_unit_or_never() {
        for expiry in ["1d", "1h", "12h", "3m", "10y", "never"] {
            assert!(is_expiry(expiry), "{expiry} should be accepted");
        }
    }

    #[test]
    fn expiry_rejects_compound_and_unknown_units() {
        for expiry in ["1d1h", "1d1h1m", "1d1h1m1s", "", "d", "5s", "5", "Never", "5D"] {
            assert!(!is_expiry(expiry), "{expiry} should be rejected");
        }
    }
}
