use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dotted-quad IPv4 address at the start of a string.
    /// Anything after the fourth group is ignored, so the first entry of a
    /// forwarded-for chain ("10.0.0.1, 10.0.0.2") or an address with a port
    /// ("10.0.0.1:8080") still yields the address.
    /// - Matches: "127.0.0.1", "10.0.0.1, 10.0.0.2", "999.1.1.1"
    /// - No match: "::1", "localhost", " 127.0.0.1", "1.2.3"
    pub static ref IPV4_PREFIX_REGEX: Regex =
        Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(value: &str) -> Option<&str> {
        IPV4_PREFIX_REGEX.find(value).map(|m| m.as_str())
    }

    #[test]
    fn test_ipv4_prefix_regex_valid() {
        assert_eq!(prefix("127.0.0.1"), Some("127.0.0.1"));
        assert_eq!(prefix("10.0.0.1, 10.0.0.2"), Some("10.0.0.1"));
        assert_eq!(prefix("10.0.0.1:8080"), Some("10.0.0.1"));
        assert_eq!(prefix("1.2.3.4567"), Some("1.2.3.456")); // trailing digit left over
        assert_eq!(prefix("999.999.999.999"), Some("999.999.999.999"));
    }

    #[test]
    fn test_ipv4_prefix_regex_invalid() {
        assert_eq!(prefix("::1"), None);
        assert_eq!(prefix("localhost"), None);
        assert_eq!(prefix(" 127.0.0.1"), None); // must start the string
        assert_eq!(prefix("1.2.3"), None);
        assert_eq!(prefix("1234.1.1.1"), None);
        assert_eq!(prefix(""), None);
    }
}
