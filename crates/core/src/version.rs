use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses the leading numeric triple of a server version string such as
/// `5.7.25-OceanBase_CE-v4.2.1.0`. Missing minor/patch components read as 0.
pub fn parse_server_version(raw: &str) -> Option<Version> {
    let mut parts = raw.split_whitespace().next()?.split('.');
    let major = parse_version_component(parts.next()?)?;
    let minor = parts.next().and_then(parse_version_component).unwrap_or(0);
    let patch = parts.next().and_then(parse_version_component).unwrap_or(0);

    Some(Version {
        major,
        minor,
        patch,
    })
}

fn parse_version_component(raw: &str) -> Option<u16> {
    let digits = raw
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

#[cfg(test)]
mod tests {
    use super::{Version, parse_server_version};

    #[test]
    fn parses_vendor_suffixed_versions() {
        assert_eq!(
            parse_server_version("5.7.25-OceanBase_CE-v4.2.1.0"),
            Some(Version::new(5, 7, 25))
        );
        assert_eq!(
            parse_server_version("10.6.12-MariaDB-log"),
            Some(Version::new(10, 6, 12))
        );
        assert_eq!(parse_server_version("8"), Some(Version::new(8, 0, 0)));
    }

    #[test]
    fn rejects_strings_without_numeric_prefix() {
        assert_eq!(parse_server_version(""), None);
        assert_eq!(parse_server_version("OceanBase"), None);
    }

    #[test]
    fn orders_component_wise() {
        assert!(Version::new(5, 7, 8) < Version::new(5, 7, 25));
        assert!(Version::new(5, 7, 8) > Version::new(5, 6, 99));
        assert_eq!(Version::new(4, 2, 1).to_string(), "4.2.1");
    }
}
