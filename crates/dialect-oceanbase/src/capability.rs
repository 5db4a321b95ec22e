use oblink_core::{Capability, CapabilitySet, Version, parse_server_version};

const JSON_MINIMUM_VERSION: Version = Version::new(5, 7, 8);

/// Answers that hold for every server; `None` when the server version decides.
pub fn static_support(capability: Capability) -> Option<bool> {
    match capability {
        Capability::Json => None,
        Capability::Comments
        | Capability::CommentsInCreate
        | Capability::Savepoints
        | Capability::AdvisoryLocks => Some(true),
    }
}

pub fn resolve_capabilities(full_version: &str) -> CapabilitySet {
    let json = !is_mariadb(full_version)
        && parse_server_version(full_version).is_some_and(|version| version >= JSON_MINIMUM_VERSION);
    let fixed = |capability| static_support(capability).unwrap_or(false);

    CapabilitySet {
        json,
        comments: fixed(Capability::Comments),
        comments_in_create: fixed(Capability::CommentsInCreate),
        savepoints: fixed(Capability::Savepoints),
        advisory_locks: fixed(Capability::AdvisoryLocks),
    }
}

pub fn is_mariadb(full_version: &str) -> bool {
    full_version.to_ascii_lowercase().contains("mariadb")
}

/// OceanBase has no `GET_LOCK`; the lock is reported as held without asking
/// the server, so concurrent holders are NOT excluded.
pub fn get_advisory_lock(_lock_name: &str, _timeout_seconds: i64) -> bool {
    true
}

/// Counterpart of [`get_advisory_lock`]; always reports a release.
pub fn release_advisory_lock(_lock_name: &str) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use oblink_core::Capability;

    use super::{get_advisory_lock, release_advisory_lock, resolve_capabilities, static_support};

    #[test]
    fn json_requires_5_7_8_and_a_non_mariadb_server() {
        assert!(resolve_capabilities("5.7.25-OceanBase_CE-v4.2.1.0").json);
        assert!(resolve_capabilities("5.7.8").json);
        assert!(!resolve_capabilities("5.7.7-OceanBase-v2.2.77").json);
        assert!(!resolve_capabilities("10.6.12-MariaDB").json);
        assert!(!resolve_capabilities("unknown").json);
    }

    #[test]
    fn static_capabilities_are_always_on() {
        let capabilities = resolve_capabilities("5.6.25");

        for capability in [
            Capability::Comments,
            Capability::CommentsInCreate,
            Capability::Savepoints,
            Capability::AdvisoryLocks,
        ] {
            assert!(capabilities.supports(capability), "{capability:?}");
        }
        assert!(!capabilities.supports(Capability::Json));
    }

    #[test]
    fn only_json_depends_on_the_server() {
        assert_eq!(static_support(Capability::Json), None);
        assert_eq!(static_support(Capability::Savepoints), Some(true));
        assert_eq!(static_support(Capability::AdvisoryLocks), Some(true));
    }

    #[test]
    fn advisory_locks_succeed_for_any_name_and_timeout() {
        for timeout in [-1, 0, 30, i64::MAX] {
            assert!(get_advisory_lock("migrations", timeout));
            assert!(get_advisory_lock("", timeout));
        }
        assert!(release_advisory_lock("migrations"));
        assert!(release_advisory_lock("never-acquired"));
    }
}
