//! Names for well-known trustees and the seam for resolving all others.
//!
//! Only universal and built-in SIDs, plus the fixed relative identifiers of a domain, can be
//! named without asking a directory. Everything else is delegated to a caller supplied
//! [`TrusteeResolver`].

use crate::descriptor::SecurityIdentifier;

/// Resolves a SID to a display name.
///
/// Implemented by [`WellKnownSids`] for the static table, and by any
/// `Fn(&SecurityIdentifier) -> Option<String>` closure so callers can plug in a directory
/// lookup or a cache.
pub trait TrusteeResolver {
    /// Returns a display name for `sid`, or `None` if it is not known.
    fn resolve(&self, sid: &SecurityIdentifier) -> Option<String>;

    /// Returns a display name for `sid`, falling back to its string form.
    fn display_name(&self, sid: &SecurityIdentifier) -> String {
        self.resolve(sid).unwrap_or_else(|| sid.to_string())
    }
}

impl<F> TrusteeResolver for F
where
    F: Fn(&SecurityIdentifier) -> Option<String>,
{
    fn resolve(&self, sid: &SecurityIdentifier) -> Option<String> {
        self(sid)
    }
}

/// Universal and built-in SIDs, keyed by their string form.
static WELL_KNOWN: &[(&str, &str)] = &[
    ("S-1-0-0", "Nobody"),
    ("S-1-1-0", "Everyone"),
    ("S-1-2-0", "Local"),
    ("S-1-3-0", "Creator Owner"),
    ("S-1-3-1", "Creator Group"),
    ("S-1-5-7", "Anonymous Logon"),
    ("S-1-5-9", "Enterprise Domain Controllers"),
    ("S-1-5-10", "Self"),
    ("S-1-5-11", "Authenticated Users"),
    ("S-1-5-18", "SYSTEM"),
    ("S-1-5-19", "Local Service"),
    ("S-1-5-20", "Network Service"),
    ("S-1-5-32-544", "BUILTIN\\Administrators"),
    ("S-1-5-32-545", "BUILTIN\\Users"),
    ("S-1-5-32-546", "BUILTIN\\Guests"),
    ("S-1-5-32-548", "BUILTIN\\Account Operators"),
    ("S-1-5-32-549", "BUILTIN\\Server Operators"),
    ("S-1-5-32-550", "BUILTIN\\Print Operators"),
    ("S-1-5-32-551", "BUILTIN\\Backup Operators"),
    ("S-1-5-32-552", "BUILTIN\\Replicator"),
    ("S-1-5-32-554", "BUILTIN\\Pre-Windows 2000 Compatible Access"),
    ("S-1-5-32-560", "BUILTIN\\Windows Authorization Access Group"),
    ("S-1-5-32-561", "BUILTIN\\Terminal Server License Servers"),
];

/// Relative identifiers with a fixed meaning inside every domain.
static DOMAIN_RIDS: &[(u32, &str)] = &[
    (498, "Enterprise Read-only Domain Controllers"),
    (500, "Administrator"),
    (501, "Guest"),
    (502, "krbtgt"),
    (512, "Domain Admins"),
    (513, "Domain Users"),
    (514, "Domain Guests"),
    (515, "Domain Computers"),
    (516, "Domain Controllers"),
    (517, "Cert Publishers"),
    (518, "Schema Admins"),
    (519, "Enterprise Admins"),
    (520, "Group Policy Creator Owners"),
    (521, "Read-only Domain Controllers"),
    (522, "Cloneable Domain Controllers"),
    (525, "Protected Users"),
    (526, "Key Admins"),
    (527, "Enterprise Key Admins"),
    (553, "RAS and IAS Servers"),
];

/// Returns the name of a universal, built-in or fixed domain-relative SID.
///
/// # Examples
///
/// ```rust
/// use sdscope::{well_known_name, SecurityIdentifier};
///
/// let everyone: SecurityIdentifier = "S-1-1-0".parse()?;
/// assert_eq!(well_known_name(&everyone), Some("Everyone"));
///
/// let admins: SecurityIdentifier = "S-1-5-21-1-2-3-512".parse()?;
/// assert_eq!(well_known_name(&admins), Some("Domain Admins"));
/// # Ok::<(), sdscope::Error>(())
/// ```
#[must_use]
pub fn well_known_name(sid: &SecurityIdentifier) -> Option<&'static str> {
    if sid.is_domain_account() {
        let rid = sid.rid()?;
        return DOMAIN_RIDS
            .iter()
            .find(|(known, _)| *known == rid)
            .map(|(_, name)| *name);
    }

    let text = sid.to_string();
    WELL_KNOWN
        .iter()
        .find(|(known, _)| *known == text)
        .map(|(_, name)| *name)
}

/// [`TrusteeResolver`] backed only by the static well-known table.
#[derive(Debug, Default, Clone, Copy)]
pub struct WellKnownSids;

impl TrusteeResolver for WellKnownSids {
    fn resolve(&self, sid: &SecurityIdentifier) -> Option<String> {
        well_known_name(sid).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sid(text: &str) -> SecurityIdentifier {
        text.parse().unwrap()
    }

    #[test]
    fn builtin_names() {
        assert_eq!(well_known_name(&sid("S-1-5-18")), Some("SYSTEM"));
        assert_eq!(
            well_known_name(&sid("S-1-5-32-544")),
            Some("BUILTIN\\Administrators")
        );
        assert_eq!(well_known_name(&sid("S-1-5-32-999")), None);
    }

    #[test]
    fn domain_relative_names() {
        assert_eq!(
            well_known_name(&sid("S-1-5-21-111-222-333-519")),
            Some("Enterprise Admins")
        );
        assert_eq!(well_known_name(&sid("S-1-5-21-111-222-333-1105")), None);
        // Not a domain SID, so the RID table must not apply
        assert_eq!(well_known_name(&sid("S-1-5-512")), None);
    }

    #[test]
    fn resolver_fallbacks() {
        let unknown = sid("S-1-5-21-1-2-3-1105");
        assert_eq!(WellKnownSids.display_name(&unknown), "S-1-5-21-1-2-3-1105");
        assert_eq!(WellKnownSids.display_name(&sid("S-1-1-0")), "Everyone");

        let mut directory = HashMap::new();
        directory.insert(unknown.clone(), "CORP\\svc_sql".to_string());
        let lookup = |s: &SecurityIdentifier| {
            directory
                .get(s)
                .cloned()
                .or_else(|| WellKnownSids.resolve(s))
        };
        assert_eq!(lookup.display_name(&unknown), "CORP\\svc_sql");
        assert_eq!(lookup.display_name(&sid("S-1-5-11")), "Authenticated Users");
    }
}
