//! Static table of directory object-type identifiers.
//!
//! Object ACEs narrow their mask to one extended right, validated write, property, property
//! set or child class, named by a GUID. The GUIDs below are fixed by the Active Directory
//! schema and identical in every forest.

use uguid::{guid, Guid};

use self::ObjectTypeKind::{Class, ExtendedRight, Property, PropertySet, ValidatedWrite};

/// What an object-type GUID denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectTypeKind {
    /// A control access right, used with `CONTROL_ACCESS`
    ExtendedRight,
    /// A validated write, used with `SELF_WRITE`
    ValidatedWrite,
    /// A group of properties, used with read/write property
    PropertySet,
    /// A single attribute, used with read/write property
    Property,
    /// A schema class, used with create/delete child
    Class,
}

impl std::fmt::Display for ObjectTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectTypeKind::ExtendedRight => write!(f, "Extended Right"),
            ObjectTypeKind::ValidatedWrite => write!(f, "Validated Write"),
            ObjectTypeKind::PropertySet => write!(f, "Property Set"),
            ObjectTypeKind::Property => write!(f, "Property"),
            ObjectTypeKind::Class => write!(f, "Class"),
        }
    }
}

/// A known object-type GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectType {
    /// Schema GUID
    pub guid: Guid,
    /// Display name as used by the directory schema
    pub name: &'static str,
    /// What the GUID denotes
    pub kind: ObjectTypeKind,
    /// Whether granting this right or write access to this attribute allows takeover,
    /// credential theft or replication of secrets
    pub sensitive: bool,
}

const fn entry(guid: Guid, name: &'static str, kind: ObjectTypeKind, sensitive: bool) -> ObjectType {
    ObjectType {
        guid,
        name,
        kind,
        sensitive,
    }
}

/// Every object-type GUID this crate can name.
#[rustfmt::skip]
pub static OBJECT_TYPES: &[ObjectType] = &[
    // Extended rights
    entry(guid!("00299570-246d-11d0-a768-00aa006e0529"), "User-Force-Change-Password", ExtendedRight, true),
    entry(guid!("ab721a53-1e2f-11d0-9819-00aa0040529b"), "User-Change-Password", ExtendedRight, false),
    entry(guid!("ab721a54-1e2f-11d0-9819-00aa0040529b"), "Send-As", ExtendedRight, true),
    entry(guid!("ab721a56-1e2f-11d0-9819-00aa0040529b"), "Receive-As", ExtendedRight, false),
    entry(guid!("1131f6aa-9c07-11d1-f79f-00c04fc2dcd2"), "DS-Replication-Get-Changes", ExtendedRight, true),
    entry(guid!("1131f6ad-9c07-11d1-f79f-00c04fc2dcd2"), "DS-Replication-Get-Changes-All", ExtendedRight, true),
    entry(guid!("89e95b76-444d-4c62-991a-0facbeda640c"), "DS-Replication-Get-Changes-In-Filtered-Set", ExtendedRight, true),
    entry(guid!("1131f6ab-9c07-11d1-f79f-00c04fc2dcd2"), "DS-Replication-Synchronize", ExtendedRight, false),
    entry(guid!("1131f6ac-9c07-11d1-f79f-00c04fc2dcd2"), "DS-Replication-Manage-Topology", ExtendedRight, false),
    entry(guid!("9923a32a-3607-11d2-b9be-0000f87a36b2"), "DS-Install-Replica", ExtendedRight, false),
    entry(guid!("ccc2dc7d-a6ad-4a7a-8846-c04e3cc53501"), "Unexpire-Password", ExtendedRight, false),
    entry(guid!("280f369c-67c7-438e-ae98-1d46f3c6f541"), "Update-Password-Not-Required-Bit", ExtendedRight, false),
    entry(guid!("05c74c5e-4deb-43b4-bd9f-86664c2a7fd5"), "Enable-Per-User-Reversibly-Encrypted-Password", ExtendedRight, false),
    entry(guid!("a1990816-4298-11d1-ade2-00c04fd8d5cd"), "Open-Address-Book", ExtendedRight, false),
    entry(guid!("0e10c968-78fb-11d2-90d4-00c04f79dc55"), "Certificate-Enrollment", ExtendedRight, false),
    entry(guid!("a05b8cc2-17bc-4802-a710-e7c15ab866a2"), "Certificate-AutoEnrollment", ExtendedRight, false),
    entry(guid!("edacfd8f-ffb3-11d1-b41d-00a0c968f939"), "Apply-Group-Policy", ExtendedRight, false),
    entry(guid!("68b1d179-0d15-4d4f-ab71-46152e79a7bc"), "Allowed-To-Authenticate", ExtendedRight, false),
    entry(guid!("91d67418-0135-4acc-8d79-c08e857cfbec"), "SAM-Enumerate-Entire-Domain", ExtendedRight, false),
    entry(guid!("45ec5156-db7e-47bb-b53f-dbeb2d03c40f"), "Reanimate-Tombstones", ExtendedRight, false),
    entry(guid!("ba33815a-4f93-4c76-87f3-57574bff8109"), "Migrate-SID-History", ExtendedRight, true),
    entry(guid!("4125c71f-7fac-4ff0-bcb7-f09a41325286"), "DS-Set-Owner", ExtendedRight, true),
    // Validated writes
    entry(guid!("f3a64788-5306-11d1-a9c5-0000f80367c1"), "Validated-SPN", ValidatedWrite, true),
    entry(guid!("72e39547-7b18-11d1-adef-00c04fd8d5cd"), "Validated-DNS-Host-Name", ValidatedWrite, false),
    entry(guid!("80863791-dbe9-4eb8-837e-7f0ab55d9ac7"), "Validated-MS-DS-Additional-DNS-Host-Name", ValidatedWrite, false),
    entry(guid!("d31a8757-2447-4545-8081-3bb610cacbf2"), "Validated-MS-DS-Behavior-Version", ValidatedWrite, false),
    // Property sets
    entry(guid!("4c164200-20c0-11d0-a768-00aa006e0529"), "User-Account-Restrictions", PropertySet, true),
    entry(guid!("5f202010-79a5-11d0-9020-00c04fc2d4cf"), "User-Logon", PropertySet, false),
    entry(guid!("59ba2f42-79a2-11d0-9020-00c04fc2d3cf"), "General-Information", PropertySet, false),
    entry(guid!("bc0ac240-79a9-11d0-9020-00c04fc2d4cf"), "Membership", PropertySet, true),
    entry(guid!("e48d0154-bcf8-11d1-8702-00c04fb96050"), "Public-Information", PropertySet, false),
    entry(guid!("77b5b886-944a-11d1-aebd-0000f80367c1"), "Personal-Information", PropertySet, false),
    entry(guid!("e45795b2-9455-11d1-aebd-0000f80367c1"), "Email-Information", PropertySet, false),
    entry(guid!("037088f8-0ae1-11d2-b422-00a0c968f939"), "RAS-Information", PropertySet, false),
    entry(guid!("91e647de-d96f-4b70-9557-d63ff4f3ccd8"), "Private-Information", PropertySet, false),
    entry(guid!("5805bc62-bdc9-4428-a5e2-856a0f4c185e"), "Terminal-Server-License-Server", PropertySet, false),
    entry(guid!("b8119fd0-04f6-4762-ab7a-4986c76b3f9a"), "Domain-Other-Parameters", PropertySet, false),
    entry(guid!("c7407360-20bf-11d0-a768-00aa006e0529"), "Domain-Password", PropertySet, false),
    // Properties
    entry(guid!("bf9679c0-0de6-11d0-a285-00aa003049e2"), "member", Property, true),
    entry(guid!("3f78c3e5-f79a-46bd-a0b8-9d18116ddc79"), "msDS-AllowedToActOnBehalfOfOtherIdentity", Property, true),
    entry(guid!("800d94d7-b7a1-42a1-b14d-7cae1423d07f"), "msDS-AllowedToDelegateTo", Property, true),
    entry(guid!("5b47d60f-6090-40b2-9f37-2a4de88f3063"), "msDS-KeyCredentialLink", Property, true),
    entry(guid!("888eedd6-ce04-df40-b462-b8a50e41ba38"), "msDS-GroupMSAMembership", Property, true),
    entry(guid!("e362ed86-b728-0842-b27d-2dea7a9df218"), "msDS-ManagedPassword", Property, true),
    entry(guid!("00fbf30c-91fe-11d1-aebc-0000f80367c1"), "altSecurityIdentities", Property, true),
    entry(guid!("bf967a68-0de6-11d0-a285-00aa003049e2"), "userAccountControl", Property, true),
    entry(guid!("bf9679e1-0de6-11d0-a285-00aa003049e2"), "unicodePwd", Property, true),
    entry(guid!("bf9679a8-0de6-11d0-a285-00aa003049e2"), "scriptPath", Property, true),
    entry(guid!("f30e3bbe-9ff0-11d1-b603-0000f80367c1"), "gPLink", Property, true),
    entry(guid!("f30e3bbf-9ff0-11d1-b603-0000f80367c1"), "gPOptions", Property, false),
    entry(guid!("17eb4278-d167-11d0-b002-0000f80367c1"), "sIDHistory", Property, true),
    entry(guid!("bf967a00-0de6-11d0-a285-00aa003049e2"), "primaryGroupID", Property, false),
    entry(guid!("bf967a0a-0de6-11d0-a285-00aa003049e2"), "pwdLastSet", Property, false),
    entry(guid!("28630ebb-41d5-11d1-a9c1-0000f80367c1"), "userPrincipalName", Property, false),
    entry(guid!("20119867-1d04-4ab7-9371-cfc3d5df0afd"), "msDS-SupportedEncryptionTypes", Property, false),
    entry(guid!("bf967950-0de6-11d0-a285-00aa003049e2"), "description", Property, false),
    entry(guid!("bf967953-0de6-11d0-a285-00aa003049e2"), "displayName", Property, false),
    // Classes
    entry(guid!("bf967aba-0de6-11d0-a285-00aa003049e2"), "user", Class, false),
    entry(guid!("bf967a86-0de6-11d0-a285-00aa003049e2"), "computer", Class, false),
    entry(guid!("bf967a9c-0de6-11d0-a285-00aa003049e2"), "group", Class, false),
    entry(guid!("bf967aa5-0de6-11d0-a285-00aa003049e2"), "organizationalUnit", Class, false),
    entry(guid!("bf967a8b-0de6-11d0-a285-00aa003049e2"), "container", Class, false),
    entry(guid!("19195a5b-6da0-11d0-afd3-00c04fd930c9"), "domainDNS", Class, false),
    entry(guid!("4828cc14-1437-45bc-9b07-ad6f015e5f28"), "inetOrgPerson", Class, false),
    entry(guid!("5cb41ed0-0e4c-11d0-a286-00aa003049e2"), "contact", Class, false),
    entry(guid!("f30e3bc2-9ff0-11d1-b603-0000f80367c1"), "groupPolicyContainer", Class, false),
    entry(guid!("7b8b558a-93a5-4af7-adca-e017e67f1057"), "msDS-GroupManagedServiceAccount", Class, false),
    entry(guid!("ce206244-5827-4a86-ba1c-1c0c386c1b64"), "msDS-ManagedServiceAccount", Class, false),
];

/// Looks up an object-type GUID.
///
/// # Examples
///
/// ```rust
/// use sdscope::rights::{lookup, ObjectTypeKind};
/// use uguid::guid;
///
/// let right = lookup(&guid!("1131f6ad-9c07-11d1-f79f-00c04fc2dcd2")).unwrap();
/// assert_eq!(right.name, "DS-Replication-Get-Changes-All");
/// assert_eq!(right.kind, ObjectTypeKind::ExtendedRight);
/// ```
#[must_use]
pub fn lookup(guid: &Guid) -> Option<&'static ObjectType> {
    OBJECT_TYPES.iter().find(|entry| entry.guid == *guid)
}

/// Looks up an object type by its schema name, ignoring ASCII case.
#[must_use]
pub fn lookup_by_name(name: &str) -> Option<&'static ObjectType> {
    OBJECT_TYPES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_unique_guids() {
        let unique: HashSet<_> = OBJECT_TYPES.iter().map(|e| e.guid).collect();
        assert_eq!(unique.len(), OBJECT_TYPES.len());

        let names: HashSet<_> = OBJECT_TYPES.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), OBJECT_TYPES.len());
    }

    #[test]
    fn lookups() {
        let force = lookup(&guid!("00299570-246d-11d0-a768-00aa006e0529")).unwrap();
        assert_eq!(force.name, "User-Force-Change-Password");
        assert!(force.sensitive);

        let rbcd = lookup_by_name("MSDS-ALLOWEDTOACTONBEHALFOFOTHERIDENTITY").unwrap();
        assert_eq!(rbcd.guid, guid!("3f78c3e5-f79a-46bd-a0b8-9d18116ddc79"));
        assert_eq!(rbcd.kind, ObjectTypeKind::Property);

        assert!(lookup(&Guid::ZERO).is_none());
        assert!(lookup_by_name("no-such-right").is_none());
    }
}
