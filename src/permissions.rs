//! Flattened, display-oriented rows for the entries of an ACL.
//!
//! A [`PermissionEntry`] carries everything an ACL viewer shows per entry: the entry kind,
//! the trustee and its display name, the interpreted rights and the object types an object
//! entry is narrowed to. Diagnostics from interpreting the masks are collected alongside.
//!
//! # Examples
//!
//! ```rust
//! use sdscope::{permissions, SecurityDescriptor, WellKnownSids};
//!
//! let blob = [
//!     0x01, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
//!     0x02, 0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x04, 0x00,
//!     0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x0B, 0x00, 0x00, 0x00,
//! ];
//!
//! let descriptor = SecurityDescriptor::decode(&blob)?.value;
//! let rows = permissions::dacl_entries(&descriptor, &WellKnownSids).value;
//!
//! assert_eq!(rows[0].kind, "Allow");
//! assert_eq!(rows[0].trustee_name.as_deref(), Some("Authenticated Users"));
//! assert!(rows[0].dangerous);
//! # Ok::<(), sdscope::Error>(())
//! ```

use uguid::Guid;

use crate::{
    descriptor::{
        AccessControlEntry, AccessControlList, AceType, SecurityDescriptor, SecurityIdentifier,
        TrusteeResolver,
    },
    diagnostics::{Decoded, Diagnostics},
    rights::{interpret, lookup, MaskInterpretation},
};

/// One row of an ACL view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    /// Position of the entry in its ACL
    pub index: usize,
    /// "Allow", "Deny", "Allow (Object)", "Deny (Object)" or "Type N"
    pub kind: String,
    /// The raw entry type
    pub ace_type: AceType,
    /// Trustee SID, `None` for opaque entries
    pub trustee: Option<SecurityIdentifier>,
    /// Display name of the trustee as returned by the resolver
    pub trustee_name: Option<String>,
    /// Interpreted rights, `None` for opaque entries
    pub rights: Option<MaskInterpretation>,
    /// The entry was inherited from a parent
    pub inherited: bool,
    /// The entry only applies to children
    pub inherit_only: bool,
    /// Allow entry granting rights that allow taking over the object
    pub dangerous: bool,
    /// Name or braced GUID of the object type the rights are narrowed to
    pub object_type: Option<String>,
    /// Name or braced GUID of the child class the entry is inherited by
    pub inherited_object_type: Option<String>,
}

impl PermissionEntry {
    /// Display names of the interpreted rights.
    #[must_use]
    pub fn right_names(&self) -> Vec<String> {
        self.rights
            .as_ref()
            .map(MaskInterpretation::names)
            .unwrap_or_default()
    }
}

fn kind_label(ace_type: AceType) -> String {
    match ace_type {
        AceType::AccessAllowed => "Allow".to_string(),
        AceType::AccessDenied => "Deny".to_string(),
        AceType::AccessAllowedObject => "Allow (Object)".to_string(),
        AceType::AccessDeniedObject => "Deny (Object)".to_string(),
        other => format!("Type {}", u8::from(other)),
    }
}

fn object_type_name(guid: Option<&Guid>) -> Option<String> {
    let guid = guid.filter(|guid| **guid != Guid::ZERO)?;
    Some(match lookup(guid) {
        Some(object) => object.name.to_string(),
        None => format!("{{{}}}", guid),
    })
}

fn build_row<R>(
    index: usize,
    entry: &AccessControlEntry,
    resolver: &R,
    diagnostics: &mut Diagnostics,
) -> PermissionEntry
where
    R: TrusteeResolver + ?Sized,
{
    let rights = entry.mask().map(|mask| {
        let decoded = interpret(mask, entry.object_type());
        diagnostics.extend(decoded.diagnostics);
        decoded.value
    });
    let dangerous = entry.is_allow() && rights.as_ref().is_some_and(|r| r.is_dangerous());

    PermissionEntry {
        index,
        kind: kind_label(entry.ace_type()),
        ace_type: entry.ace_type(),
        trustee: entry.trustee().cloned(),
        trustee_name: entry.trustee().map(|sid| resolver.display_name(sid)),
        rights,
        inherited: entry.is_inherited(),
        inherit_only: entry.is_inherit_only(),
        dangerous,
        object_type: object_type_name(entry.object_type()),
        inherited_object_type: object_type_name(entry.inherited_object_type()),
    }
}

/// Builds one row per entry of `acl`.
pub fn permission_entries<R>(
    acl: &AccessControlList,
    resolver: &R,
) -> Decoded<Vec<PermissionEntry>>
where
    R: TrusteeResolver + ?Sized,
{
    let mut diagnostics = Diagnostics::new();
    let rows = acl
        .iter()
        .enumerate()
        .map(|(index, entry)| build_row(index, entry, resolver, &mut diagnostics))
        .collect();

    Decoded::new(rows, diagnostics)
}

/// Builds the rows of the DACL of `descriptor`; no rows if it has no DACL.
pub fn dacl_entries<R>(
    descriptor: &SecurityDescriptor,
    resolver: &R,
) -> Decoded<Vec<PermissionEntry>>
where
    R: TrusteeResolver + ?Sized,
{
    match &descriptor.dacl {
        Some(dacl) => permission_entries(dacl, resolver),
        None => Decoded::new(Vec::new(), Diagnostics::new()),
    }
}

/// Keeps the rows that were set on the object itself, i.e. delegated permissions on an OU.
#[must_use]
pub fn explicit_entries(rows: Vec<PermissionEntry>) -> Vec<PermissionEntry> {
    rows.into_iter().filter(|row| !row.inherited).collect()
}

impl AccessControlEntry {
    /// Builds the display row of this entry at `index`, discarding interpreter diagnostics.
    pub fn to_permission_entry<R>(&self, index: usize, resolver: &R) -> PermissionEntry
    where
        R: TrusteeResolver + ?Sized,
    {
        build_row(index, self, resolver, &mut Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DecoderConfig,
        descriptor::WellKnownSids,
        diagnostics::DiagnosticSeverity,
        reader::Parser,
        test::builders::{ace_bytes, acl_bytes, object_ace_bytes, sid_bytes},
    };
    use uguid::guid;

    fn decode_acl(data: &[u8]) -> AccessControlList {
        let mut diagnostics = Diagnostics::new();
        let mut parser = Parser::new(data);
        AccessControlList::decode(&mut parser, &DecoderConfig::lenient(), &mut diagnostics).unwrap()
    }

    #[test]
    fn rows_for_every_kind() {
        let reset = guid!("00299570-246d-11d0-a768-00aa006e0529");
        let helpdesk = sid_bytes(5, &[21, 1, 2, 3, 1109]);
        let data = acl_bytes(
            4,
            &[
                ace_bytes(0x01, 0x00, 0x0004_0000, &sid_bytes(1, &[0])),
                ace_bytes(0x00, 0x12, 0x0002_0094, &sid_bytes(5, &[11])),
                object_ace_bytes(0x05, 0x00, 0x100, Some(reset), None, &helpdesk),
                object_ace_bytes(0x06, 0x00, 0x20, None, None, &sid_bytes(5, &[10])),
                ace_bytes(0x11, 0x00, 0x1, &sid_bytes(16, &[4096])),
            ],
        );
        let acl = decode_acl(&data);
        let rows = permission_entries(&acl, &WellKnownSids).value;

        let kinds: Vec<&str> = rows.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, ["Deny", "Allow", "Allow (Object)", "Deny (Object)", "Type 17"]);

        assert_eq!(rows[0].trustee_name.as_deref(), Some("Everyone"));
        assert!(!rows[0].dangerous);
        assert!(rows[1].inherited);
        assert!(!rows[1].dangerous);

        assert_eq!(rows[2].object_type.as_deref(), Some("User-Force-Change-Password"));
        assert_eq!(rows[2].trustee_name.as_deref(), Some("S-1-5-21-1-2-3-1109"));
        assert!(rows[2].dangerous);
        assert_eq!(
            rows[2].right_names(),
            ["Extended Right: User-Force-Change-Password"]
        );

        // Write property on a deny entry is not a grant
        assert!(!rows[3].dangerous);

        assert!(rows[4].trustee.is_none());
        assert!(rows[4].rights.is_none());
        assert!(rows[4].right_names().is_empty());
    }

    #[test]
    fn custom_resolver() {
        let web01 = sid_bytes(5, &[21, 1, 2, 3, 1105]);
        let acl = decode_acl(&acl_bytes(2, &[ace_bytes(0x00, 0x00, 0x10, &web01)]));
        let resolver = |sid: &SecurityIdentifier| {
            (sid.rid() == Some(1105)).then(|| "CORP\\web01$".to_string())
        };

        let rows = permission_entries(&acl, &resolver).value;
        assert_eq!(rows[0].trustee_name.as_deref(), Some("CORP\\web01$"));
    }

    #[test]
    fn unknown_object_type() {
        let unknown = guid!("01234567-89ab-cdef-0123-456789abcdef");
        let data = acl_bytes(
            4,
            &[object_ace_bytes(
                0x05,
                0x00,
                0x20,
                Some(unknown),
                Some(unknown),
                &sid_bytes(5, &[10]),
            )],
        );
        let acl = decode_acl(&data);
        let decoded = permission_entries(&acl, &WellKnownSids);

        assert_eq!(
            decoded.value[0].object_type.as_deref(),
            Some("{01234567-89ab-cdef-0123-456789abcdef}")
        );
        assert_eq!(decoded.value[0].inherited_object_type, decoded.value[0].object_type);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn explicit_only() {
        let data = acl_bytes(
            2,
            &[
                ace_bytes(0x00, 0x00, 0x10, &sid_bytes(5, &[11])),
                ace_bytes(0x00, 0x10, 0x10, &sid_bytes(5, &[18])),
                ace_bytes(0x00, 0x02, 0x10, &sid_bytes(5, &[10])),
            ],
        );
        let acl = decode_acl(&data);
        let rows = explicit_entries(permission_entries(&acl, &WellKnownSids).value);

        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn single_entry_row() {
        let acl = decode_acl(&acl_bytes(
            2,
            &[ace_bytes(0x00, 0x00, 0x0004_0000, &sid_bytes(5, &[18]))],
        ));
        let row = acl.iter().next().unwrap().to_permission_entry(7, &WellKnownSids);

        assert_eq!(row.index, 7);
        assert_eq!(row.trustee_name.as_deref(), Some("SYSTEM"));
        assert!(row.dangerous);
    }
}
