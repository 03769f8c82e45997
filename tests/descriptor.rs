//! Integration tests for decoding and encoding complete security descriptors.
//!
//! Fixtures are built with the public encoders or written out byte by byte, the way a directory
//! returns them for `nTSecurityDescriptor` with the SD flags control.

use fixtures::*;
use sdscope::{
    descriptor::{BasicAce, ObjectAce},
    prelude::*,
    rights::lookup,
};
use uguid::guid;

mod fixtures {
    use sdscope::{prelude::*, Result};

    pub fn sid(text: &str) -> SecurityIdentifier {
        text.parse().unwrap()
    }

    pub fn allow(mask: u32, trustee: &str) -> AccessControlEntry {
        AccessControlEntry::Allowed(sdscope::descriptor::BasicAce {
            flags: AceFlags::empty(),
            mask: AccessMask::from_bits_retain(mask),
            trustee: sid(trustee),
        })
    }

    pub fn descriptor(control: u16, dacl: Option<Vec<AccessControlEntry>>) -> SecurityDescriptor {
        SecurityDescriptor {
            revision: 1,
            resource_manager_control: 0,
            control: ControlFlags::from_bits_retain(control),
            owner: Some(sid("S-1-5-21-3623811015-3361044348-30300820-512")),
            group: Some(sid("S-1-5-21-3623811015-3361044348-30300820-513")),
            sacl: None,
            dacl: dacl.map(AccessControlList::new),
        }
    }

    pub fn encode(descriptor: &SecurityDescriptor) -> Result<Vec<u8>> {
        descriptor.to_bytes()
    }
}

#[test]
fn domain_sid_decodes() -> sdscope::Result<()> {
    let bytes = [
        0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, // revision, count, authority 5
        0x15, 0x00, 0x00, 0x00, // 21
        0xC7, 0x6B, 0x9F, 0x06, // 111111111
        0x8E, 0xD7, 0x3E, 0x0D, // 222222222
        0x55, 0x43, 0xDE, 0x13, // 333333333
        0xF4, 0x01, 0x00, 0x00, // 500
    ];

    let sid = SecurityIdentifier::from_bytes(&bytes)?;
    assert_eq!(sid.revision(), 1);
    assert_eq!(sid.authority(), 5);
    assert_eq!(sid.sub_authorities().len(), 5);
    assert_eq!(sid.rid(), Some(500));
    assert_eq!(sid.to_string(), "S-1-5-21-111111111-222222222-333333333-500");
    assert_eq!(sid.to_bytes()?, bytes);
    assert_eq!(
        "S-1-5-21-111111111-222222222-333333333-500".parse::<SecurityIdentifier>()?,
        sid
    );
    Ok(())
}

#[test]
fn sid_bytes_survive_decoding() -> sdscope::Result<()> {
    for text in [
        "S-1-0-0",
        "S-1-1-0",
        "S-1-5-18",
        "S-1-5-32-544",
        "S-1-16-12288",
        "S-1-0x123456789ABC-1-2-3",
        "S-1-5-21-1-2-3-4-5-6-7-8-9-10-11-12-13-14",
    ] {
        let bytes = sid(text).to_bytes()?;
        let decoded = SecurityIdentifier::from_bytes(&bytes)?;
        assert_eq!(decoded.to_bytes()?, bytes, "{}", text);
        assert_eq!(decoded.to_string(), text);
    }

    assert!(matches!(
        "S-1-5-21-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15".parse::<SecurityIdentifier>(),
        Err(Error::Malformed { .. })
    ));
    Ok(())
}

#[test]
fn too_many_sub_authorities() {
    let mut bytes = vec![0x01, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05];
    bytes.extend(std::iter::repeat(0u8).take(16 * 4));
    assert!(matches!(
        SecurityIdentifier::from_bytes(&bytes),
        Err(Error::InvalidSid { offset: 0, .. })
    ));
}

#[test]
fn descriptor_round_trip() -> sdscope::Result<()> {
    let mut sd = descriptor(
        0x8C14,
        Some(vec![
            AccessControlEntry::Denied(BasicAce {
                flags: AceFlags::empty(),
                mask: AccessMask::WRITE_OWNER,
                trustee: sid("S-1-1-0"),
            }),
            allow(0x000F_01FF, "S-1-5-21-3623811015-3361044348-30300820-512"),
            AccessControlEntry::AllowedObject(ObjectAce {
                flags: AceFlags::CONTAINER_INHERIT | AceFlags::INHERITED,
                mask: AccessMask::CONTROL_ACCESS,
                object_type: Some(guid!("1131f6aa-9c07-11d1-f79f-00c04fc2dcd2")),
                inherited_object_type: None,
                trustee: sid("S-1-5-21-3623811015-3361044348-30300820-1105"),
                reserved_flags: 0,
            }),
        ]),
    );
    sd.sacl = Some(AccessControlList::new(vec![]));

    let bytes = encode(&sd)?;
    let decoded = SecurityDescriptor::decode(&bytes)?;

    assert_eq!(decoded.value, sd);
    assert!(decoded.diagnostics.is_empty());
    assert_eq!(decoded.value.to_bytes()?, bytes);
    assert_eq!(decoded.value.dacl.as_ref().map(|acl| acl.revision), Some(4));
    Ok(())
}

#[test]
fn decoding_is_idempotent() -> sdscope::Result<()> {
    let bytes = encode(&descriptor(0x8004, Some(vec![allow(0x10, "S-1-5-11")])))?;
    let first = SecurityDescriptor::decode(&bytes)?;
    let second = SecurityDescriptor::decode(&bytes)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn dacl_flag_without_offset_is_a_diagnostic() -> sdscope::Result<()> {
    let bytes = encode(&descriptor(0x8004, None))?;
    let decoded = SecurityDescriptor::decode(&bytes)?;

    assert!(decoded.value.dacl.is_none());
    assert!(decoded.value.owner.is_some());
    assert!(decoded.has_warnings());
    assert_eq!(decoded.diagnostics[0].category, DiagnosticCategory::Descriptor);
    Ok(())
}

#[test]
fn empty_and_missing_dacl_differ() -> sdscope::Result<()> {
    let missing = SecurityDescriptor::decode(&encode(&descriptor(0x8000, None))?)?.value;
    let empty = SecurityDescriptor::decode(&encode(&descriptor(0x8004, Some(vec![])))?)?.value;

    assert!(missing.dacl.is_none());
    assert_eq!(empty.dacl.map(|acl| acl.is_empty()), Some(true));
    Ok(())
}

#[test]
fn acl_count_past_declared_size() -> sdscope::Result<()> {
    let mut bytes = encode(&descriptor(0x8004, Some(vec![allow(0x10, "S-1-5-11")])))?;
    // DACL starts right after the header; bump its entry count
    bytes[20 + 4] = 2;

    match SecurityDescriptor::decode(&bytes) {
        Err(Error::AclSizeMismatch { offset, declared, .. }) => {
            assert_eq!(offset, 20);
            assert_eq!(declared, 8 + 20);
        }
        other => panic!("unexpected result {:?}", other),
    }
    Ok(())
}

#[test]
fn ace_size_mismatch_aborts() -> sdscope::Result<()> {
    let mut bytes = encode(&descriptor(0x8004, Some(vec![allow(0x10, "S-1-5-11")])))?;
    // Declared ACE size 24 while the body is 20, and the ACL grown to match
    bytes[20 + 2] = 8 + 24;
    bytes[20 + 8 + 2] = 24;
    bytes.splice(48..48, [0u8; 4]);
    let owner = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) + 4;
    let group = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) + 4;
    bytes[4..8].copy_from_slice(&owner.to_le_bytes());
    bytes[8..12].copy_from_slice(&group.to_le_bytes());

    assert!(matches!(
        SecurityDescriptor::decode(&bytes),
        Err(Error::AceSizeMismatch { offset: 28, declared: 24, consumed: 20 })
    ));
    Ok(())
}

#[test]
fn truncated_input_is_located() -> sdscope::Result<()> {
    let bytes = encode(&descriptor(0x8004, Some(vec![allow(0x10, "S-1-5-11")])))?;
    for cut in 1..bytes.len() {
        let err = SecurityDescriptor::decode(&bytes[..cut]).unwrap_err();
        assert!(err.offset().is_some(), "cut at {}: {:?}", cut, err);
    }
    Ok(())
}

#[test]
fn opaque_entries_are_preserved() -> sdscope::Result<()> {
    let mut bytes = encode(&descriptor(0x8004, Some(vec![allow(0x10, "S-1-5-11")])))?;
    // Turn the entry into an ACCESS_ALLOWED_CALLBACK entry
    bytes[28] = 0x09;

    let decoded = SecurityDescriptor::decode(&bytes)?;
    let dacl = decoded.value.dacl.as_ref().unwrap();
    match dacl.iter().next() {
        Some(AccessControlEntry::Opaque(opaque)) => {
            assert_eq!(opaque.ace_type, AceType::AccessAllowedCallback);
            assert_eq!(opaque.declared_size, 20);
            assert_eq!(opaque.body.len(), 16);
        }
        other => panic!("unexpected entry {:?}", other),
    }
    assert_eq!(decoded.diagnostics.len(), 1);
    assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Info);
    assert_eq!(decoded.value.to_bytes()?, bytes);
    Ok(())
}

#[test]
fn full_control_mask() {
    let decoded = interpret(AccessMask::from_bits_retain(0x000F_01FF), None);
    assert!(decoded.value.grants(AccessRight::WriteDac));
    assert!(decoded.value.grants(AccessRight::WriteOwner));
    assert!(decoded.value.is_dangerous());
}

#[test]
fn permission_rows_name_extended_rights() -> sdscope::Result<()> {
    let changes_all = guid!("1131f6ad-9c07-11d1-f79f-00c04fc2dcd2");
    let sd = descriptor(
        0x8004,
        Some(vec![AccessControlEntry::AllowedObject(ObjectAce {
            flags: AceFlags::empty(),
            mask: AccessMask::CONTROL_ACCESS,
            object_type: Some(changes_all),
            inherited_object_type: None,
            trustee: sid("S-1-5-21-3623811015-3361044348-30300820-1105"),
            reserved_flags: 0,
        })]),
    );
    let decoded = SecurityDescriptor::decode(&encode(&sd)?)?;
    let rows = dacl_entries(&decoded.value, &WellKnownSids).value;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "Allow (Object)");
    assert_eq!(
        rows[0].object_type.as_deref(),
        lookup(&changes_all).map(|object| object.name)
    );
    assert!(rows[0].dangerous);
    assert_eq!(explicit_entries(rows).len(), 1);
    Ok(())
}

#[test]
fn strict_config_rejects_unknown_acl_revision() -> sdscope::Result<()> {
    let mut bytes = encode(&descriptor(0x8004, Some(vec![])))?;
    bytes[20] = 3;

    let lenient = SecurityDescriptor::decode(&bytes)?;
    assert!(lenient.has_warnings());

    assert!(matches!(
        SecurityDescriptor::decode_with(&bytes, &DecoderConfig::strict()),
        Err(Error::UnsupportedRevision { structure: "ACL", revision: 3, offset: 20 })
    ));
    Ok(())
}
