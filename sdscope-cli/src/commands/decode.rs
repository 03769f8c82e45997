use serde::Serialize;
use sdscope::{
    permissions::{permission_entries, PermissionEntry},
    AccessControlList, SecurityDescriptor, SecurityIdentifier, TrusteeResolver, WellKnownSids,
};

use crate::{
    app::{BlobInput, GlobalOptions},
    commands::common::{decoder_config, read_blob},
    output::{
        diagnostic_entries, print_diagnostics, print_output, Align, DiagnosticEntry, TabWriter,
    },
};

#[derive(Debug, Serialize)]
struct DecodeOutput {
    size: usize,
    revision: u8,
    control: u16,
    control_flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<TrusteeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<TrusteeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dacl: Option<AclView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sacl: Option<AclView>,
    diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Serialize)]
struct TrusteeView {
    sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AclView {
    revision: u8,
    total: usize,
    canonical: bool,
    entries: Vec<EntryView>,
}

#[derive(Debug, Serialize)]
struct EntryView {
    index: usize,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trustee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trustee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask: Option<String>,
    rights: Vec<String>,
    inherited: bool,
    inherit_only: bool,
    dangerous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inherited_object_type: Option<String>,
}

impl From<PermissionEntry> for EntryView {
    fn from(row: PermissionEntry) -> Self {
        EntryView {
            index: row.index,
            rights: row.right_names(),
            mask: row.rights.as_ref().map(|r| format!("{:#010x}", r.mask.bits())),
            kind: row.kind,
            trustee: row.trustee.as_ref().map(ToString::to_string),
            trustee_name: row.trustee_name,
            inherited: row.inherited,
            inherit_only: row.inherit_only,
            dangerous: row.dangerous,
            object_type: row.object_type,
            inherited_object_type: row.inherited_object_type,
        }
    }
}

fn trustee_view(sid: &SecurityIdentifier) -> TrusteeView {
    TrusteeView {
        sid: sid.to_string(),
        name: WellKnownSids.resolve(sid),
    }
}

fn acl_view(
    acl: &AccessControlList,
    all: bool,
    diagnostics: &mut Vec<DiagnosticEntry>,
) -> AclView {
    let rows = permission_entries(acl, &WellKnownSids);
    diagnostics.extend(diagnostic_entries(&rows.diagnostics));

    AclView {
        revision: acl.revision,
        total: acl.len(),
        canonical: acl.is_canonical(),
        entries: rows
            .value
            .into_iter()
            .filter(|row| all || !row.inherited)
            .map(EntryView::from)
            .collect(),
    }
}

pub fn run(input: &BlobInput, all: bool, opts: &GlobalOptions) -> anyhow::Result<()> {
    let data = read_blob(input)?;
    let decoded = SecurityDescriptor::decode_with(&data, &decoder_config(opts))?;
    let sd = &decoded.value;

    let mut diagnostics = diagnostic_entries(&decoded.diagnostics);
    let dacl = sd
        .dacl
        .as_ref()
        .map(|acl| acl_view(acl, all, &mut diagnostics));
    let sacl = if all {
        sd.sacl
            .as_ref()
            .map(|acl| acl_view(acl, true, &mut diagnostics))
    } else {
        None
    };

    let output = DecodeOutput {
        size: data.len(),
        revision: sd.revision,
        control: sd.control.bits(),
        control_flags: sd.control.names(),
        owner: sd.owner.as_ref().map(trustee_view),
        group: sd.group.as_ref().map(trustee_view),
        dacl,
        sacl,
        diagnostics,
    };

    print_output(&output, opts, |out| {
        println!("Security descriptor ({} bytes, revision {})", out.size, out.revision);
        println!(
            "  Control: {:#06x} [{}]",
            out.control,
            out.control_flags.join(" | ")
        );
        println!("  Owner:   {}", format_trustee(out.owner.as_ref()));
        println!("  Group:   {}", format_trustee(out.group.as_ref()));

        print_acl("DACL", out.dacl.as_ref(), all);
        if all {
            print_acl("SACL", out.sacl.as_ref(), all);
        }
        print_diagnostics(&out.diagnostics);
    })
}

fn format_trustee(trustee: Option<&TrusteeView>) -> String {
    match trustee {
        Some(TrusteeView {
            sid,
            name: Some(name),
        }) => format!("{name} ({sid})"),
        Some(TrusteeView { sid, name: None }) => sid.clone(),
        None => "<none>".to_string(),
    }
}

fn print_acl(label: &str, acl: Option<&AclView>, all: bool) {
    println!();
    let Some(acl) = acl else {
        println!("{label}: <none>");
        return;
    };

    let hidden = acl.total - acl.entries.len();
    print!("{label} (revision {}, {} entries", acl.revision, acl.total);
    if hidden > 0 && !all {
        print!(", {hidden} inherited hidden");
    }
    println!(")");
    if !acl.canonical {
        println!("  order is not canonical");
    }

    print_entries(&acl.entries);
}

fn print_entries(entries: &[EntryView]) {
    if entries.is_empty() {
        return;
    }

    let mut table = TabWriter::new(&[
        ("#", Align::Right),
        ("Kind", Align::Left),
        ("Trustee", Align::Left),
        ("Mask", Align::Right),
        ("Flags", Align::Left),
        ("Rights", Align::Left),
    ])
    .indent("  ");

    for entry in entries {
        let trustee = match (&entry.trustee_name, &entry.trustee) {
            (Some(name), _) => name.clone(),
            (None, Some(sid)) => sid.clone(),
            (None, None) => "-".to_string(),
        };

        let mut flags = Vec::new();
        if entry.dangerous {
            flags.push("!");
        }
        if entry.inherited {
            flags.push("I");
        }
        if entry.inherit_only {
            flags.push("IO");
        }

        let mut rights = entry.rights.join(", ");
        if let Some(object) = &entry.inherited_object_type {
            rights.push_str(&format!(" (applies to {object})"));
        }

        table.row(vec![
            entry.index.to_string(),
            entry.kind.clone(),
            trustee,
            entry.mask.clone().unwrap_or_default(),
            flags.join(" "),
            rights,
        ]);
    }
    table.print();
}
