use anyhow::bail;
use serde::Serialize;
use sdscope::rights::{interpret, lookup_by_name};
use sdscope::AccessMask;
use uguid::Guid;

use crate::{
    app::GlobalOptions,
    output::{diagnostic_entries, print_diagnostics, print_output, DiagnosticEntry},
};

#[derive(Debug, Serialize)]
struct MaskOutput {
    mask: String,
    effective: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_type: Option<String>,
    rights: Vec<String>,
    sensitive: Vec<String>,
    dangerous: bool,
    diagnostics: Vec<DiagnosticEntry>,
}

/// Resolve `--object-type` as a braced or bare GUID, else as a schema name.
fn resolve_object_type(value: &str) -> anyhow::Result<Guid> {
    let bare = value.trim().trim_start_matches('{').trim_end_matches('}');
    if let Ok(guid) = bare.parse::<Guid>() {
        return Ok(guid);
    }

    match lookup_by_name(value.trim()) {
        Some(object) => Ok(object.guid),
        None => bail!("unknown object type '{value}'"),
    }
}

pub fn run(mask: u32, object_type: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let guid = object_type.map(resolve_object_type).transpose()?;
    let result = interpret(AccessMask::from_bits_retain(mask), guid.as_ref());
    let interpretation = &result.value;

    let output = MaskOutput {
        mask: format!("{:#010x}", interpretation.mask.bits()),
        effective: format!("{:#010x}", interpretation.effective.bits()),
        object_type: guid.map(|g| g.to_string()),
        rights: interpretation.names(),
        sensitive: interpretation.sensitive().map(ToString::to_string).collect(),
        dangerous: interpretation.is_dangerous(),
        diagnostics: diagnostic_entries(&result.diagnostics),
    };

    print_output(&output, opts, |out| {
        println!("Mask:      {}", out.mask);
        println!("Effective: {}", out.effective);
        if let Some(object_type) = &out.object_type {
            println!("Object:    {{{object_type}}}");
        }
        if out.dangerous {
            println!("Grants control over the object.");
        }

        println!();
        for right in &out.rights {
            let marker = if out.sensitive.contains(right) { " !" } else { "" };
            println!("  {right}{marker}");
        }
        print_diagnostics(&out.diagnostics);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_by_name_or_guid() {
        let by_name = resolve_object_type("User-Force-Change-Password").unwrap();
        let by_guid = resolve_object_type("{00299570-246d-11d0-a768-00aa006e0529}").unwrap();
        assert_eq!(by_name, by_guid);
        assert!(resolve_object_type("no-such-right").is_err());
    }
}
