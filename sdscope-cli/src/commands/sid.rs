use anyhow::Context;
use serde::Serialize;
use sdscope::{well_known_name, SecurityIdentifier};

use crate::{app::GlobalOptions, commands::common::decode_hex, output::print_output};

#[derive(Debug, Serialize)]
struct SidOutput {
    sid: String,
    hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    authority: u64,
    sub_authorities: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rid: Option<u32>,
    domain_account: bool,
}

/// Parse a SID given either as `S-1-...` text or as hex bytes.
fn parse_sid(value: &str) -> anyhow::Result<SecurityIdentifier> {
    let trimmed = value.trim();
    if trimmed.starts_with(['S', 's']) && trimmed.contains('-') {
        return Ok(trimmed.parse()?);
    }

    let bytes = decode_hex(trimmed).context("SID is neither S-1-... text nor hex")?;
    Ok(SecurityIdentifier::from_bytes(&bytes)?)
}

pub fn run(value: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let sid = parse_sid(value)?;
    let output = SidOutput {
        sid: sid.to_string(),
        hex: hex::encode_upper(sid.to_bytes()?),
        name: well_known_name(&sid),
        authority: sid.authority(),
        sub_authorities: sid.sub_authorities().to_vec(),
        rid: sid.rid(),
        domain_account: sid.is_domain_account(),
    };

    print_output(&output, opts, |out| {
        println!("SID:    {}", out.sid);
        println!("Hex:    {}", out.hex);
        if let Some(name) = out.name {
            println!("Name:   {name}");
        }
        if out.domain_account {
            if let Some(rid) = out.rid {
                println!("RID:    {rid}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_hex_agree() {
        let text = parse_sid("S-1-5-32-544").unwrap();
        let binary = parse_sid("01020000000000052000000020020000").unwrap();
        assert_eq!(text, binary);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_sid("S-2-5").is_err());
        assert!(parse_sid("zz").is_err());
    }
}
