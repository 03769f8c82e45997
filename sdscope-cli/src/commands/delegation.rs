use serde::Serialize;
use sdscope::{
    delegation::{analyze_with, managed_password_readers, DelegationInput, Finding},
    TrusteeResolver, WellKnownSids,
};

use crate::{
    app::{BlobInput, GlobalOptions},
    commands::common::{decode_hex, decoder_config, read_blob},
    output::{diagnostic_entries, print_diagnostics, print_output, DiagnosticEntry},
};

pub struct DelegationArgs<'a> {
    pub uac: u32,
    pub spns: &'a [String],
    pub targets: &'a [String],
    pub rbcd: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DelegationOutput {
    user_account_control: u32,
    flags: Vec<&'static str>,
    findings: Vec<FindingView>,
    diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Serialize)]
struct FindingView {
    kind: &'static str,
    high_risk: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    targets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actors: Vec<TrusteeEntry>,
}

#[derive(Debug, Serialize)]
struct TrusteeEntry {
    sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl TrusteeEntry {
    fn new(sid: &sdscope::SecurityIdentifier) -> Self {
        TrusteeEntry {
            sid: sid.to_string(),
            name: WellKnownSids.resolve(sid),
        }
    }

    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.sid),
            None => self.sid.clone(),
        }
    }
}

impl From<&Finding> for FindingView {
    fn from(finding: &Finding) -> Self {
        let (targets, actors) = match finding {
            Finding::Unconstrained => (Vec::new(), Vec::new()),
            Finding::ConstrainedKerberosOnly { targets }
            | Finding::ConstrainedAnyProtocol { targets } => (targets.clone(), Vec::new()),
            Finding::ResourceBased { actors } => {
                (Vec::new(), actors.iter().map(TrusteeEntry::new).collect())
            }
        };

        FindingView {
            kind: finding.into(),
            high_risk: finding.is_high_risk(),
            targets,
            actors,
        }
    }
}

pub fn run(args: &DelegationArgs<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut input = DelegationInput::new(args.uac)
        .with_spns(args.spns.iter().cloned())
        .with_allowed_targets(args.targets.iter().cloned());
    if let Some(rbcd) = args.rbcd {
        input = input.with_resource_based(decode_hex(rbcd)?);
    }

    let result = analyze_with(&input, &decoder_config(opts))?;
    let output = DelegationOutput {
        user_account_control: args.uac,
        flags: input
            .account_control
            .iter_names()
            .map(|(name, _)| name)
            .collect(),
        findings: result.value.iter().map(FindingView::from).collect(),
        diagnostics: diagnostic_entries(&result.diagnostics),
    };

    print_output(&output, opts, |out| {
        println!(
            "userAccountControl: {:#010x} [{}]",
            out.user_account_control,
            out.flags.join(" | ")
        );
        println!();

        if out.findings.is_empty() {
            println!("No delegation configured.");
        }
        for finding in &out.findings {
            let marker = if finding.high_risk { " [high risk]" } else { "" };
            println!("{}{marker}", finding.kind);
            for target in &finding.targets {
                println!("  -> {target}");
            }
            for actor in &finding.actors {
                println!("  <- {}", actor.label());
            }
        }
        print_diagnostics(&out.diagnostics);
    })
}

#[derive(Debug, Serialize)]
struct ReadersOutput {
    readers: Vec<TrusteeEntry>,
    diagnostics: Vec<DiagnosticEntry>,
}

pub fn run_readers(input: &BlobInput, opts: &GlobalOptions) -> anyhow::Result<()> {
    let data = read_blob(input)?;
    let result = managed_password_readers(&data)?;

    let output = ReadersOutput {
        readers: result.value.iter().map(TrusteeEntry::new).collect(),
        diagnostics: diagnostic_entries(&result.diagnostics),
    };

    print_output(&output, opts, |out| {
        if out.readers.is_empty() {
            println!("No principal may read the managed password.");
        } else {
            println!("Managed password readers:");
            for reader in &out.readers {
                println!("  {}", reader.label());
            }
        }
        print_diagnostics(&out.diagnostics);
    })
}
