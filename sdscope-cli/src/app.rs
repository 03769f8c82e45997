use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sdscope - Windows security descriptor decoding and delegation analysis
#[derive(Debug, Parser)]
#[command(name = "sdscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Decoder strictness: default, strict, or lenient.
    #[arg(long, global = true, value_enum, default_value_t = Strictness::Default)]
    pub strictness: Strictness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strictness {
    Default,
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// Path to a file holding the raw bytes.
    File,
    /// Hex string, whitespace allowed.
    Hex,
    /// Standard base64, as printed by most LDAP tools.
    Base64,
}

/// A descriptor blob given on the command line.
#[derive(Debug, Clone, Args)]
pub struct BlobInput {
    /// File path, hex string or base64 string, depending on --encoding.
    #[arg(value_name = "BLOB")]
    pub value: String,

    /// How BLOB is encoded.
    #[arg(short, long, value_enum, default_value_t = Encoding::File)]
    pub encoding: Encoding,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a security descriptor and list owner, group, control flags and ACL entries.
    Decode {
        #[command(flatten)]
        input: BlobInput,

        /// Also list inherited entries and the SACL.
        #[arg(short, long)]
        all: bool,
    },

    /// Classify the Kerberos delegation configuration of an account.
    Delegation {
        /// userAccountControl value (hex like 0x80000 or decimal).
        #[arg(long, value_parser = parse_u32)]
        uac: u32,

        /// servicePrincipalName values.
        #[arg(long = "spn", value_name = "SPN")]
        spns: Vec<String>,

        /// msDS-AllowedToDelegateTo values.
        #[arg(long = "target", value_name = "SPN")]
        targets: Vec<String>,

        /// Hex encoded msDS-AllowedToActOnBehalfOfOtherIdentity value.
        #[arg(long, value_name = "HEX")]
        rbcd: Option<String>,
    },

    /// List the principals allowed to read a gMSA password (msDS-GroupMSAMembership).
    Readers {
        #[command(flatten)]
        input: BlobInput,
    },

    /// Convert a SID between string and hex binary form.
    Sid {
        /// SID string (S-1-...) or hex encoded binary SID.
        value: String,
    },

    /// Interpret an access mask, optionally narrowed to an object type.
    Mask {
        /// Access mask (hex like 0x000F01FF or decimal).
        #[arg(value_parser = parse_u32)]
        mask: u32,

        /// Object-type GUID or schema name.
        #[arg(long)]
        object_type: Option<String>,
    },

    /// Decode every file in a directory in parallel and summarize the results.
    Batch {
        /// Directory with one raw descriptor per file.
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Descend into subdirectories.
        #[arg(short, long)]
        recursive: bool,
    },
}

fn parse_u32(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid value '{value}': {e}"))
}
