use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sdscope::DecoderConfig;

use crate::app::{BlobInput, Encoding, GlobalOptions, Strictness};

/// Decoder configuration selected by `--strictness`.
pub fn decoder_config(opts: &GlobalOptions) -> DecoderConfig {
    match opts.strictness {
        Strictness::Default => DecoderConfig::default(),
        Strictness::Strict => DecoderConfig::strict(),
        Strictness::Lenient => DecoderConfig::lenient(),
    }
}

/// Read the raw bytes of a blob given on the command line.
pub fn read_blob(input: &BlobInput) -> anyhow::Result<Vec<u8>> {
    let bytes = match input.encoding {
        Encoding::File => std::fs::read(&input.value)
            .with_context(|| format!("failed to read file: {}", input.value))?,
        Encoding::Hex => decode_hex(&input.value)?,
        Encoding::Base64 => {
            let compact: String = input.value.split_whitespace().collect();
            STANDARD
                .decode(compact)
                .context("BLOB is not valid base64")?
        }
    };

    if bytes.is_empty() {
        bail!("BLOB is empty");
    }
    Ok(bytes)
}

/// Decode a hex string, ignoring whitespace and an optional `0x` prefix.
pub fn decode_hex(value: &str) -> anyhow::Result<Vec<u8>> {
    let compact: String = value.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).context("value is not valid hex")
}

/// Collect all regular files in a directory, optionally recursing.
pub fn collect_files(dir: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files_into(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_into(
    dir: &Path,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files_into(&path, recursive, files)?;
            }
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
