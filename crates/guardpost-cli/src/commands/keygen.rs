//! `keygen`: generate new signing key material.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use clap::Args;

use guardpost_core::error::AppError;

/// Arguments for the keygen command.
#[derive(Debug, Args)]
pub struct KeygenArgs {
    /// Key identifier; generated from the date when omitted
    #[arg(short, long)]
    pub kid: Option<String>,

    /// Append the key block to this file instead of printing to stdout
    #[arg(short, long)]
    pub out: Option<String>,
}

/// Generates a 256-bit HMAC secret and emits it as an `[[auth.keys]]`
/// TOML block ready to paste into (or append to) the configuration.
pub fn execute(args: &KeygenArgs) -> Result<(), AppError> {
    let secret: [u8; 32] = rand::random();
    let suffix: [u8; 2] = rand::random();

    let kid = args.kid.clone().unwrap_or_else(|| {
        format!(
            "key-{}-{:02x}{:02x}",
            Utc::now().format("%Y%m%d"),
            suffix[0],
            suffix[1]
        )
    });

    let block = format!(
        "[[auth.keys]]\nkid = \"{}\"\nsecret = \"{}\"\nrole = \"signing\"\n",
        kid,
        STANDARD.encode(secret)
    );

    match &args.out {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::internal(format!("Failed to open '{path}' for append: {e}"))
                })?;
            writeln!(file, "\n{block}")
                .map_err(|e| AppError::internal(format!("Failed to write key block: {e}")))?;
            println!("Appended key '{kid}' to {path}");
        }
        None => {
            println!("{block}");
        }
    }

    eprintln!(
        "Note: list the new key first and demote the previous signing key to \
         role = \"verify-only\" until its tokens have expired."
    );
    Ok(())
}
