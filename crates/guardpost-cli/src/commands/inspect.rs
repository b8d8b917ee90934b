//! `inspect`: verify a token against the configured keys and print its
//! claims.

use std::sync::Arc;

use clap::Args;

use guardpost_auth::jwt::TokenDecoder;
use guardpost_auth::keys::KeyStore;
use guardpost_core::error::AppError;

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// The token to inspect
    #[arg(short, long)]
    pub token: String,
}

/// Verifies the token (structure, signature, temporal validity) using
/// the configured key ring and prints the decoded claims as JSON.
pub fn execute(args: &InspectArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    let key_store = Arc::new(KeyStore::from_config(&config.auth)?);
    let decoder = TokenDecoder::new(key_store, config.auth.leeway_seconds);

    let claims = decoder.verify(&args.token)?;

    println!("{}", serde_json::to_string_pretty(&claims)?);
    eprintln!(
        "Valid: issued {} / expires {} ({}s remaining). Revocation status not checked.",
        claims.issued_at().to_rfc3339(),
        claims.expires_at().to_rfc3339(),
        claims.remaining_ttl_seconds()
    );
    Ok(())
}
