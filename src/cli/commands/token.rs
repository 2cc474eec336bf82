use anyhow::Context;

use crate::auth::TokenCodec;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

/// Verify signature and expiry with the configured secret, then print the claims.
pub fn handle(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let codec = TokenCodec::from_config(&config::config().security);
    let claims = codec.verify(token.trim()).context("token rejected")?;
    let scope = if claims.admin_id.is_some() { "admin" } else { "user" };
    output_success(
        output_format,
        &format!("Valid {} token", scope),
        Some(serde_json::to_value(&claims)?),
    )
}
