use serde_json::json;

use crate::auth::password::PasswordHasher;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

pub async fn handle(password: &str, cost: Option<u32>, output_format: OutputFormat) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hasher = PasswordHasher::new(cost.unwrap_or(config::config().security.bcrypt_cost));
    let hash = hasher.hash(password).await?;
    output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))
}
