use serde_json::json;

use crate::auth::password::PasswordHasher;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, SeedPolicy};
use crate::database::{self, Repository};
use crate::services::{AdminSeeder, SeedOutcome};

/// Run admin seeding once against the configured store.
pub async fn handle(policy: Option<SeedPolicy>, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    config.load_seed_file()?;
    if let Some(policy) = policy {
        config.seed.policy = policy;
    }

    let store = database::connect_store(&config).await?;
    database::ensure_collections(store.as_ref()).await?;

    let seeder = AdminSeeder::new(
        Repository::new(store),
        PasswordHasher::new(config.security.bcrypt_cost),
    );
    let outcome = seeder.run(&config.seed).await?;

    let (message, data) = match outcome {
        SeedOutcome::Unchanged => ("Admins already match the seed configuration", json!({"inserted": 0, "deleted": 0})),
        SeedOutcome::Reconciled { inserted } => ("Admins reconciled", json!({"inserted": inserted, "deleted": 0})),
        SeedOutcome::Replaced { deleted, inserted } => ("Admins replaced", json!({"inserted": inserted, "deleted": deleted})),
    };
    output_success(output_format, message, Some(data))
}
