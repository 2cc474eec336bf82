use std::collections::HashSet;

use tracing::{info, warn};

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::config::{AdminSeedConfig, SeedAdmin, SeedPolicy};
use crate::database::models::admin::SEEDED_PERMISSIONS;
use crate::database::models::{Admin, AdminRole};
use crate::database::{Query, Repository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),
    #[error("Invalid role '{role}' for seed admin {email}")]
    InvalidRole { email: String, role: String },
}

/// What a seeding run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Stored admin count already matches the configured list
    Unchanged,
    Reconciled { inserted: usize },
    Replaced { deleted: u64, inserted: usize },
}

/// Brings the stored admins in line with the configured seed list.
pub struct AdminSeeder {
    admins: Repository<Admin>,
    passwords: PasswordHasher,
}

impl AdminSeeder {
    pub fn new(admins: Repository<Admin>, passwords: PasswordHasher) -> Self {
        Self { admins, passwords }
    }

    pub async fn run(&self, config: &AdminSeedConfig) -> Result<SeedOutcome, SeedError> {
        let configured = usable_entries(&config.admins)?;
        if configured.is_empty() {
            warn!("No seed admins configured (set ADMIN_EMAIL and ADMIN_PASSWORD), skipping");
            return Ok(SeedOutcome::Unchanged);
        }

        let stored = self.admins.count_all().await?;
        info!("Found {} existing admins, {} configured", stored, configured.len());
        if stored == configured.len() as i64 {
            info!("Seed admins already present, skipping initialization");
            return Ok(SeedOutcome::Unchanged);
        }

        match config.policy {
            SeedPolicy::Reconcile => self.reconcile(&configured).await,
            SeedPolicy::Replace => self.replace(&configured).await,
        }
    }

    /// Insert configured admins whose email is not stored yet. Deletes nothing.
    async fn reconcile(&self, configured: &[(&SeedAdmin, AdminRole)]) -> Result<SeedOutcome, SeedError> {
        let existing = self.admins.find(&Query::all()).await?;
        let mut known: HashSet<String> = existing.iter().map(|a| a.data.email.clone()).collect();

        let wanted: HashSet<&str> = configured.iter().map(|(seed, _)| seed.email.as_str()).collect();
        for admin in existing.iter().filter(|a| !wanted.contains(a.data.email.as_str())) {
            warn!("Stored admin {} is not in the seed configuration; leaving it in place", admin.data.email);
        }

        let mut inserted = 0;
        for (seed, role) in configured {
            if known.contains(&seed.email) {
                continue;
            }
            self.create(seed, *role).await?;
            known.insert(seed.email.clone());
            inserted += 1;
        }

        info!("Admin reconciliation inserted {} admins", inserted);
        Ok(SeedOutcome::Reconciled { inserted })
    }

    /// Drop every stored admin and recreate the configured list.
    async fn replace(&self, configured: &[(&SeedAdmin, AdminRole)]) -> Result<SeedOutcome, SeedError> {
        let deleted = self.admins.delete_all().await?;
        if deleted > 0 {
            warn!("Cleared {} existing admins", deleted);
        }

        for (seed, role) in configured {
            self.create(seed, *role).await?;
        }

        info!("Admin replacement created {} admins", configured.len());
        Ok(SeedOutcome::Replaced {
            deleted,
            inserted: configured.len(),
        })
    }

    async fn create(&self, seed: &SeedAdmin, role: AdminRole) -> Result<(), SeedError> {
        let hash = self.passwords.hash(&seed.password).await?;
        let name = if seed.name.trim().is_empty() {
            "Administrator".to_string()
        } else {
            seed.name.clone()
        };
        self.admins
            .insert(Admin::new(name, seed.email.clone(), hash, role, SEEDED_PERMISSIONS))
            .await?;
        info!("Seed admin created: {}", seed.email);
        Ok(())
    }
}

/// Entries with an email and password, first occurrence per email, with
/// their parsed roles.
fn usable_entries(admins: &[SeedAdmin]) -> Result<Vec<(&SeedAdmin, AdminRole)>, SeedError> {
    let mut seen = HashSet::new();
    let mut usable = Vec::new();
    for seed in admins {
        if seed.email.trim().is_empty() || seed.password.is_empty() {
            warn!("Skipping seed admin without email or password");
            continue;
        }
        if !seen.insert(seed.email.as_str()) {
            warn!("Skipping duplicate seed admin {}", seed.email);
            continue;
        }
        let role = seed.role.parse::<AdminRole>().map_err(|_| SeedError::InvalidRole {
            email: seed.email.clone(),
            role: seed.role.clone(),
        })?;
        usable.push((seed, role));
    }
    Ok(usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Model;
    use crate::database::{DocumentStore, MemoryStore};
    use std::sync::Arc;

    fn seed(email: &str, role: &str) -> SeedAdmin {
        SeedAdmin {
            name: "Seed".to_string(),
            email: email.to_string(),
            password: "seed-password".to_string(),
            role: role.to_string(),
        }
    }

    async fn seeder() -> (AdminSeeder, Repository<Admin>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        store.ensure_collection(Admin::COLLECTION).await.unwrap();
        let repo = Repository::<Admin>::new(store);
        (AdminSeeder::new(repo.clone(), PasswordHasher::new(4)), repo)
    }

    async fn insert_existing(repo: &Repository<Admin>, email: &str) {
        repo.insert(Admin::new(
            "Existing".to_string(),
            email.to_string(),
            "$2b$04$existing".to_string(),
            AdminRole::Admin,
            &[],
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn seeds_empty_store() {
        let (seeder, repo) = seeder().await;
        let config = AdminSeedConfig {
            policy: SeedPolicy::Reconcile,
            admins: vec![seed("root@example.com", "superadmin")],
        };

        let outcome = seeder.run(&config).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Reconciled { inserted: 1 });

        let admins = repo.find(&Query::all()).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].data.role, AdminRole::Superadmin);
        assert_eq!(admins[0].data.permissions.len(), 4);
        assert_ne!(admins[0].data.password, "seed-password");
    }

    #[tokio::test]
    async fn matching_count_is_left_alone() {
        for policy in [SeedPolicy::Reconcile, SeedPolicy::Replace] {
            let (seeder, repo) = seeder().await;
            insert_existing(&repo, "someone-else@example.com").await;
            let before = repo.find(&Query::all()).await.unwrap();

            let config = AdminSeedConfig {
                policy,
                admins: vec![seed("root@example.com", "superadmin")],
            };
            assert_eq!(seeder.run(&config).await.unwrap(), SeedOutcome::Unchanged);

            let after = repo.find(&Query::all()).await.unwrap();
            assert_eq!(after.len(), 1);
            assert_eq!(after[0].id, before[0].id);
        }
    }

    #[tokio::test]
    async fn reconcile_never_deletes() {
        let (seeder, repo) = seeder().await;
        insert_existing(&repo, "root@example.com").await;
        insert_existing(&repo, "legacy@example.com").await;
        insert_existing(&repo, "other@example.com").await;

        let config = AdminSeedConfig {
            policy: SeedPolicy::Reconcile,
            admins: vec![seed("root@example.com", "superadmin"), seed("new@example.com", "admin")],
        };
        assert_eq!(seeder.run(&config).await.unwrap(), SeedOutcome::Reconciled { inserted: 1 });
        assert_eq!(repo.count_all().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn replace_recreates_list() {
        let (seeder, repo) = seeder().await;
        insert_existing(&repo, "legacy@example.com").await;
        insert_existing(&repo, "other@example.com").await;

        let config = AdminSeedConfig {
            policy: SeedPolicy::Replace,
            admins: vec![seed("root@example.com", "superadmin")],
        };
        assert_eq!(
            seeder.run(&config).await.unwrap(),
            SeedOutcome::Replaced { deleted: 2, inserted: 1 }
        );
        let admins = repo.find(&Query::all()).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].data.email, "root@example.com");
    }

    #[tokio::test]
    async fn incomplete_and_duplicate_entries_are_skipped() {
        let (seeder, repo) = seeder().await;
        let mut no_password = seed("nopass@example.com", "admin");
        no_password.password.clear();
        let config = AdminSeedConfig {
            policy: SeedPolicy::Reconcile,
            admins: vec![
                seed("root@example.com", "superadmin"),
                seed("root@example.com", "admin"),
                no_password,
                seed("", "admin"),
            ],
        };
        assert_eq!(seeder.run(&config).await.unwrap(), SeedOutcome::Reconciled { inserted: 1 });
        assert_eq!(repo.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_role_fails() {
        let (seeder, _) = seeder().await;
        let config = AdminSeedConfig {
            policy: SeedPolicy::Reconcile,
            admins: vec![seed("root@example.com", "owner")],
        };
        assert!(matches!(seeder.run(&config).await, Err(SeedError::InvalidRole { .. })));
    }
}
