pub mod admin_seed;

pub use admin_seed::{AdminSeeder, SeedError, SeedOutcome};
