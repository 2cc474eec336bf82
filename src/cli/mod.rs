pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::SeedPolicy;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio API operator tools")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Reconcile stored admins with the configured seed list")]
    Seed {
        #[arg(long, value_enum, help = "Override ADMIN_SEED_POLICY")]
        policy: Option<SeedPolicyArg>,
    },

    #[command(about = "Print a bcrypt hash of a password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
        #[arg(long, help = "bcrypt cost (defaults to SECURITY_BCRYPT_COST)")]
        cost: Option<u32>,
    },

    #[command(about = "Verify a bearer token and print its claims")]
    VerifyToken {
        #[arg(help = "JWT as issued by a login route")]
        token: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SeedPolicyArg {
    Reconcile,
    Replace,
}

impl From<SeedPolicyArg> for SeedPolicy {
    fn from(arg: SeedPolicyArg) -> Self {
        match arg {
            SeedPolicyArg::Reconcile => SeedPolicy::Reconcile,
            SeedPolicyArg::Replace => SeedPolicy::Replace,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Seed { policy } => commands::seed::handle(policy.map(Into::into), output_format).await,
        Commands::HashPassword { password, cost } => commands::password::handle(&password, cost, output_format).await,
        Commands::VerifyToken { token } => commands::token::handle(&token, output_format),
    }
}
