//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` and accepts the usual `up`, `down`, `fresh` and
//! `status` subcommands.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info,sqlx=warn"))
        .init();

    cli::run_cli(migration::Migrator).await;
}
