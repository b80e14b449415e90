//! CLI tool to create invitation codes.
//!
//! Usage: `generate-invite-codes <count>`
//!
//! Uses the database from `config.yml` (or `FRONTPAGE_DATABASE_URL`) and
//! prints one code per line.

use anyhow::{bail, Context, Result};
use std::path::Path;

use frontpage::config::Config;
use frontpage::db::{self, repositories::SqlxInviteRepository};
use frontpage::services::invite::{InviteService, MAX_CODES_PER_BATCH};

fn parse_count(args: &[String]) -> Result<usize> {
    let [count] = args else {
        bail!("Usage: generate-invite-codes <count>");
    };
    let count: usize = count
        .parse()
        .with_context(|| format!("Invalid count: {}", count))?;
    if count == 0 || count > MAX_CODES_PER_BATCH {
        bail!("Count must be between 1 and {}", MAX_CODES_PER_BATCH);
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let count = parse_count(&args)?;

    let config = Config::load_with_env(Path::new("config.yml"))?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let service = InviteService::new(SqlxInviteRepository::boxed(pool.clone()))
        .with_valid_days(config.site.invite_valid_days);

    for code in service.generate(count).await? {
        println!("{}", code.code);
    }

    pool.close().await;
    Ok(())
}
