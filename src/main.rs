mod config;
mod db;
mod limits;
mod logging;
mod models;
mod run;
mod ui;

use anyhow::Result;

use config::Config;
use logging::LogTarget;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (config, command) = Config::from_args(&args)?;

    let target = if command.is_empty() {
        LogTarget::File(config.log_path())
    } else {
        LogTarget::Stderr
    };
    logging::init(&target)?;

    let mut db = db::Database::open(&config.db_path)?;
    ensure_default_profile(&mut db)?;

    if command.is_empty() {
        run::as_tui(&mut db, &config)
    } else {
        run::as_cli(&command, &mut db, &config)
    }
}

fn ensure_default_profile(db: &mut db::Database) -> Result<()> {
    if db.get_profile_by_login(config::DEFAULT_PROFILE)?.is_none() {
        let profile = models::Profile::new(config::DEFAULT_PROFILE.into());
        let id = db.create_profile(&profile)?;
        tracing::info!(profile_id = id, "created default profile");
    }
    Ok(())
}
