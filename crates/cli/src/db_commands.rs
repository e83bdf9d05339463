use std::path::PathBuf;

use {
    agora_config::AgoraConfig,
    agora_store::Database,
    anyhow::Context as _,
    clap::Subcommand,
};

#[derive(Subcommand)]
pub enum DbAction {
    /// Apply all pending migrations to the configured database.
    Migrate,
    /// Delete the SQLite database file (and its WAL/SHM companions).
    Reset,
}

pub async fn handle_db(action: DbAction, config: &AgoraConfig) -> anyhow::Result<()> {
    match action {
        DbAction::Migrate => migrate(config).await,
        DbAction::Reset => reset(config),
    }
}

async fn migrate(config: &AgoraConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.database.url, 1)
        .await
        .with_context(|| format!("opening {}", config.database.url))?;
    db.migrate().await?;
    db.close().await;
    println!("Migrations applied to {}.", config.database.url);
    Ok(())
}

fn reset(config: &AgoraConfig) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(&config.database.url) else {
        anyhow::bail!(
            "{} is not a file-backed SQLite database",
            config.database.url
        );
    };

    let mut deleted = false;
    for suffix in ["", "-wal", "-shm"] {
        let mut candidate = path.clone().into_os_string();
        candidate.push(suffix);
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            std::fs::remove_file(&candidate)?;
            println!("Deleted: {}", candidate.display());
            deleted = true;
        }
    }

    if deleted {
        println!("Database deleted. Run `agora db migrate` to recreate it.");
    } else {
        println!("No database file found at {}.", path.display());
    }
    Ok(())
}

/// File path of a `sqlite:` URL; `None` for in-memory databases.
fn sqlite_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
