//! `vpost add-profile` / `vpost profiles` / `vpost remove-profile`.

use anyhow::Result;
use vpost_core::config::VpostConfig;
use vpost_core::schedule_db::{ProfileId, ScheduleDb};

pub async fn run_add_profile(
    db: &ScheduleDb,
    cfg: &VpostConfig,
    name: &str,
    cookies_filename: &str,
    proxy: Option<&str>,
) -> Result<()> {
    let cookies_dir = cfg.cookies_dir()?;
    std::fs::create_dir_all(&cookies_dir)?;

    let id = db.add_profile(name, cookies_filename, proxy).await?;
    println!("Added profile {} ({})", id, name);

    let cookies_path = cookies_dir.join(cookies_filename);
    if !cookies_path.exists() {
        println!(
            "Note: {} does not exist yet; uploads with this profile will fail until it does.",
            cookies_path.display()
        );
    }
    Ok(())
}

pub async fn run_profiles(db: &ScheduleDb) -> Result<()> {
    let profiles = db.list_profiles().await?;
    if profiles.is_empty() {
        println!("No profiles configured.");
        return Ok(());
    }
    println!("{:<6} {:<16} {:<20} {:<8} {}", "ID", "NAME", "COOKIES", "ACTIVE", "PROXY");
    for p in profiles {
        println!(
            "{:<6} {:<16} {:<20} {:<8} {}",
            p.id,
            p.name,
            p.cookies_filename,
            if p.is_active { "yes" } else { "no" },
            p.proxy.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn run_remove_profile(db: &ScheduleDb, id: ProfileId) -> Result<()> {
    db.remove_profile(id).await?;
    println!("Removed profile {}", id);
    Ok(())
}
