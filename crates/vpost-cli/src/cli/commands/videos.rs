//! `vpost add-video` / `vpost videos` / `vpost remove-video`.

use anyhow::{bail, Context, Result};
use std::path::Path;
use uuid::Uuid;
use vpost_core::config::VpostConfig;
use vpost_core::schedule_db::{ScheduleDb, VideoId};

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

pub async fn run_add_video(
    db: &ScheduleDb,
    cfg: &VpostConfig,
    path: &str,
    description: Option<String>,
) -> Result<()> {
    let src = Path::new(path);
    let original = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("path has no file name: {}", path))?;
    let ext = src
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        bail!(
            "unsupported video format {:?} (expected one of: {})",
            original,
            VIDEO_EXTENSIONS.join(", ")
        );
    }

    let library = cfg.library_dir()?;
    std::fs::create_dir_all(&library)
        .with_context(|| format!("create library dir {}", library.display()))?;
    // Imported files get a fresh name so two "clip.mp4" imports never collide.
    let stored = format!("{}.{}", Uuid::new_v4(), ext);
    let dest = library.join(&stored);
    std::fs::copy(src, &dest)
        .with_context(|| format!("copy {} into the library", src.display()))?;
    let file_size = std::fs::metadata(&dest)?.len() as i64;

    let description = description.unwrap_or_else(|| format!("Video: {}", original));
    let id = db
        .add_video(
            &original,
            &stored,
            &dest.to_string_lossy(),
            Some(&description),
            file_size,
        )
        .await?;

    println!("Added video {} ({} -> {})", id, original, stored);
    Ok(())
}

pub async fn run_videos(db: &ScheduleDb) -> Result<()> {
    let videos = db.list_videos().await?;
    if videos.is_empty() {
        println!("No videos in the library.");
        return Ok(());
    }
    println!("{:<6} {:<28} {:<10} {}", "ID", "FILENAME", "SIZE", "DESCRIPTION");
    for v in videos {
        println!(
            "{:<6} {:<28} {:<10} {}",
            v.id,
            v.original_filename,
            v.file_size,
            v.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn run_remove_video(db: &ScheduleDb, id: VideoId) -> Result<()> {
    let video = db.remove_video(id).await?;
    let path = Path::new(&video.file_path);
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), "could not delete library file: {}", e);
        }
    }
    println!("Removed video {} ({})", id, video.original_filename);
    Ok(())
}
