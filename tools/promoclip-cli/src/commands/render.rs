//! Render the overlay onto a clip.

use std::path::PathBuf;

use promoclip_common::config::AppConfig;
use promoclip_engine::engine::FfmpegEngine;
use promoclip_engine::session::{OverlaySession, SessionConfig};
use promoclip_model::spec::OverlaySpec;

pub async fn run(
    config: &AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    primary: Option<String>,
    promo: Option<String>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Input path has no file name: {}", input.display()))?
        .to_string();

    let output_path = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("clip");
        input.with_file_name(format!("{stem}-promo.mp4"))
    });

    let mut spec = OverlaySpec::default();
    if let Some(text) = primary {
        spec.primary = text;
    }
    if let Some(text) = promo {
        spec.promo = text;
    }
    if let Some(text) = description {
        spec.description = text;
    }

    println!("Rendering overlay onto: {}", input.display());
    println!("  Primary:     {}", spec.primary);
    println!("  Promo:       {}", spec.promo);
    println!("  Description: {}", spec.description);

    let bytes = std::fs::read(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;

    let staging_dir = config.workspace_dir.join("engine");
    let engine = FfmpegEngine::new(staging_dir);
    let mut session = OverlaySession::new(SessionConfig::from_app(config), Box::new(engine))?;

    if let Err(e) = session.load_clip(&file_name, bytes).await {
        if e.is_load_phase() {
            println!("Setup failed before rendering could start: {e}");
        }
        return Err(e.into());
    }

    let mut progress = session.progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            print!("\r  Progress: {}%  ", *progress.borrow());
        }
    });

    let result = session.render(&spec).await;
    printer.abort();

    match result {
        Ok(asset) => {
            std::fs::copy(asset.handle.path(), &output_path)?;
            println!("\nRender complete: {}", output_path.display());
            Ok(())
        }
        Err(e) => {
            println!("\nRender failed: {e}");
            Err(e.into())
        }
    }
}
