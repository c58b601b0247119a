//! Check that the render engine and fonts are available.

use std::process::Command;

use promoclip_common::config::AppConfig;
use promoclip_model::style::FontFace;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Promoclip System Check");
    println!("{}", "=".repeat(50));

    let ffmpeg_ok = binary_on_path("ffmpeg");
    if ffmpeg_ok {
        println!("[OK] ffmpeg found on PATH");
    } else {
        println!("[FAIL] ffmpeg not found on PATH");
    }

    let ffprobe_ok = binary_on_path("ffprobe");
    if ffprobe_ok {
        println!("[OK] ffprobe found on PATH (used for progress estimation)");
    } else {
        println!("[WARN] ffprobe not found on PATH; render progress will be coarse");
    }

    println!("[..] Fonts directory: {}", config.fonts_dir.display());
    let mut fonts_ok = true;
    for face in [FontFace::Bold, FontFace::Regular] {
        let path = config.fonts_dir.join(face.file_name());
        if path.exists() {
            println!("[OK] {}", face.file_name());
        } else {
            println!("[FAIL] {} missing", face.file_name());
            fonts_ok = false;
        }
    }

    println!();
    if ffmpeg_ok && fonts_ok {
        println!("All required resources are available. Promoclip is ready.");
    } else {
        println!("Some required resources are missing. See above for fixes.");
    }

    Ok(())
}

fn binary_on_path(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
