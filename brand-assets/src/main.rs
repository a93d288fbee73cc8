use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod draw;
mod favicon;
mod social;

/// Brand asset generator for the SurgiGuard site
#[derive(Debug, Parser)]
#[command(name = "brand-assets", version, about = "Generates the site's icon set")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rasterise the favicon and touch icon
    Generate {
        /// Directory the PNGs are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Icon side in pixels, repeatable (default: 32 and 180)
        #[arg(long = "size", value_parser = clap::value_parser!(u32).range(1..=2048))]
        sizes: Vec<u32>,
    },
    /// Render the 1200x630 link preview card
    SocialPreview {
        /// Where the PNG is written
        #[arg(long, default_value = social::DEFAULT_FILE)]
        out: PathBuf,

        /// TrueType font for the text (default: DejaVu Sans if installed)
        #[arg(long)]
        font: Option<PathBuf>,

        /// Font for the title, defaults to --font
        #[arg(long, requires = "font")]
        title_font: Option<PathBuf>,
    },
}

fn generate(out_dir: &Path, sizes: &[u32]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let sizes = if sizes.is_empty() { &favicon::DEFAULT_SIZES[..] } else { sizes };
    let mut written = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let path = out_dir.join(favicon::file_name(size));
        favicon::render(size)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Created {} ({}x{})", path.display(), size, size);
        written.push(path);
    }
    Ok(written)
}

fn social_preview(out: &Path, font: Option<&Path>, title_font: Option<&Path>) -> Result<()> {
    let fonts = match font {
        Some(path) => Some(social::Fonts::from_files(path, title_font)?),
        None => {
            let system = social::Fonts::system();
            if system.is_none() {
                warn!("no font found, rendering the preview without text");
            }
            system
        }
    };

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    social::render(fonts.as_ref())
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("Created {} ({}x{})", out.display(), social::WIDTH, social::HEIGHT);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate { out_dir, sizes } => {
            let written = generate(&out_dir, &sizes)?;
            info!("Favicon generation complete, {} files", written.len());
        }
        Command::SocialPreview { out, font, title_font } => {
            social_preview(&out, font.as_deref(), title_font.as_deref())?;
        }
    }
    Ok(())
}
