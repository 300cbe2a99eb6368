use clap::{Args, Parser, Subcommand};
use photo_album::imaging::RustBackend;
use photo_album::{config, output, pipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-album")]
#[command(about = "Incremental static photo gallery generator")]
#[command(long_about = "\
Incremental static photo gallery generator

Point it at a directory of JPEG files and it builds a single-page gallery:

  album/
  ├── index.html                 # Thumbnail grid, tag filter, lightbox
  ├── photos.json                # Gallery state, read back by the next build
  ├── originals/photo-3c.jpg     # Full size, orientation corrected
  ├── slides/photo-3c.jpg        # Fit inside --max-slide
  ├── thumbs/photo-3c.jpg        # Fit inside --max-thumb
  └── assets/

Photos are identified by content, not by name: renaming or moving a file
does not reprocess it, and duplicates are shown once. Rebuilding only
processes new photos. Captions and authors edited in photos.json survive.

Capture time (first available wins): EXIF → file modification time → now.
Tags: IPTC keywords.

Settings are read from <source>/config.toml; flags override it.
Run 'photo-album gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory of JPEG photos
    #[arg(long, default_value = "photos", global = true)]
    source: PathBuf,

    /// Output directory for the gallery
    #[arg(long, default_value = "album", global = true)]
    output: PathBuf,

    #[command(flatten)]
    gallery: GalleryArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Flags that override `config.toml`.
#[derive(Args, Clone)]
struct GalleryArgs {
    /// Title of the album
    #[arg(long, global = true)]
    title: Option<String>,

    /// Subtitle of the album
    #[arg(long, global = true)]
    subtitle: Option<String>,

    /// Color theme (blue, green, grey, orange, purple, red)
    #[arg(long, global = true)]
    color: Option<String>,

    /// File whose content is inserted before </head>
    #[arg(long, global = true)]
    head_content: Option<PathBuf>,

    /// File whose content is inserted before </body>
    #[arg(long, global = true)]
    body_content: Option<PathBuf>,

    /// File copied into the gallery root (repeatable)
    #[arg(long, global = true)]
    include: Vec<PathBuf>,

    /// Keep photos whose source file is gone instead of removing them
    #[arg(long, global = true)]
    append: bool,

    /// Maximum pixel dimension of slide images
    #[arg(long, global = true)]
    max_slide: Option<u32>,

    /// Maximum pixel dimension of thumbnail images
    #[arg(long, global = true)]
    max_thumb: Option<u32>,

    /// Maximum number of parallel workers
    #[arg(long, global = true)]
    max_processes: Option<usize>,
}

impl GalleryArgs {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            color: self.color.clone(),
            head_content: self.head_content.clone(),
            body_content: self.body_content.clone(),
            include: self.include.clone(),
            append: self.append,
            max_slide: self.max_slide,
            max_thumb: self.max_thumb,
            max_processes: self.max_processes,
        }
    }
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Build or update the gallery (default)
    Build,
    /// Show what a build would add, repair and remove, without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let layout = pipeline::OutputLayout::new(&cli.output);

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_config(&cli.source, &cli.gallery.overrides())?;
            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                cli.output.display()
            );

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_process_event(&event);
                }
            });
            let result = pipeline::build(
                &config,
                &cli.source,
                &layout,
                &RustBackend::new(),
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer panicked")?;

            let report = result?;
            output::print_build_summary(&report, layout.root());
        }
        Command::Check => {
            let config = config::load_config(&cli.source, &cli.gallery.overrides())?;
            let plan = pipeline::check(&config, &cli.source, &layout, &RustBackend::new())?;
            output::print_reconcile_output(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
