use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tile_atlas::settings::loader::load_settings;
use tile_atlas::{
    AtlasBuilder, AtlasMetadata, AtlasSettings, MetadataFormat, PowerOfTwoRounding, border, tiler,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tile_atlas",
    about = "Pack a sprite sheet into a padded power-of-two texture atlas",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only print errors (overrides verbose)
    #[arg(short, long, default_value_t = false, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split, pad and pack a sprite sheet into an atlas plus metadata
    Build(BuildArgs),
    /// Pad a single image by replicating its edge pixels
    Expand {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long = "border", default_value_t = 3, allow_negative_numbers = true)]
        border_size: i32,
    },
    /// Cut a sprite sheet into tile_<row>_<col>.png files
    Split {
        input: PathBuf,
        #[arg(short, long, default_value = "tiles")]
        out_dir: PathBuf,
        #[arg(long)]
        tile_width: u32,
        #[arg(long)]
        tile_height: u32,
    },
    /// Cut every sprite described by a RON/JSON metadata file out of an atlas
    Unpack {
        atlas: PathBuf,
        metadata: PathBuf,
        #[arg(short, long, default_value = "sprites")]
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Source sprite sheet
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png and name.<format>)
    #[arg(short, long, default_value = "atlas")]
    name: String,
    /// RON settings file or directory; flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    tile_width: Option<u32>,
    #[arg(long)]
    tile_height: Option<u32>,
    #[arg(short, long, allow_negative_numbers = true)]
    border: Option<i32>,
    /// Power-of-two rounding: ceil or strict
    #[arg(long)]
    rounding: Option<PowerOfTwoRounding>,
    /// Metadata format: xml, ron or json
    #[arg(long)]
    format: Option<MetadataFormat>,
    /// Expand tiles on a single thread
    #[arg(long, default_value_t = false)]
    serial: bool,
}

impl BuildArgs {
    fn resolve_settings(&self) -> Result<AtlasSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => AtlasSettings::default(),
        };
        if let Some(v) = self.tile_width {
            settings.tile_width = v;
        }
        if let Some(v) = self.tile_height {
            settings.tile_height = v;
        }
        if let Some(v) = self.border {
            settings.border_size = v;
        }
        if let Some(v) = self.rounding {
            settings.rounding = v;
        }
        if let Some(v) = self.format {
            settings.metadata_format = v;
        }
        if self.serial {
            settings.parallel = false;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Build(args) => {
            let settings = args.resolve_settings()?;
            let out = AtlasBuilder::build_from_file(&args.input, &args.out_dir, &args.name, &settings)
                .with_context(|| format!("building atlas from {}", args.input.display()))?;
            info!(
                "{} tiles -> {}x{} ({})",
                out.metadata.tiles.len(),
                out.metadata.width,
                out.metadata.height,
                out.metadata_path.display()
            );
        }
        Commands::Expand { input, output, border_size } => {
            let img = image::open(&input).with_context(|| format!("opening {}", input.display()))?;
            let padded = border::expand_dynamic(&img, border_size)?;
            padded
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("wrote {}x{} {}", padded.width(), padded.height(), output.display());
        }
        Commands::Split { input, out_dir, tile_width, tile_height } => {
            let img = image::open(&input)
                .with_context(|| format!("opening {}", input.display()))?
                .to_rgba8();
            let grid = tiler::split(&img, tile_width, tile_height)?;
            fs::create_dir_all(&out_dir)?;
            for (row, col, tile) in grid.iter() {
                let path = out_dir.join(format!("tile_{row}_{col}.png"));
                tile.save(&path).with_context(|| format!("writing {}", path.display()))?;
            }
            info!("wrote {} tiles to {}", grid.len(), out_dir.display());
        }
        Commands::Unpack { atlas, metadata, out_dir } => {
            let img = image::open(&atlas)
                .with_context(|| format!("opening {}", atlas.display()))?
                .to_rgba8();
            let meta = AtlasMetadata::load(&metadata)
                .with_context(|| format!("loading {}", metadata.display()))?;
            fs::create_dir_all(&out_dir)?;
            for (idx, record) in meta.tiles.iter().enumerate() {
                let sprite = record.crop(&img).with_context(|| format!("tile {idx}"))?;
                let path = out_dir.join(format!("sprite_{idx}.png"));
                sprite.save(&path).with_context(|| format!("writing {}", path.display()))?;
            }
            info!("wrote {} sprites to {}", meta.tiles.len(), out_dir.display());
        }
    }
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
