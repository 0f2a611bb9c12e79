//! Atlas builder: slice a sprite sheet, pad the tiles and pack them.
//!
//! `AtlasBuilder::build` is the in-memory pipeline; `build_from_file` wraps
//! it with decoding the source image and writing the atlas image plus its
//! metadata document. The builder is synchronous; tile expansion is the only
//! step that fans out to the rayon pool.

use crate::atlas::PackedAtlas;
use crate::border;
use crate::error::Result;
use crate::metadata::AtlasMetadata;
use crate::packer;
use crate::settings::AtlasSettings;
use crate::tiler;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub struct AtlasBuilder;

/// Files produced by [`AtlasBuilder::build_from_file`].
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub image_path: PathBuf, // Written atlas image
    pub metadata_path: PathBuf, // Written metadata document
    pub metadata: AtlasMetadata, // Contents of the metadata document
}

impl AtlasBuilder {
    /// Run split → expand → pack on an in-memory sprite sheet.
    ///
    /// # Arguments
    /// * `source` - Sprite sheet to slice.
    /// * `settings` - Tile size, border, rounding and parallelism.
    ///
    /// # Return
    /// The packed atlas and one record per tile, row-major.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for invalid settings or when no full tile
    /// fits into `source`.
    #[instrument(skip_all, fields(tile_width = settings.tile_width, tile_height = settings.tile_height))]
    pub fn build(source: &RgbaImage, settings: &AtlasSettings) -> Result<PackedAtlas> {
        settings.validate()?;
        let tiles = tiler::split(source, settings.tile_width, settings.tile_height)?;
        let padded = border::expand_grid(tiles, settings.border_size, settings.parallel)?;
        let packed = packer::pack_with_records(&padded, settings.border_size, settings.rounding)?;
        info!(
            "built {}x{} atlas with {} tiles",
            packed.width(),
            packed.height(),
            packed.records.len()
        );
        Ok(packed)
    }

    /// Decode `input`, build the atlas and write `<name>.png` plus
    /// `<name>.<xml|ron|json>` into `out_dir`.
    ///
    /// Settings are checked before the input is decoded, so bad parameters
    /// fail fast without reading the file.
    ///
    /// # Errors
    /// Returns an `Err` when:
    /// - the input cannot be decoded (`Image`),
    /// - the settings or image dimensions are rejected (`InvalidArgument`),
    /// - writing the image or metadata fails (`Io`, `Image`, `Serialize`, `Json`).
    pub fn build_from_file(
        input: &Path,
        out_dir: &Path,
        name: &str,
        settings: &AtlasSettings,
    ) -> Result<BuildOutput> {
        settings.validate()?;
        let source = image::open(input)?.to_rgba8();
        let packed = Self::build(&source, settings)?;

        fs::create_dir_all(out_dir)?;
        let image_file = format!("{name}.png");
        let image_path = out_dir.join(&image_file);
        packed.image.save(&image_path)?;

        let format = settings.metadata_format;
        let metadata_path = out_dir.join(format!("{name}.{}", format.extension()));
        let metadata = AtlasMetadata::from_packed(&packed, Some(image_file));
        metadata.write(&metadata_path, format)?;
        info!(
            "wrote {} and {}",
            image_path.display(),
            metadata_path.display()
        );

        Ok(BuildOutput {
            image_path,
            metadata_path,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{PowerOfTwoRounding, TileRecord};
    use crate::metadata::MetadataFormat;
    use image::Rgba;

    fn sheet(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 7) as u8, (y * 3) as u8, 42, 255]))
    }

    fn settings(tile_width: u32, tile_height: u32, border_size: i32) -> AtlasSettings {
        AtlasSettings {
            tile_width,
            tile_height,
            border_size,
            ..AtlasSettings::default()
        }
    }

    #[test]
    fn build_runs_the_whole_pipeline() {
        let packed = AtlasBuilder::build(&sheet(32, 64), &settings(16, 32, 2)).unwrap();
        assert_eq!((packed.width(), packed.height()), (64, 128));
        assert_eq!((packed.cell_width, packed.cell_height), (20, 36));
        assert_eq!(packed.records.len(), 4);
        assert_eq!(packed.records[0], TileRecord { x: 2, y: 2, width: 16, height: 32 });
        assert_eq!(packed.records[3], TileRecord { x: 22, y: 38, width: 16, height: 32 });
    }

    #[test]
    fn padding_samples_match_sprite_edges() {
        let src = sheet(8, 4);
        let packed = AtlasBuilder::build(&src, &settings(4, 4, 1)).unwrap();
        // Cell (0, 1) starts at x = 6; its top-left padding pixel clamps to source (4, 0).
        assert_eq!(packed.image.get_pixel(6, 0), src.get_pixel(4, 0));
        assert_eq!(packed.image.get_pixel(11, 5), src.get_pixel(7, 3));
    }

    #[test]
    fn build_from_file_checks_settings_before_decoding() {
        // The input does not exist; an `Image`/`Io` error here would mean it was opened first.
        let missing = std::env::temp_dir().join("tile_atlas_missing_input.png");
        let out = std::env::temp_dir().join("tile_atlas_never_written");
        let err = AtlasBuilder::build_from_file(&missing, &out, "atlas", &settings(0, 8, 1))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!out.exists());
    }

    #[test]
    fn build_rejects_invalid_settings() {
        let src = sheet(16, 16);
        assert!(AtlasBuilder::build(&src, &settings(0, 8, 1)).unwrap_err().is_invalid_argument());
        assert!(AtlasBuilder::build(&src, &settings(8, 8, -2)).unwrap_err().is_invalid_argument());
        assert!(AtlasBuilder::build(&src, &settings(32, 8, 0)).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn strict_rounding_flows_through() {
        let mut s = settings(16, 16, 0);
        s.rounding = PowerOfTwoRounding::Strict;
        let packed = AtlasBuilder::build(&sheet(32, 32), &s).unwrap();
        assert_eq!((packed.width(), packed.height()), (64, 64));
    }

    #[test]
    fn build_from_file_writes_image_and_metadata() {
        let dir = std::env::temp_dir().join(format!("tile_atlas_build_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("sheet.png");
        sheet(32, 64).save(&input).unwrap();

        let mut s = settings(16, 32, 2);
        s.metadata_format = MetadataFormat::Json;
        let out = AtlasBuilder::build_from_file(&input, &dir.join("out"), "atlas", &s).unwrap();

        let atlas = image::open(&out.image_path).unwrap().to_rgba8();
        assert_eq!(atlas.dimensions(), (64, 128));
        assert_eq!(out.metadata_path.extension().unwrap(), "json");
        let loaded = AtlasMetadata::load(&out.metadata_path).unwrap();
        assert_eq!(loaded, out.metadata);
        assert_eq!(loaded.image.as_deref(), Some("atlas.png"));
        let _ = fs::remove_dir_all(&dir);
    }
}
