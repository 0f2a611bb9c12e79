//! Build power-of-two texture atlases from grids of sprite tiles.
//!
//! The pipeline has four stages, each a plain function over owned buffers:
//! [`tiler::split`], [`border::expand`], [`packer::pack`] and
//! [`packer::emit`]. [`AtlasBuilder`] chains them.
pub mod atlas;
pub mod border;
pub mod error;
pub mod grid;
pub mod metadata;
pub mod packer;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod settings;
pub mod tiler;

pub use atlas::{AtlasBuilder, PackedAtlas, PowerOfTwoRounding, TileRecord, UVBounds};
pub use error::{AtlasError, Result};
pub use grid::TileGrid;
pub use metadata::{AtlasMetadata, MetadataFormat};
pub use settings::AtlasSettings;
