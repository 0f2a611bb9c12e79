//! Metadata documents describing a packed atlas.
//!
//! A document lists one record per sprite in row-major order, in the atlas'
//! pixel space. XML output uses one `<tile>` element per record with
//! `x`, `y`, `width` and `height` attributes; RON and JSON carry the same
//! fields through serde and can be read back.

use crate::atlas::{PackedAtlas, TileRecord};
use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Serialized form of an atlas description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AtlasMetadata {
    #[serde(default)]
    pub image: Option<String>, // File name of the atlas image, if it was written to disk
    pub width: u32, // Atlas image width in pixels
    pub height: u32, // Atlas image height in pixels
    pub tile_width: u32, // Padded cell width
    pub tile_height: u32, // Padded cell height
    pub border_size: u32, // Padding on each side of every sprite
    pub tiles: Vec<TileRecord>, // Unpadded sprite rectangles, row-major
}

impl AtlasMetadata {
    #[must_use]
    pub fn from_packed(packed: &PackedAtlas, image: Option<String>) -> Self {
        Self {
            image,
            width: packed.width(),
            height: packed.height(),
            tile_width: packed.cell_width,
            tile_height: packed.cell_height,
            border_size: packed.border_size,
            tiles: packed.records.clone(),
        }
    }

    /// XML view of the document, one `<tile>` element per record.
    #[must_use]
    pub fn xml(&self) -> XmlDocument<'_> {
        XmlDocument(self)
    }

    #[must_use]
    pub fn to_xml(&self) -> String {
        self.xml().to_string()
    }

    /// # Errors
    /// Returns `Serialize` if RON serialization fails.
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// # Errors
    /// Returns `Json` if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render in `format`.
    ///
    /// # Errors
    /// Propagates serializer errors for RON and JSON.
    pub fn render(&self, format: MetadataFormat) -> Result<String> {
        match format {
            MetadataFormat::Xml => Ok(self.to_xml()),
            MetadataFormat::Ron => self.to_ron(),
            MetadataFormat::Json => self.to_json(),
        }
    }

    /// Write the document to `path` in `format`, creating parent directories.
    ///
    /// # Errors
    /// Returns `Io` on write failures and serializer errors otherwise.
    pub fn write(&self, path: &Path, format: MetadataFormat) -> Result<()> {
        let text = self.render(format)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Load a RON or JSON document, picking the parser from the extension.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for XML or unknown extensions, `Io` if the
    /// file cannot be read, and `Parse`/`Json` for malformed content.
    pub fn load(path: &Path) -> Result<Self> {
        let format = MetadataFormat::from_path(path).ok_or_else(|| {
            AtlasError::invalid(format!("unknown metadata extension: {}", path.display()))
        })?;
        let text = std::fs::read_to_string(path)?;
        match format {
            MetadataFormat::Ron => ron::from_str(&text).map_err(|source| AtlasError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            MetadataFormat::Json => Ok(serde_json::from_str(&text)?),
            MetadataFormat::Xml => Err(AtlasError::invalid(
                "XML metadata is write-only; use RON or JSON to load it back",
            )),
        }
    }
}

/// `Display` adapter that writes an [`AtlasMetadata`] as XML.
pub struct XmlDocument<'a>(&'a AtlasMetadata);

impl fmt::Display for XmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.0;
        writeln!(f, "<?xml version=\"1.0\" encoding=\"utf-8\"?>")?;
        write!(f, "<texture_atlas")?;
        if let Some(image) = &meta.image {
            write!(f, " image=\"{}\"", escape_attr(image))?;
        }
        writeln!(
            f,
            " width=\"{}\" height=\"{}\" tile_width=\"{}\" tile_height=\"{}\" border=\"{}\">",
            meta.width, meta.height, meta.tile_width, meta.tile_height, meta.border_size
        )?;
        for t in &meta.tiles {
            writeln!(
                f,
                "\t<tile x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" />",
                t.x, t.y, t.width, t.height
            )?;
        }
        writeln!(f, "</texture_atlas>")
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// On-disk metadata encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    #[default]
    Xml,
    Ron,
    Json,
}

impl MetadataFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            MetadataFormat::Xml => "xml",
            MetadataFormat::Ron => "ron",
            MetadataFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for MetadataFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(MetadataFormat::Xml),
            "ron" => Ok(MetadataFormat::Ron),
            "json" => Ok(MetadataFormat::Json),
            other => Err(format!("unknown metadata format '{other}', expected xml, ron or json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AtlasMetadata {
        AtlasMetadata {
            image: Some("sprites & co.png".to_string()),
            width: 64,
            height: 128,
            tile_width: 20,
            tile_height: 36,
            border_size: 2,
            tiles: vec![
                TileRecord { x: 2, y: 2, width: 16, height: 32 },
                TileRecord { x: 22, y: 2, width: 16, height: 32 },
                TileRecord { x: 2, y: 38, width: 16, height: 32 },
                TileRecord { x: 22, y: 38, width: 16, height: 32 },
            ],
        }
    }

    #[test]
    fn xml_has_one_element_per_tile_in_order() {
        let xml = sample().to_xml();
        let tiles: Vec<&str> = xml.lines().filter(|l| l.trim_start().starts_with("<tile ")).collect();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].trim(), r#"<tile x="2" y="2" width="16" height="32" />"#);
        assert_eq!(tiles[3].trim(), r#"<tile x="22" y="38" width="16" height="32" />"#);
        assert!(xml.contains(r#"image="sprites &amp; co.png""#));
        assert!(xml.trim_end().ends_with("</texture_atlas>"));
    }

    #[test]
    fn xml_view_streams_into_any_writer() {
        let meta = sample();
        let mut buf = Vec::new();
        std::io::Write::write_fmt(&mut buf, format_args!("{}", meta.xml())).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), meta.to_xml());
        assert!(meta.to_xml().starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<texture_atlas image="));
    }

    #[test]
    fn ron_and_json_parse_back() {
        let meta = sample();
        let ron_text = meta.to_ron().unwrap();
        assert_eq!(ron::from_str::<AtlasMetadata>(&ron_text).unwrap(), meta);
        let json_text = meta.to_json().unwrap();
        assert_eq!(serde_json::from_str::<AtlasMetadata>(&json_text).unwrap(), meta);
    }

    #[test]
    fn write_and_load_through_disk() {
        let dir = std::env::temp_dir().join(format!("tile_atlas_meta_{}", std::process::id()));
        let path = dir.join("atlas.ron");
        let meta = sample();
        meta.write(&path, MetadataFormat::Ron).unwrap();
        assert_eq!(AtlasMetadata::load(&path).unwrap(), meta);

        let xml_path = dir.join("atlas.xml");
        meta.write(&xml_path, MetadataFormat::Xml).unwrap();
        assert!(AtlasMetadata::load(&xml_path).unwrap_err().is_invalid_argument());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(MetadataFormat::from_path(Path::new("a/b.JSON")), Some(MetadataFormat::Json));
        assert_eq!(MetadataFormat::from_path(Path::new("a/b.png")), None);
        assert_eq!(MetadataFormat::from_path(Path::new("noext")), None);
    }
}
