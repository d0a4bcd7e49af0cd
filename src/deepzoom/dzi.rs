//! Deep Zoom Image (DZI) descriptor and tile naming.
//!
//! A DZI pyramid on disk is a `<name>.dzi` XML descriptor next to a
//! `<name>_files/` directory holding one sub-directory per level, each with
//! `<column>_<row>.<format>` tiles.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DeepZoomError;

/// XML namespace of the Deep Zoom schema.
pub const DZI_NAMESPACE: &str = "http://schemas.microsoft.com/deepzoom/2008";

/// Image format of the individual tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    #[default]
    Jpeg,
    Png,
}

impl TileFormat {
    /// Name used in the descriptor's `Format` attribute and as file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            TileFormat::Jpeg => "jpeg",
            TileFormat::Png => "png",
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileFormat {
    type Err = DeepZoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" => Ok(TileFormat::Jpeg),
            "png" => Ok(TileFormat::Png),
            other => Err(DeepZoomError::InvalidArgument(format!(
                "unsupported tile format '{other}' (expected 'jpeg' or 'png')"
            ))),
        }
    }
}

/// Render the DZI XML descriptor.
///
/// # Example Output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Image TileSize="254" Overlap="1" Format="jpeg" xmlns="http://schemas.microsoft.com/deepzoom/2008"><Size Width="46920" Height="33600"/></Image>
/// ```
pub fn generate_dzi_xml(
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    format: TileFormat,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Image TileSize="{tile_size}" Overlap="{overlap}" Format="{format}" xmlns="{DZI_NAMESPACE}"><Size Width="{width}" Height="{height}"/></Image>"#
    )
}

/// File name of a tile within its level directory, e.g. `3_5.jpeg`.
pub fn tile_file_name(column: u32, row: u32, format: TileFormat) -> String {
    format!("{column}_{row}.{format}")
}
