//! Node-local texture descriptions
//!
//! Abstract texture formats and sizing so node definitions can be compiled
//! against any graphics backend.

use serde::{Deserialize, Serialize};
use umbra_core::NamedId;

/// Texture format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 8-bit RGBA
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB encoded
    Rgba8UnormSrgb,
    /// 16-bit float RGBA
    Rgba16Float,
    /// 32-bit float single channel
    R32Float,
    /// 16-bit depth
    Depth16Unorm,
    /// 32-bit float depth
    Depth32Float,
    /// 24-bit depth with 8-bit stencil
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Check if this is a depth format
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm | Self::Depth32Float | Self::Depth24PlusStencil8
        )
    }

    /// Check if this format carries stencil bits
    pub fn is_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8)
    }
}

impl Default for TextureFormat {
    fn default() -> Self {
        Self::Rgba8Unorm
    }
}

/// A texture owned by one node
///
/// Width and height of 0 mean "match the final output target"; the factor
/// fields scale whichever dimension is derived that way.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextureDef {
    /// Texture name, unique within the owning node
    pub name: NamedId,
    /// Absolute width in texels, 0 to derive from the output target
    pub width: u32,
    /// Absolute height in texels, 0 to derive from the output target
    pub height: u32,
    /// Scale applied to a derived width
    pub width_factor: f32,
    /// Scale applied to a derived height
    pub height_factor: f32,
    /// Pixel format
    pub format: TextureFormat,
    /// MSAA sample count
    pub sample_count: u32,
}

impl TextureDef {
    /// Create a texture definition with explicit dimensions
    pub fn new(name: &str, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            name: NamedId::new(name),
            width,
            height,
            width_factor: 1.0,
            height_factor: 1.0,
            format,
            sample_count: 1,
        }
    }

    /// Create a depth texture suitable for shadow map rendering
    pub fn depth(name: &str, width: u32, height: u32) -> Self {
        Self::new(name, width, height, TextureFormat::Depth32Float)
    }
}
