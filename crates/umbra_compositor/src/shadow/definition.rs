//! Shadow texture definitions

use glam::Vec2;
use serde::{Deserialize, Serialize};
use umbra_core::NamedId;

/// Maximum cascade splits one light's shadow map may declare
///
/// Split distances are packed into a float4 shader constant, which holds
/// the boundaries of up to 5 splits. Validation clamps higher counts unless
/// the `unlimited-splits` feature is enabled.
pub const MAX_PSSM_SPLITS: u32 = 5;

/// Shadow map projection technique
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowMapTechnique {
    /// Plain projection from the light's point of view
    Uniform,
    /// Projection skewed toward a plane of interest
    PlaneOptimal,
    /// Projection focused onto the visible receiver volume
    Focused,
    /// Parallel-split (cascaded) shadow maps, directional lights only
    Pssm,
}

impl ShadowMapTechnique {
    /// Check if this technique splits the frustum into cascades
    #[inline]
    pub const fn is_cascaded(self) -> bool {
        matches!(self, Self::Pssm)
    }
}

impl Default for ShadowMapTechnique {
    fn default() -> Self {
        Self::Uniform
    }
}

/// Stable handle to a shadow texture definition within one node
///
/// Handles are plain indices into the node's definition collection. The
/// collection is append-only while authoring and frozen after finalization,
/// so a handle stays valid for the compiled life of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowMapHandle(u32);

impl ShadowMapHandle {
    /// Create a handle from a definition index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the definition index
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One shadow map texture slot and its camera setup parameters
///
/// Several definitions may name the same texture, each claiming its own
/// `uv_offset`/`uv_length` sub-rectangle of the shared atlas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShadowTextureDefinition {
    /// Technique used to build the light's projection
    pub technique: ShadowMapTechnique,
    /// Texture this shadow map renders into
    pub texture_name: NamedId,
    /// Surface index for multi-target textures
    pub mrt_index: u8,
    /// Top-left of the atlas sub-rectangle, normalized
    pub uv_offset: Vec2,
    /// Size of the atlas sub-rectangle, normalized
    pub uv_length: Vec2,
    /// Texture array slice
    pub array_index: u8,
    /// Index of the light this map services
    pub light: usize,
    /// Cascade index, 0 when the technique is not cascaded
    pub split: u32,
    /// Cascade count for cascaded techniques
    pub num_splits: u32,
    /// Blend between linear and logarithmic split distribution
    pub pssm_lambda: f32,
    /// World units added around each split's frustum
    pub split_padding: f32,
    /// Fraction of each split blended into the next
    pub split_blend: f32,
    /// Fraction of the last split faded out
    pub split_fade: f32,
    /// Leading splits kept stable under camera rotation
    pub num_stable_splits: u32,
    #[serde(skip)]
    pub(crate) shares_setup_with: Option<usize>,
}

impl ShadowTextureDefinition {
    /// Create a definition with default cascade parameters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        technique: ShadowMapTechnique,
        texture_name: &str,
        mrt_index: u8,
        uv_offset: Vec2,
        uv_length: Vec2,
        array_index: u8,
        light: usize,
        split: u32,
    ) -> Self {
        Self {
            technique,
            texture_name: NamedId::new(texture_name),
            mrt_index,
            uv_offset,
            uv_length,
            array_index,
            light,
            split,
            num_splits: 3,
            pssm_lambda: 0.95,
            split_padding: 1.0,
            split_blend: 0.125,
            split_fade: 0.313,
            num_stable_splits: 0,
            shares_setup_with: None,
        }
    }

    /// Earlier-declared definition whose camera setup this one reuses
    ///
    /// Resolved during finalization. The index points into the same
    /// definition collection and carries no ownership.
    #[inline]
    pub fn shares_setup_with(&self) -> Option<usize> {
        self.shares_setup_with
    }
}
