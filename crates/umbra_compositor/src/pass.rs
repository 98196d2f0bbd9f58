//! Pass definitions attached to target pass groups

use serde::{Deserialize, Serialize};
use umbra_core::{visibility, NamedId};

use crate::shadow::ShadowMapHandle;

/// Normalized viewport rectangle in [0, 1] space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl ViewportRect {
    /// Covers the whole render target
    pub const FULL: Self = Self {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Create a rectangle from normalized coordinates
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// How a scene pass refreshes its shadow node before rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowRecalculation {
    /// Recompute the shadow node every time the pass runs
    Recalculate,
    /// Reuse whatever the shadow node last produced
    Reuse,
    /// Recompute only the first time the pass runs per frame
    FirstOnly,
    /// The pass is itself a shadow caster pass and never triggers
    /// nested shadow computation
    CasterPass,
}

impl Default for ShadowRecalculation {
    fn default() -> Self {
        Self::Recalculate
    }
}

/// Scene-rendering pass payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenePassDef {
    /// Camera the scene is rendered from
    pub camera_name: Option<NamedId>,
    /// Camera used for LOD selection when it differs from the render camera
    pub lod_camera_name: Option<NamedId>,
    /// Recompute LOD lists instead of reusing the previous pass's lists
    pub update_lod_lists: bool,
    /// Visibility groups this pass renders
    pub visibility_mask: u32,
    /// First render queue included by this pass
    pub first_rq: u8,
    /// Last render queue included by this pass
    pub last_rq: u8,
    /// Shadow node providing shadows for this pass
    pub shadow_node: Option<NamedId>,
    /// Shadow node refresh policy
    pub shadow_recalculation: ShadowRecalculation,
}

impl ScenePassDef {
    /// Create a scene pass rendered from the given camera
    pub fn new(camera_name: &str) -> Self {
        Self {
            camera_name: Some(NamedId::new(camera_name)),
            ..Default::default()
        }
    }

    /// Set the visibility mask, keeping engine-reserved layer bits clear
    pub fn set_visibility_mask(&mut self, mask: u32) {
        self.visibility_mask = mask & visibility::USER_VISIBILITY_MASK;
    }
}

impl Default for ScenePassDef {
    fn default() -> Self {
        Self {
            camera_name: None,
            lod_camera_name: None,
            update_lod_lists: true,
            visibility_mask: visibility::USER_VISIBILITY_MASK,
            first_rq: 0,
            last_rq: u8::MAX,
            shadow_node: None,
            shadow_recalculation: ShadowRecalculation::Recalculate,
        }
    }
}

/// Fullscreen quad pass payload
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuadPassDef {
    /// Material used to shade the quad
    pub material_name: Option<NamedId>,
    /// Render an actual quad instead of a fullscreen triangle
    pub use_quad: bool,
}

impl QuadPassDef {
    /// Create a quad pass shaded by the given material
    pub fn new(material_name: &str) -> Self {
        Self {
            material_name: Some(NamedId::new(material_name)),
            use_quad: false,
        }
    }
}

/// Pass payload by kind
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PassKind {
    /// Clear the target
    Clear,
    /// Fullscreen quad or triangle
    Quad(QuadPassDef),
    /// Scene geometry render
    Scene(ScenePassDef),
}

/// A single pass attached to a target
///
/// Common configuration shared by all pass kinds. Scene passes rendered from
/// regular nodes include overlays by default; shadow node validation forces
/// overlays off.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PassDef {
    /// Kind-specific payload
    pub kind: PassKind,
    /// Workspace execution mask this pass responds to
    pub execution_mask: u8,
    /// Workspace viewport-modifier mask this pass responds to
    pub viewport_modifier_mask: u8,
    /// Composite overlay elements after the pass
    pub include_overlays: bool,
    /// Normalized viewport
    pub viewport: ViewportRect,
    /// Normalized scissor rectangle
    pub scissor: ViewportRect,
    /// Shadow map definition this pass renders, when under a shadow node
    pub shadow_map: Option<ShadowMapHandle>,
    /// Keep the author-set viewport instead of the shadow map atlas sub-rect
    pub shadow_map_full_viewport: bool,
    /// Author-assigned identifier for debugging and profiling hooks
    pub identifier: u32,
}

impl PassDef {
    /// Create a pass with the defaults for its kind
    pub fn new(kind: PassKind) -> Self {
        let include_overlays = matches!(kind, PassKind::Scene(_));
        Self {
            kind,
            execution_mask: 0xFF,
            viewport_modifier_mask: 0xFF,
            include_overlays,
            viewport: ViewportRect::FULL,
            scissor: ViewportRect::FULL,
            shadow_map: None,
            shadow_map_full_viewport: false,
            identifier: 0,
        }
    }

    /// Get the scene payload if this is a scene pass
    pub fn scene(&self) -> Option<&ScenePassDef> {
        match &self.kind {
            PassKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Get the mutable scene payload if this is a scene pass
    pub fn scene_mut(&mut self) -> Option<&mut ScenePassDef> {
        match &mut self.kind {
            PassKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }
}
