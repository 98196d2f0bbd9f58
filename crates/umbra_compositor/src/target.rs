//! Target pass groups

use serde::{Deserialize, Serialize};
use umbra_core::{LightType, LightTypeMask, NamedId};

use crate::pass::{PassDef, PassKind};

/// An ordered group of passes rendering into one named target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetDef {
    render_target_name: NamedId,
    pub(crate) passes: Vec<PassDef>,
    pub(crate) shadow_map_supported_light_types: LightTypeMask,
}

impl TargetDef {
    /// Create an empty target group
    pub fn new(render_target_name: &str) -> Self {
        Self {
            render_target_name: NamedId::new(render_target_name),
            passes: Vec::new(),
            shadow_map_supported_light_types: LightTypeMask::NONE,
        }
    }

    /// Get the render target this group draws into
    #[inline]
    pub fn render_target_name(&self) -> &NamedId {
        &self.render_target_name
    }

    /// Get the passes in declaration order
    #[inline]
    pub fn passes(&self) -> &[PassDef] {
        &self.passes
    }

    /// Light categories whose shadow maps this target claims to render
    #[inline]
    pub fn shadow_map_supported_light_types(&self) -> LightTypeMask {
        self.shadow_map_supported_light_types
    }

    pub(crate) fn add_pass(&mut self, kind: PassKind) -> &mut PassDef {
        let index = self.passes.len();
        self.passes.push(PassDef::new(kind));
        &mut self.passes[index]
    }

    pub(crate) fn set_shadow_map_supported_light_types(&mut self, mask: LightTypeMask) {
        self.shadow_map_supported_light_types = mask;
    }

    pub(crate) fn add_shadow_map_supported_light_type(&mut self, light_type: LightType) {
        self.shadow_map_supported_light_types.insert(light_type.mask());
    }
}
