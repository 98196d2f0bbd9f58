//! Shadow node authoring

use glam::Vec2;
use umbra_core::{LightType, LightTypeMask, NamedId};

use crate::error::{CompositorError, CompositorResult};
use crate::node::{NodeDef, TextureSource, GLOBAL_TEXTURE_PREFIX};
use crate::pass::{PassDef, PassKind};
use crate::resource::TextureDef;
use crate::target::TargetDef;

use super::definition::{ShadowMapHandle, ShadowMapTechnique, ShadowTextureDefinition};

/// A shadow node definition
///
/// Wraps a generic [`NodeDef`] and owns the ordered shadow texture
/// definition registry. Shadow nodes are pure producers: they render every
/// shadow map they declare and accept no input channels.
///
/// Authoring is incremental. Reserve the definition count, add definitions
/// and target passes, then call [`finalize`](Self::finalize) exactly once;
/// afterwards the node is immutable and its derived state is readable.
#[derive(Clone, Debug)]
pub struct ShadowNodeDef {
    pub(crate) base: NodeDef,
    pub(crate) definitions: Vec<ShadowTextureDefinition>,
    reserved_definitions: usize,
    num_lights: usize,
    pub(crate) light_types_mask: Vec<LightTypeMask>,
    pub(crate) min_rq: u8,
    pub(crate) max_rq: u8,
    default_technique: ShadowMapTechnique,
    pub(crate) finalized: bool,
}

impl ShadowNodeDef {
    /// Create an empty shadow node definition
    pub fn new(name: &str) -> Self {
        Self {
            base: NodeDef::new(name),
            definitions: Vec::new(),
            reserved_definitions: 0,
            num_lights: 0,
            light_types_mask: Vec::new(),
            min_rq: u8::MAX,
            max_rq: 0,
            default_technique: ShadowMapTechnique::Uniform,
            finalized: false,
        }
    }

    /// Get the node name
    #[inline]
    pub fn name(&self) -> &NamedId {
        self.base.name()
    }

    /// Get the underlying generic node definition
    #[inline]
    pub fn base(&self) -> &NodeDef {
        &self.base
    }

    fn ensure_mutable(&self, operation: &'static str) -> CompositorResult<()> {
        if self.finalized {
            return Err(CompositorError::invalid_configuration(
                format!("shadow node '{}' is already finalized", self.base.name),
                operation,
            ));
        }
        Ok(())
    }

    /// Register a texture name against a channel index and source
    ///
    /// Shadow nodes refuse [`TextureSource::Input`]; their textures are
    /// always produced locally or shared globally. Local channel indices
    /// are offset past the shadow map definitions, which occupy the first
    /// slots of the node's texture space.
    pub fn add_texture_source_name(
        &mut self,
        name: &str,
        index: usize,
        source: TextureSource,
    ) -> CompositorResult<NamedId> {
        self.ensure_mutable("ShadowNodeDef::add_texture_source_name")?;
        if source == TextureSource::Input {
            return Err(CompositorError::unsupported_input(
                format!(
                    "shadow nodes do not support input channels (shadow node '{}')",
                    self.base.name
                ),
                "ShadowNodeDef::add_texture_source_name",
            ));
        }

        self.base
            .add_texture_source_name(name, self.definitions.len() + index, source)
    }

    /// Buffer inputs are never accepted on shadow nodes
    pub fn add_buffer_input(&mut self, _channel: usize, _name: NamedId) -> CompositorResult<()> {
        Err(CompositorError::unsupported_input(
            format!(
                "shadow nodes do not support input channels (shadow node '{}')",
                self.base.name
            ),
            "ShadowNodeDef::add_buffer_input",
        ))
    }

    /// Declare a node-local texture
    pub fn add_texture_definition(&mut self, def: TextureDef) -> CompositorResult<()> {
        self.ensure_mutable("ShadowNodeDef::add_texture_definition")?;
        self.add_texture_source_name(
            def.name.name(),
            self.base.local_textures.len(),
            TextureSource::Local,
        )?;
        self.base.local_textures.push(def);
        Ok(())
    }

    /// Reserve storage for the shadow texture definitions
    ///
    /// Handles returned by [`add_definition`](Self::add_definition) index an
    /// append-only collection; the reservation is the hard bound on how many
    /// definitions the node may hold, and insertions past it fail with
    /// [`ErrorKind::CapacityExceeded`](crate::error::ErrorKind::CapacityExceeded).
    pub fn reserve_definitions(&mut self, count: usize) {
        self.definitions.reserve(count);
        self.reserved_definitions = count;
    }

    /// Technique assigned to definitions added from now on
    pub fn set_default_technique(&mut self, technique: ShadowMapTechnique) {
        self.default_technique = technique;
    }

    /// Get the technique assigned to new definitions
    #[inline]
    pub fn default_technique(&self) -> ShadowMapTechnique {
        self.default_technique
    }

    /// Register one shadow map slot
    ///
    /// The definition inherits the current default technique; tune it
    /// afterwards through [`definition_mut`](Self::definition_mut). Fails if
    /// the name is empty or reserved, the `(light, split)` pair is already
    /// taken, or the reserved capacity is exhausted. Nothing is inserted on
    /// failure.
    #[allow(clippy::too_many_arguments)]
    pub fn add_definition(
        &mut self,
        light: usize,
        split: u32,
        name: &str,
        mrt_index: u8,
        uv_offset: Vec2,
        uv_length: Vec2,
        array_index: u8,
    ) -> CompositorResult<ShadowMapHandle> {
        self.ensure_mutable("ShadowNodeDef::add_definition")?;

        if name.is_empty() {
            return Err(CompositorError::invalid_configuration(
                format!("shadow map textures cannot have empty names (light index {light})"),
                "ShadowNodeDef::add_definition",
            ));
        }
        if name.starts_with(GLOBAL_TEXTURE_PREFIX) {
            return Err(CompositorError::invalid_configuration(
                format!("shadow maps cannot reference global textures (light index {light})"),
                "ShadowNodeDef::add_definition",
            ));
        }

        let mut new_light = true;
        for def in &self.definitions {
            if def.light == light {
                new_light = false;
                if def.split == split {
                    return Err(CompositorError::duplicate_definition(
                        format!(
                            "a shadow map for light index {light} split {split} already exists \
                             in node '{}'",
                            self.base.name
                        ),
                        "ShadowNodeDef::add_definition",
                    ));
                }
            }
        }

        if self.definitions.len() >= self.reserved_definitions {
            return Err(CompositorError::capacity_exceeded(
                format!(
                    "shadow node '{}' reserved {} definitions, reserve more before adding",
                    self.base.name, self.reserved_definitions
                ),
                "ShadowNodeDef::add_definition",
            ));
        }

        if new_light {
            self.num_lights += 1;
        }

        let handle = ShadowMapHandle::new(self.definitions.len() as u32);
        self.definitions.push(ShadowTextureDefinition::new(
            self.default_technique,
            name,
            mrt_index,
            uv_offset,
            uv_length,
            array_index,
            light,
            split,
        ));

        Ok(handle)
    }

    /// Get the shadow texture definitions in declaration order
    #[inline]
    pub fn definitions(&self) -> &[ShadowTextureDefinition] {
        &self.definitions
    }

    /// Get one definition by handle
    pub fn definition(&self, handle: ShadowMapHandle) -> Option<&ShadowTextureDefinition> {
        self.definitions.get(handle.index())
    }

    /// Get one definition mutably for post-add tuning
    ///
    /// Returns `None` once the node is finalized.
    pub fn definition_mut(
        &mut self,
        handle: ShadowMapHandle,
    ) -> Option<&mut ShadowTextureDefinition> {
        if self.finalized {
            return None;
        }
        self.definitions.get_mut(handle.index())
    }

    /// Number of distinct lights the definitions reference
    #[inline]
    pub fn num_lights(&self) -> usize {
        self.num_lights
    }

    /// Apply shadow node defaults to a freshly created pass
    ///
    /// Shadow passes always execute and ignore workspace viewport
    /// modifiers; their viewports are derived from the atlas layout.
    pub fn post_initialize_pass_def(pass: &mut PassDef) {
        pass.execution_mask = 0xFF;
        pass.viewport_modifier_mask = 0x00;
    }

    /// Append a target pass group, returning its index
    pub fn add_target_pass(&mut self, render_target_name: &str) -> CompositorResult<usize> {
        self.ensure_mutable("ShadowNodeDef::add_target_pass")?;
        Ok(self.base.add_target_pass(render_target_name))
    }

    /// Append a pass to the given target
    ///
    /// Every pass attached under a shadow node is routed through
    /// [`post_initialize_pass_def`](Self::post_initialize_pass_def).
    pub fn add_pass(&mut self, target: usize, kind: PassKind) -> CompositorResult<&mut PassDef> {
        self.ensure_mutable("ShadowNodeDef::add_pass")?;
        let pass = self.base.add_pass(target, kind)?;
        Self::post_initialize_pass_def(pass);
        Ok(pass)
    }

    /// Replace the light categories a target claims to support
    pub fn set_shadow_map_supported_light_types(
        &mut self,
        target: usize,
        mask: LightTypeMask,
    ) -> CompositorResult<()> {
        self.ensure_mutable("ShadowNodeDef::set_shadow_map_supported_light_types")?;
        let target =
            self.target_mut(target, "ShadowNodeDef::set_shadow_map_supported_light_types")?;
        target.set_shadow_map_supported_light_types(mask);
        Ok(())
    }

    /// Add one light category to a target's supported set
    pub fn add_shadow_map_supported_light_type(
        &mut self,
        target: usize,
        light_type: LightType,
    ) -> CompositorResult<()> {
        self.ensure_mutable("ShadowNodeDef::add_shadow_map_supported_light_type")?;
        let target =
            self.target_mut(target, "ShadowNodeDef::add_shadow_map_supported_light_type")?;
        target.add_shadow_map_supported_light_type(light_type);
        Ok(())
    }

    fn target_mut(
        &mut self,
        target: usize,
        operation: &'static str,
    ) -> CompositorResult<&mut TargetDef> {
        let count = self.base.targets.len();
        self.base.targets.get_mut(target).ok_or_else(|| {
            CompositorError::invalid_configuration(
                format!("target index {target} is out of range ({count} targets)"),
                operation,
            )
        })
    }

    /// Get the target pass groups in declaration order
    #[inline]
    pub fn targets(&self) -> &[TargetDef] {
        self.base.targets()
    }

    /// Light categories serviced per light index
    ///
    /// Sized and filled during finalization; empty before.
    #[inline]
    pub fn light_types_mask(&self) -> &[LightTypeMask] {
        &self.light_types_mask
    }

    /// Smallest render queue any scene pass includes
    ///
    /// Greater than [`max_rq`](Self::max_rq) when the node has no scene
    /// passes.
    #[inline]
    pub fn min_rq(&self) -> u8 {
        self.min_rq
    }

    /// Largest render queue any scene pass includes
    #[inline]
    pub fn max_rq(&self) -> u8 {
        self.max_rq
    }

    /// Check whether validation completed successfully
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pass::ScenePassDef;

    fn node_with_capacity(count: usize) -> ShadowNodeDef {
        let mut node = ShadowNodeDef::new("shadows");
        node.reserve_definitions(count);
        node
    }

    #[test]
    fn test_input_channels_rejected() {
        let mut node = ShadowNodeDef::new("shadows");
        let err = node
            .add_texture_source_name("rt_external", 0, TextureSource::Input)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
        assert!(err.message().contains("shadows"));
        assert_eq!(node.base().num_input_channels(), 0);
    }

    #[test]
    fn test_buffer_inputs_rejected() {
        let mut node = ShadowNodeDef::new("shadows");
        let err = node
            .add_buffer_input(0, NamedId::new("particles"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
        assert!(node.base().buffer_inputs().is_empty());
    }

    #[test]
    fn test_local_channels_offset_past_definitions() {
        let mut node = node_with_capacity(2);
        node.add_definition(0, 0, "atlas", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap();
        node.add_definition(1, 0, "atlas2", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap();

        let id = node
            .add_texture_source_name("rt_aux", 0, TextureSource::Local)
            .unwrap();
        let binding = node.base().texture_source(&id).unwrap();
        assert_eq!(binding.index, 2);
    }

    #[test]
    fn test_add_definition_counts_distinct_lights() {
        let mut node = node_with_capacity(3);
        node.add_definition(0, 0, "a", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();
        node.add_definition(0, 1, "b", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();
        node.add_definition(4, 0, "c", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();

        assert_eq!(node.num_lights(), 2);
        assert_eq!(node.definitions().len(), 3);
    }

    #[test]
    fn test_add_definition_rejects_empty_name() {
        let mut node = node_with_capacity(1);
        let err = node
            .add_definition(0, 0, "", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(node.definitions().is_empty());
        assert_eq!(node.num_lights(), 0);
    }

    #[test]
    fn test_add_definition_rejects_global_prefix() {
        let mut node = node_with_capacity(1);
        let err = node
            .add_definition(0, 0, "global_atlas", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(node.definitions().is_empty());
    }

    #[test]
    fn test_add_definition_rejects_duplicate_light_split() {
        let mut node = node_with_capacity(2);
        node.add_definition(1, 2, "a", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();
        let err = node
            .add_definition(1, 2, "b", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateDefinition);
        assert_eq!(node.definitions().len(), 1);
        assert_eq!(node.num_lights(), 1);
    }

    #[test]
    fn test_add_definition_respects_capacity() {
        let mut node = node_with_capacity(1);
        node.add_definition(0, 0, "a", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();
        let err = node
            .add_definition(1, 0, "b", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(node.definitions().len(), 1);
        assert_eq!(node.num_lights(), 1);

        node.reserve_definitions(2);
        node.add_definition(1, 0, "b", 0, Vec2::ZERO, Vec2::ONE, 0).unwrap();
        assert_eq!(node.definitions().len(), 2);
    }

    #[test]
    fn test_definitions_inherit_default_technique() {
        let mut node = node_with_capacity(2);
        let uniform = node
            .add_definition(0, 0, "a", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        let pssm = node
            .add_definition(1, 0, "b", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap();

        assert_eq!(
            node.definition(uniform).unwrap().technique,
            ShadowMapTechnique::Uniform
        );
        assert_eq!(
            node.definition(pssm).unwrap().technique,
            ShadowMapTechnique::Pssm
        );
    }

    #[test]
    fn test_definition_mut_allows_tuning() {
        let mut node = node_with_capacity(1);
        let handle = node
            .add_definition(0, 0, "a", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap();

        node.definition_mut(handle).unwrap().num_splits = 4;
        assert_eq!(node.definition(handle).unwrap().num_splits, 4);
    }

    #[test]
    fn test_added_passes_get_shadow_defaults() {
        let mut node = ShadowNodeDef::new("shadows");
        let target = node.add_target_pass("atlas").unwrap();
        let pass = node
            .add_pass(target, PassKind::Scene(ScenePassDef::default()))
            .unwrap();

        assert_eq!(pass.execution_mask, 0xFF);
        assert_eq!(pass.viewport_modifier_mask, 0x00);
        // Overlay handling is validation's job, not the hook's.
        assert!(pass.include_overlays);
    }

    #[test]
    fn test_post_initialize_overrides_author_masks() {
        let mut pass = PassDef::new(PassKind::Clear);
        pass.execution_mask = 0x0F;
        pass.viewport_modifier_mask = 0xAB;

        ShadowNodeDef::post_initialize_pass_def(&mut pass);
        assert_eq!(pass.execution_mask, 0xFF);
        assert_eq!(pass.viewport_modifier_mask, 0x00);
    }

    #[test]
    fn test_target_light_types_setters() {
        let mut node = ShadowNodeDef::new("shadows");
        let target = node.add_target_pass("atlas").unwrap();

        node.add_shadow_map_supported_light_type(target, LightType::Spot)
            .unwrap();
        assert_eq!(
            node.targets()[target].shadow_map_supported_light_types(),
            LightTypeMask::SPOT
        );

        node.set_shadow_map_supported_light_types(target, LightTypeMask::ALL)
            .unwrap();
        assert_eq!(
            node.targets()[target].shadow_map_supported_light_types(),
            LightTypeMask::ALL
        );

        let err = node
            .set_shadow_map_supported_light_types(99, LightTypeMask::ALL)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}
