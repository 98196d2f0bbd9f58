//! Shadow node validation and finalization
//!
//! Once authoring is done a [`ShadowNodeDef`] goes through a single
//! finalization pass that normalizes every target pass, derives the
//! per-light type masks and render queue bounds, and links definitions
//! that can share frustum setup. Fatal findings abort with an error and
//! the node should be discarded; recoverable ones are auto-corrected and
//! reported through the [`WarningSink`].

use umbra_core::{visibility, LightTypeMask};

use crate::diag::{LogWarningSink, WarningSink};
use crate::error::{CompositorError, CompositorResult};
use crate::pass::{ShadowRecalculation, ViewportRect};

use super::definition::ShadowMapTechnique;
use super::node::ShadowNodeDef;

#[cfg(not(feature = "unlimited-splits"))]
use super::definition::MAX_PSSM_SPLITS;

impl ShadowNodeDef {
    /// Validate and freeze the node, reporting warnings to the log facade
    pub fn finalize(&mut self) -> CompositorResult<()> {
        let mut sink = LogWarningSink;
        self.finalize_with(&mut sink)
    }

    /// Validate and freeze the node, reporting warnings to `sink`
    ///
    /// Runs exactly once per node. On success the node is frozen: the
    /// authoring methods fail, [`definition_mut`](Self::definition_mut)
    /// returns `None`, and the derived state (light type masks, render
    /// queue bounds, setup sharing links) becomes readable. On failure the
    /// node stays unfrozen but may hold partially normalized passes, so it
    /// is only good for discarding.
    pub fn finalize_with(&mut self, sink: &mut dyn WarningSink) -> CompositorResult<()> {
        if self.finalized {
            return Err(CompositorError::invalid_configuration(
                format!("shadow node '{}' is already finalized", self.base.name),
                "ShadowNodeDef::finalize",
            ));
        }

        // Light indices may be sparse; size for the highest one referenced.
        let light_slots = self
            .definitions
            .iter()
            .map(|def| def.light + 1)
            .max()
            .unwrap_or(0);
        self.light_types_mask = vec![LightTypeMask::NONE; light_slots];

        self.normalize_target_passes(sink)?;
        self.link_shared_setups(sink)?;

        self.finalized = true;
        Ok(())
    }

    /// Walk every pass of every target in declaration order, fixing up
    /// shadow-specific state and accumulating per-light coverage
    fn normalize_target_passes(&mut self, sink: &mut dyn WarningSink) -> CompositorResult<()> {
        let node_name = self.base.name.clone();
        let definitions = &self.definitions;

        for target in self.base.targets.iter_mut() {
            for pass_index in 0..target.passes.len() {
                {
                    let pass = &mut target.passes[pass_index];
                    if pass.include_overlays {
                        sink.warn(&format!(
                            "a pass in shadow node '{node_name}' has overlays enabled, \
                             disabling them"
                        ));
                    }
                    pass.include_overlays = false;
                }

                let shadow_map = target.passes[pass_index].shadow_map;
                if let Some(def) = shadow_map.and_then(|handle| definitions.get(handle.index())) {
                    let full_viewport = target.passes[pass_index].shadow_map_full_viewport;
                    if *target.render_target_name() == def.texture_name && !full_viewport {
                        // The pass renders into this map's atlas slot, so the
                        // declared UV region is the viewport.
                        let pass = &mut target.passes[pass_index];
                        pass.viewport = ViewportRect::new(
                            def.uv_offset.x,
                            def.uv_offset.y,
                            def.uv_length.x,
                            def.uv_length.y,
                        );
                        pass.scissor = pass.viewport;
                    }

                    if def.technique == ShadowMapTechnique::Pssm {
                        // Cascades only make sense for directional lights.
                        target.set_shadow_map_supported_light_types(LightTypeMask::DIRECTIONAL);
                    } else if target.shadow_map_supported_light_types().is_empty() {
                        return Err(CompositorError::invalid_configuration(
                            format!(
                                "target '{}' in shadow node '{node_name}' renders shadow map \
                                 '{}' but accepts no light types, did you forget to call \
                                 set_shadow_map_supported_light_types?",
                                target.render_target_name(),
                                def.texture_name
                            ),
                            "ShadowNodeDef::finalize",
                        ));
                    }

                    self.light_types_mask[def.light] |=
                        target.shadow_map_supported_light_types();
                }

                if let Some(scene) = target.passes[pass_index].scene_mut() {
                    self.min_rq = self.min_rq.min(scene.first_rq);
                    self.max_rq = self.max_rq.max(scene.last_rq);

                    // Without a dedicated LOD camera the caster pass reuses
                    // the receiver pass' LOD lists.
                    if scene.lod_camera_name.is_none() {
                        scene.update_lod_lists = false;
                    }

                    scene.visibility_mask |= visibility::LAYER_SHADOW_CASTER;
                    scene.shadow_node = None;
                    scene.shadow_recalculation = ShadowRecalculation::CasterPass;
                }
            }
        }

        Ok(())
    }

    /// Link each definition to the first earlier one it can share frustum
    /// setup with
    ///
    /// Declaration order decides everything here: the first match wins, and
    /// split-count conflicts resolve in favor of the earlier definition.
    fn link_shared_setups(&mut self, sink: &mut dyn WarningSink) -> CompositorResult<()> {
        let node_name = self.base.name.clone();

        for current in 0..self.definitions.len() {
            let light = self.definitions[current].light;
            let split = self.definitions[current].split;
            let technique = self.definitions[current].technique;

            if split != 0 && !technique.is_cascaded() {
                return Err(CompositorError::invalid_configuration(
                    format!(
                        "shadow map '{}' in node '{node_name}' assigns split {split} to a \
                         technique without cascades",
                        self.definitions[current].texture_name
                    ),
                    "ShadowNodeDef::finalize",
                ));
            }

            #[cfg(not(feature = "unlimited-splits"))]
            if self.definitions[current].num_splits > MAX_PSSM_SPLITS {
                sink.warn(&format!(
                    "shadow map '{}' in node '{node_name}' requests {} splits, \
                     clamping to {MAX_PSSM_SPLITS}",
                    self.definitions[current].texture_name,
                    self.definitions[current].num_splits
                ));
                self.definitions[current].num_splits = MAX_PSSM_SPLITS;
            }

            let mut shared = false;
            let mut earlier = 0;
            while earlier < current && !shared {
                let candidate_light = self.definitions[earlier].light;
                let candidate_split = self.definitions[earlier].split;
                let candidate_technique = self.definitions[earlier].technique;

                if candidate_light == light {
                    if candidate_split == split {
                        // Probably a different technique covering the same
                        // light; do not share, keep scanning.
                        sink.warn(&format!(
                            "two shadow maps in node '{node_name}' cover light index {light} \
                             split {split}; ignore this if it is intentional"
                        ));
                    } else {
                        let forced_splits = self.definitions[earlier].num_splits;
                        if forced_splits != self.definitions[current].num_splits {
                            sink.warn(&format!(
                                "shadow maps for light index {light} in node '{node_name}' \
                                 disagree on split count, forcing {forced_splits}"
                            ));
                            self.definitions[current].num_splits = forced_splits;
                        }
                        self.definitions[current].shares_setup_with = Some(earlier);
                        shared = true;
                    }
                } else if candidate_technique == technique {
                    self.definitions[current].shares_setup_with = Some(earlier);
                    shared = true;
                }

                earlier += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use umbra_core::LightType;

    use super::*;
    use crate::diag::CaptureSink;
    use crate::error::ErrorKind;
    use crate::pass::{PassKind, ScenePassDef};
    use crate::shadow::{ShadowMapHandle, ShadowNodeDef};

    fn empty_node() -> ShadowNodeDef {
        ShadowNodeDef::new("shadows")
    }

    fn add_map(
        node: &mut ShadowNodeDef,
        light: usize,
        split: u32,
        name: &str,
    ) -> ShadowMapHandle {
        node.add_definition(light, split, name, 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap()
    }

    /// Target rendering one shadow map with a scene pass, supporting all
    /// light types
    fn node_with_caster_pass() -> (ShadowNodeDef, ShadowMapHandle) {
        let mut node = empty_node();
        node.reserve_definitions(1);
        let handle = node.add_definition(
            0,
            0,
            "atlas",
            0,
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, 0.5),
            0,
        )
        .unwrap();

        let target = node.add_target_pass("atlas").unwrap();
        node.set_shadow_map_supported_light_types(target, umbra_core::LightTypeMask::ALL)
            .unwrap();
        let pass = node
            .add_pass(target, PassKind::Scene(ScenePassDef::new("shadow_cam")))
            .unwrap();
        pass.shadow_map = Some(handle);

        (node, handle)
    }

    #[test]
    fn test_finalize_empty_node() {
        let mut node = empty_node();
        let mut sink = CaptureSink::new();

        node.finalize_with(&mut sink).unwrap();
        assert!(node.is_finalized());
        assert!(sink.is_empty());
        assert!(node.light_types_mask().is_empty());
        assert!(node.min_rq() > node.max_rq());
    }

    #[test]
    fn test_finalize_runs_once() {
        let mut node = empty_node();
        node.finalize().unwrap();

        let err = node.finalize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(err.message().contains("already finalized"));
    }

    #[test]
    fn test_finalized_node_is_frozen() {
        let mut node = empty_node();
        node.reserve_definitions(2);
        let handle = add_map(&mut node, 0, 0, "atlas");
        node.finalize().unwrap();

        assert!(node.definition_mut(handle).is_none());
        let err = node
            .add_definition(1, 0, "late", 0, Vec2::ZERO, Vec2::ONE, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(node.add_target_pass("late").is_err());
    }

    #[test]
    fn test_overlays_forced_off_with_warning() {
        let (mut node, _) = node_with_caster_pass();
        let mut sink = CaptureSink::new();

        node.finalize_with(&mut sink).unwrap();
        assert!(sink.contains("overlays enabled"));
        assert!(!node.targets()[0].passes()[0].include_overlays);
    }

    #[test]
    fn test_viewport_copied_from_atlas_slot() {
        let (mut node, _) = node_with_caster_pass();
        node.finalize().unwrap();

        let pass = &node.targets()[0].passes()[0];
        assert_eq!(pass.viewport, ViewportRect::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(pass.scissor, pass.viewport);
    }

    #[test]
    fn test_full_viewport_flag_skips_copy() {
        let (mut node, handle) = node_with_caster_pass();
        {
            let pass = node.add_pass(0, PassKind::Clear).unwrap();
            pass.shadow_map = Some(handle);
            pass.shadow_map_full_viewport = true;
        }
        node.finalize().unwrap();

        let pass = &node.targets()[0].passes()[1];
        assert_eq!(pass.viewport, ViewportRect::FULL);
    }

    #[test]
    fn test_viewport_untouched_when_target_differs() {
        let mut node = empty_node();
        node.reserve_definitions(1);
        let handle = node
            .add_definition(0, 0, "atlas", 0, Vec2::ZERO, Vec2::new(0.5, 0.5), 0)
            .unwrap();

        let target = node.add_target_pass("other_rt").unwrap();
        node.add_shadow_map_supported_light_type(target, LightType::Point)
            .unwrap();
        let pass = node.add_pass(target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(handle);

        node.finalize().unwrap();
        assert_eq!(node.targets()[0].passes()[0].viewport, ViewportRect::FULL);
    }

    #[test]
    fn test_out_of_range_handle_is_skipped() {
        let mut node = empty_node();
        let target = node.add_target_pass("atlas").unwrap();
        let pass = node.add_pass(target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(ShadowMapHandle::new(7));

        node.finalize().unwrap();
        assert!(node.light_types_mask().is_empty());
    }

    #[test]
    fn test_pssm_forces_directional_only() {
        let mut node = empty_node();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        node.reserve_definitions(1);
        let handle = add_map(&mut node, 0, 0, "cascades");

        let target = node.add_target_pass("cascades").unwrap();
        node.set_shadow_map_supported_light_types(target, umbra_core::LightTypeMask::ALL)
            .unwrap();
        let pass = node.add_pass(target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(handle);

        node.finalize().unwrap();
        assert_eq!(
            node.targets()[0].shadow_map_supported_light_types(),
            umbra_core::LightTypeMask::DIRECTIONAL
        );
        assert_eq!(node.light_types_mask()[0], umbra_core::LightTypeMask::DIRECTIONAL);
    }

    #[test]
    fn test_unclaimed_target_light_types_fatal() {
        let mut node = empty_node();
        node.reserve_definitions(1);
        let handle = add_map(&mut node, 0, 0, "atlas");

        let target = node.add_target_pass("atlas").unwrap();
        let pass = node.add_pass(target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(handle);

        let err = node.finalize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(err.message().contains("did you forget"));
        assert!(!node.is_finalized());
    }

    #[test]
    fn test_light_types_mask_accumulates_sparse_lights() {
        let mut node = empty_node();
        node.reserve_definitions(2);
        let near = add_map(&mut node, 0, 0, "near");
        let far = add_map(&mut node, 4, 0, "far");

        let spot_target = node.add_target_pass("near").unwrap();
        node.add_shadow_map_supported_light_type(spot_target, LightType::Spot)
            .unwrap();
        let pass = node.add_pass(spot_target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(near);

        let point_target = node.add_target_pass("near").unwrap();
        node.add_shadow_map_supported_light_type(point_target, LightType::Point)
            .unwrap();
        let pass = node.add_pass(point_target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(near);

        let far_target = node.add_target_pass("far").unwrap();
        node.add_shadow_map_supported_light_type(far_target, LightType::Directional)
            .unwrap();
        let pass = node.add_pass(far_target, PassKind::Clear).unwrap();
        pass.shadow_map = Some(far);

        node.finalize().unwrap();

        let masks = node.light_types_mask();
        assert_eq!(masks.len(), 5);
        assert_eq!(
            masks[0],
            umbra_core::LightTypeMask::SPOT | umbra_core::LightTypeMask::POINT
        );
        assert_eq!(masks[1], umbra_core::LightTypeMask::NONE);
        assert_eq!(masks[4], umbra_core::LightTypeMask::DIRECTIONAL);
    }

    #[test]
    fn test_scene_passes_are_rewritten_for_casting() {
        let (mut node, _) = node_with_caster_pass();
        {
            let scene = node.targets()[0].passes()[0].scene().unwrap().clone();
            assert!(scene.update_lod_lists);
        }
        node.finalize().unwrap();

        let scene = node.targets()[0].passes()[0].scene().unwrap();
        assert!(!scene.update_lod_lists);
        assert_ne!(scene.visibility_mask & visibility::LAYER_SHADOW_CASTER, 0);
        assert!(scene.shadow_node.is_none());
        assert_eq!(scene.shadow_recalculation, ShadowRecalculation::CasterPass);
    }

    #[test]
    fn test_scene_pass_with_lod_camera_keeps_lod_updates() {
        let (mut node, handle) = node_with_caster_pass();
        {
            let mut scene = ScenePassDef::new("shadow_cam");
            scene.lod_camera_name = Some("lod_cam".into());
            let pass = node.add_pass(0, PassKind::Scene(scene)).unwrap();
            pass.shadow_map = Some(handle);
        }
        node.finalize().unwrap();

        assert!(node.targets()[0].passes()[1].scene().unwrap().update_lod_lists);
    }

    #[test]
    fn test_render_queue_bounds_span_scene_passes() {
        let (mut node, handle) = node_with_caster_pass();
        {
            let mut scene = ScenePassDef::new("shadow_cam");
            scene.first_rq = 10;
            scene.last_rq = 90;
            let pass = node.add_pass(0, PassKind::Scene(scene)).unwrap();
            pass.shadow_map = Some(handle);
        }
        {
            let mut scene = ScenePassDef::new("shadow_cam");
            scene.first_rq = 5;
            scene.last_rq = 40;
            let pass = node.add_pass(0, PassKind::Scene(scene)).unwrap();
            pass.shadow_map = Some(handle);
        }
        node.finalize().unwrap();

        assert_eq!(node.min_rq(), 0);
        assert_eq!(node.max_rq(), u8::MAX);

        let mut bounded = empty_node();
        let target = bounded.add_target_pass("rt").unwrap();
        let mut scene = ScenePassDef::new("cam");
        scene.first_rq = 10;
        scene.last_rq = 90;
        bounded.add_pass(target, PassKind::Scene(scene)).unwrap();
        bounded.finalize().unwrap();

        assert_eq!(bounded.min_rq(), 10);
        assert_eq!(bounded.max_rq(), 90);
    }

    #[test]
    fn test_split_requires_cascaded_technique() {
        let mut node = empty_node();
        node.reserve_definitions(2);
        add_map(&mut node, 0, 0, "a");
        add_map(&mut node, 0, 1, "b");

        let err = node.finalize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(err.message().contains("cascades"));
    }

    #[cfg(not(feature = "unlimited-splits"))]
    #[test]
    fn test_excess_splits_clamped() {
        let mut node = empty_node();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        node.reserve_definitions(1);
        let handle = add_map(&mut node, 0, 0, "cascades");
        node.definition_mut(handle).unwrap().num_splits = 9;

        let mut sink = CaptureSink::new();
        node.finalize_with(&mut sink).unwrap();

        assert!(sink.contains("clamping to 5"));
        assert_eq!(node.definition(handle).unwrap().num_splits, MAX_PSSM_SPLITS);
    }

    #[test]
    fn test_same_light_shares_setup_and_split_count() {
        let mut node = empty_node();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        node.reserve_definitions(2);
        let first = add_map(&mut node, 0, 0, "c0");
        let second = add_map(&mut node, 0, 1, "c1");
        node.definition_mut(first).unwrap().num_splits = 4;

        let mut sink = CaptureSink::new();
        node.finalize_with(&mut sink).unwrap();

        assert!(sink.contains("disagree on split count"));
        assert_eq!(node.definition(second).unwrap().num_splits, 4);
        assert_eq!(node.definition(second).unwrap().shares_setup_with(), Some(0));
        assert_eq!(node.definition(first).unwrap().shares_setup_with(), None);
    }

    #[test]
    fn test_same_technique_shares_across_lights() {
        let mut node = empty_node();
        node.reserve_definitions(3);
        add_map(&mut node, 0, 0, "a");
        node.set_default_technique(ShadowMapTechnique::Focused);
        let focused = add_map(&mut node, 1, 0, "b");
        let other = add_map(&mut node, 2, 0, "c");

        node.finalize().unwrap();

        // "b" cannot share with the uniform map; "c" shares with "b".
        assert_eq!(node.definition(focused).unwrap().shares_setup_with(), None);
        assert_eq!(node.definition(other).unwrap().shares_setup_with(), Some(1));
    }

    #[test]
    fn test_same_light_beats_same_technique() {
        let mut node = empty_node();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        node.reserve_definitions(3);
        add_map(&mut node, 1, 0, "a");
        add_map(&mut node, 2, 0, "b");
        let last = add_map(&mut node, 1, 1, "c");

        node.finalize().unwrap();

        // "c" matches "a" by technique first in scan order, but also by
        // light; the scan stops at "a" either way and records index 0.
        assert_eq!(node.definition(last).unwrap().shares_setup_with(), Some(0));
    }

    #[test]
    fn test_duplicate_light_split_after_tuning_warns() {
        let mut node = empty_node();
        node.set_default_technique(ShadowMapTechnique::Pssm);
        node.reserve_definitions(2);
        add_map(&mut node, 0, 0, "a");
        let second = add_map(&mut node, 0, 1, "b");
        node.definition_mut(second).unwrap().split = 0;

        let mut sink = CaptureSink::new();
        node.finalize_with(&mut sink).unwrap();

        assert!(sink.contains("ignore this if it is intentional"));
        assert_eq!(node.definition(second).unwrap().shares_setup_with(), None);
    }
}
