//! Shadow Node Definitions
//!
//! Build-time description and validation of shadow nodes. A shadow node is
//! a self-contained producer of shadow map textures: authors declare one
//! shadow texture definition per light (and per cascade split for
//! parallel-split techniques) plus the target passes that render them, and
//! validation turns that into a cross-checked, execution-ready definition.
//!
//! # Architecture
//!
//! The module is split into:
//!
//! - **Definition**: one shadow map slot with its technique, atlas
//!   sub-rectangle, and cascade parameters
//! - **Node**: the authoring registry built on [`crate::node::NodeDef`],
//!   rejecting input channels and duplicate light/split pairs
//! - **Finalize**: the validation engine that propagates atlas viewports,
//!   accumulates per-light category masks, and resolves which definitions
//!   can share a camera setup
//!
//! # Usage
//!
//! ```ignore
//! use umbra_compositor::prelude::*;
//! use glam::Vec2;
//!
//! let mut node = ShadowNodeDef::new("shadows");
//! node.add_texture_definition(TextureDef::depth("atlas", 4096, 4096))?;
//!
//! // Three cascades for the sun, one map for a spot light, all atlased.
//! node.reserve_definitions(4);
//! node.set_default_technique(ShadowMapTechnique::Pssm);
//! let maps = [
//!     node.add_definition(0, 0, "atlas", 0, Vec2::ZERO, Vec2::splat(0.5), 0)?,
//!     node.add_definition(0, 1, "atlas", 0, Vec2::new(0.5, 0.0), Vec2::splat(0.5), 0)?,
//!     node.add_definition(0, 2, "atlas", 0, Vec2::new(0.0, 0.5), Vec2::splat(0.5), 0)?,
//! ];
//! node.set_default_technique(ShadowMapTechnique::Focused);
//! let spot = node.add_definition(1, 0, "atlas", 0, Vec2::splat(0.5), Vec2::splat(0.5), 0)?;
//!
//! // One target per map, each clearing and rendering its sub-rect.
//! for handle in maps.iter().copied().chain([spot]) {
//!     let target = node.add_target_pass("atlas")?;
//!     node.add_pass(target, PassKind::Clear)?.shadow_map = Some(handle);
//!     let pass = node.add_pass(target, PassKind::Scene(Default::default()))?;
//!     pass.shadow_map = Some(handle);
//!     node.set_shadow_map_supported_light_types(target, LightTypeMask::ALL)?;
//! }
//!
//! node.finalize()?;
//! assert!(node.is_finalized());
//! ```

pub mod definition;
pub mod finalize;
pub mod node;

pub use definition::{
    ShadowMapHandle, ShadowMapTechnique, ShadowTextureDefinition, MAX_PSSM_SPLITS,
};
pub use node::ShadowNodeDef;
