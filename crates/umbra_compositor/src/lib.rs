//! # umbra_compositor - Compositor Node Definitions
//!
//! Data-driven definitions for Umbra's frame graph. This crate covers the
//! authoring and validation side only:
//! - Texture, target and pass definition types
//! - Generic node definitions with channel wiring
//! - Shadow node definitions with atlas layout and setup sharing
//! - One-shot validation with injectable warning reporting
//!
//! Definitions are compiled into live graph nodes by the runtime crates;
//! nothing in here touches the GPU.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Workspace graph compiler (runtime, not this crate)    │
//! ├────────────────────────────────────────────────────────┤
//! │  umbra_compositor (this crate)                         │
//! │  ├─ node: NodeDef, channel wiring                      │
//! │  ├─ shadow: ShadowNodeDef, finalization engine         │
//! │  ├─ target / pass / resource: plain definition data    │
//! │  └─ diag: WarningSink reporting                        │
//! ├────────────────────────────────────────────────────────┤
//! │  umbra_core (ids, light masks, visibility layers)      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use umbra_compositor::prelude::*;
//!
//! let mut node = ShadowNodeDef::new("shadows");
//! node.add_texture_definition(TextureDef::depth("atlas", 4096, 4096))?;
//! node.reserve_definitions(1);
//! let map = node.add_definition(0, 0, "atlas", 0, Vec2::ZERO, Vec2::ONE, 0)?;
//!
//! let target = node.add_target_pass("atlas")?;
//! node.set_shadow_map_supported_light_types(target, LightTypeMask::ALL)?;
//! node.add_pass(target, PassKind::Clear)?.shadow_map = Some(map);
//!
//! node.finalize()?;
//! ```

pub mod diag;
pub mod error;
pub mod node;
pub mod pass;
pub mod resource;
pub mod shadow;
pub mod target;

pub use diag::{CaptureSink, LogWarningSink, WarningSink};
pub use error::{CompositorError, CompositorResult, ErrorKind};
pub use node::{ChannelBinding, NodeDef, TextureSource, GLOBAL_TEXTURE_PREFIX};
pub use pass::{
    PassDef, PassKind, QuadPassDef, ScenePassDef, ShadowRecalculation, ViewportRect,
};
pub use resource::{TextureDef, TextureFormat};
pub use shadow::{
    ShadowMapHandle, ShadowMapTechnique, ShadowNodeDef, ShadowTextureDefinition,
    MAX_PSSM_SPLITS,
};
pub use target::TargetDef;

/// Re-export commonly used types
pub mod prelude {
    pub use glam::Vec2;
    pub use umbra_core::prelude::*;

    pub use crate::diag::{CaptureSink, LogWarningSink, WarningSink};
    pub use crate::error::{CompositorError, CompositorResult, ErrorKind};
    pub use crate::node::{NodeDef, TextureSource};
    pub use crate::pass::{PassDef, PassKind, ScenePassDef, ViewportRect};
    pub use crate::resource::{TextureDef, TextureFormat};
    pub use crate::shadow::{
        ShadowMapHandle, ShadowMapTechnique, ShadowNodeDef, ShadowTextureDefinition,
    };
    pub use crate::target::TargetDef;
}
