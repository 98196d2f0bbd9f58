//! Reserved visibility-mask layers
//!
//! The renderer reserves the two high bits of the 32-bit visibility mask
//! for engine-managed layers. User-defined visibility groups use the
//! remaining bits.

/// Objects that render into shadow maps
pub const LAYER_SHADOW_CASTER: u32 = 1 << 31;

/// General visibility toggle layer
pub const LAYER_VISIBILITY: u32 = 1 << 30;

/// Bits managed by the engine
pub const RESERVED_LAYERS: u32 = LAYER_SHADOW_CASTER | LAYER_VISIBILITY;

/// Bits available for user visibility groups
pub const USER_VISIBILITY_MASK: u32 = !RESERVED_LAYERS;
