//! # umbra_core - Umbra Core Primitives
//!
//! Zero-dependency primitives shared by every Umbra crate:
//! - **Ids**: string identifiers with precomputed hashes
//! - **Lights**: light categories and their bitmask
//! - **Visibility**: reserved visibility-mask layers
//!
//! Everything here is plain data so higher layers stay backend-agnostic.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

pub mod id;
pub mod light;
pub mod visibility;

pub use id::*;
pub use light::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::NamedId;
    pub use crate::light::{LightType, LightTypeMask};
    pub use crate::visibility;
}
