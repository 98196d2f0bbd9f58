//! Light categories and the category bitmask
//!
//! Shared between the scene/culling subsystem and the compositor so both
//! agree on which categories a shadow map or a culling pass services.

/// Category of a light source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightType {
    /// Infinitely distant light with parallel rays
    Directional,
    /// Omnidirectional point light
    Point,
    /// Cone-shaped spot light
    Spot,
}

impl LightType {
    /// Number of light categories
    pub const COUNT: usize = 3;

    /// Get the mask bit for this category
    #[inline]
    pub const fn mask(self) -> LightTypeMask {
        LightTypeMask(1 << self as u8)
    }
}

/// Bitmask over light categories
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightTypeMask(u8);

impl LightTypeMask {
    /// No categories
    pub const NONE: Self = Self(0);

    /// Directional lights
    pub const DIRECTIONAL: Self = Self(1 << LightType::Directional as u8);

    /// Point lights
    pub const POINT: Self = Self(1 << LightType::Point as u8);

    /// Spot lights
    pub const SPOT: Self = Self(1 << LightType::Spot as u8);

    /// Every category
    pub const ALL: Self = Self(Self::DIRECTIONAL.0 | Self::POINT.0 | Self::SPOT.0);

    /// Create a mask from raw bits
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if empty (no categories set)
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if all specified categories are set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the specified categories are set
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Insert categories
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Remove categories
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Union of two masks
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of two masks
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl From<LightType> for LightTypeMask {
    fn from(light_type: LightType) -> Self {
        light_type.mask()
    }
}

impl core::ops::BitOr for LightTypeMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for LightTypeMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for LightTypeMask {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl core::ops::BitAndAssign for LightTypeMask {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl core::ops::Not for LightTypeMask {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}
