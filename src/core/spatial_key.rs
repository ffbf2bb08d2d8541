//! # Spatial Key
//!
//! Packs a chunk coordinate into a single integer. Each axis is biased by 511
//! and masked to 10 bits, so the valid range is roughly ±512 chunks per axis.
//! Coordinates outside that range alias silently; the key is an identity, never
//! a distance metric.

use cgmath::Point3;

/// A packed chunk coordinate, used as map key, task correlation id and
/// collaborator resource name.
pub type SpatialKey = u32;

/// Bias added to every axis before masking.
pub const AXIS_BIAS: i32 = 511;
/// Number of bits each axis occupies in the key.
pub const AXIS_BITS: u32 = 10;
const AXIS_MASK: i32 = (1 << AXIS_BITS) - 1;

/// Biases a signed axis value into its 10-bit slot.
#[inline]
pub fn bias(n: i32) -> u32 {
    (n.wrapping_add(AXIS_BIAS) & AXIS_MASK) as u32
}

/// Encodes a chunk coordinate as `bias(x) << 20 | bias(y) << 10 | bias(z)`.
#[inline]
pub fn encode(x: i32, y: i32, z: i32) -> SpatialKey {
    (bias(x) << (2 * AXIS_BITS)) | (bias(y) << AXIS_BITS) | bias(z)
}

/// Encodes a chunk position.
#[inline]
pub fn key_of(position: Point3<i32>) -> SpatialKey {
    encode(position.x, position.y, position.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn encode_is_pure() {
        assert_eq!(encode(3, -7, 12), encode(3, -7, 12));
        assert_eq!(key_of(Point3::new(3, -7, 12)), encode(3, -7, 12));
    }

    #[test]
    fn origin_packs_the_bias_on_every_axis() {
        assert_eq!(encode(0, 0, 0), (511 << 20) | (511 << 10) | 511);
    }

    #[test]
    fn in_range_coordinates_never_collide() {
        let mut seen = HashSet::new();
        for x in -20..20 {
            for y in -20..20 {
                for z in -20..20 {
                    assert!(seen.insert(encode(x, y, z)), "collision at {x},{y},{z}");
                }
            }
        }
    }

    #[test]
    fn extremes_of_the_range_stay_distinct() {
        let low = encode(-511, -511, -511);
        let high = encode(512, 512, 512);
        assert_eq!(low, 0);
        assert_eq!(high, 0x3fff_ffff);
        assert_ne!(encode(-511, 0, 512), encode(512, 0, -511));
    }

    #[test]
    fn out_of_range_coordinates_alias() {
        assert_eq!(encode(513, 0, 0), encode(-511, 0, 0));
    }
}
