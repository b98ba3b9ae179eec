//! The flat-value element contract.
//!
//! Containers in this workspace keep their elements in raw, manually-managed
//! memory and move them around with byte copies. That is only sound for
//! element types that are plain value data: no references to other heap
//! objects, no destructors, no padding, every bit pattern valid. Rather than
//! hand-rolling an unsafe marker trait, the contract is expressed through
//! [`bytemuck::Pod`], which encodes exactly those guarantees.

use bytemuck::Pod;

/// Marker for flat, pointer-free value types.
///
/// A `Flat` type is safe to:
///
/// - copy byte-for-byte between buffers (it is `Copy` with no drop glue),
/// - store in memory that is freed without running destructors,
/// - zero-initialize (the all-zero bit pattern is a valid value),
/// - reinterpret from the raw bytes of another `Flat` value.
///
/// Every [`bytemuck::Pod`] type is `Flat`; user-defined `#[repr(C)]` structs
/// opt in by deriving `Pod` (and `Zeroable`) via bytemuck. Zero-sized types
/// are not usable as container elements and are rejected at
/// monomorphization time by the allocation path.
pub trait Flat: Pod {}

impl<T: Pod> Flat for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_flat<T: Flat>() {}

    #[test]
    fn primitives_are_flat() {
        assert_flat::<u8>();
        assert_flat::<i64>();
        assert_flat::<f32>();
        assert_flat::<[u32; 4]>();
    }

    #[test]
    fn derived_pod_struct_is_flat() {
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        #[repr(C)]
        struct Point {
            x: f32,
            y: f32,
        }
        assert_flat::<Point>();
    }
}
