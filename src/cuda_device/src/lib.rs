#![deny(warnings)]
#![deny(missing_docs)]
#![warn(clippy::all)]

//! Scoped wrappers over the CUDA Driver API for single-context,
//! single-stream programs: driver bring-up, device queries, module
//! loading, memory management and kernel launches.

mod context;
mod device;
mod error;
mod memory;
mod module;

pub use crate::context::{synchronize, Context};
pub use crate::device::{init, Device, DeviceInfo};
pub use crate::memory::{DeviceBuffer, PinnedBuffer};
pub use crate::module::{Function, Module};
pub use cuda_driver_sys::cudaError_enum;

/// One-dimensional launch geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchConfig {
    /// Blocks along x.
    pub grid_x: u32,
    /// Threads per block along x.
    pub block_x: u32,
}

impl LaunchConfig {
    /// Geometry covering `n` elements with one thread each, `block_x`
    /// threads per block.
    pub fn for_elements(n: u32, block_x: u32) -> Self {
        LaunchConfig {
            grid_x: (n + block_x - 1) / block_x,
            block_x,
        }
    }

    /// Geometry covering `n` elements with the widest block the device
    /// supports.
    pub fn for_device(device: &Device, n: u32) -> Result<Self, cudaError_enum> {
        Ok(Self::for_elements(n, device.max_block_dim_x()?))
    }
}

/// Kernel argument, marshalled into the launch parameter array.
pub enum KernelArg {
    /// Device-visible pointer.
    Pointer(u64),
    /// Plain scalar, widened to 64 bits.
    Scalar(u64),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn geometry_covers_all_elements() {
        let config = LaunchConfig::for_elements(10, 1024);
        assert_eq!(
            config,
            LaunchConfig {
                grid_x: 1,
                block_x: 1024
            }
        );
        assert_eq!(LaunchConfig::for_elements(1024, 1024).grid_x, 1);
        let config = LaunchConfig::for_elements(1025, 1024);
        assert_eq!(config.grid_x, 2);
        assert!(config.grid_x * config.block_x >= 1025);
    }

    #[test]
    fn geometry_single_element() {
        let config = LaunchConfig::for_elements(1, 1);
        assert_eq!((config.grid_x, config.block_x), (1, 1));
    }
}
