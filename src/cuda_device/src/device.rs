//! Driver bring-up, device enumeration and attribute queries.

use crate::error::ToResult;
use cuda_driver_sys::{self as cuda, cudaError_enum};

/// Initialize the driver. Call once before any other entry point.
pub fn init() -> Result<(), cudaError_enum> {
    unsafe { cuda::cuInit(0).to_result() }
}

/// One CUDA device ordinal.
#[derive(Clone, Copy)]
pub struct Device {
    handle: cuda::CUdevice,
}

impl Device {
    /// Number of devices visible to the driver.
    pub fn count() -> Result<i32, cudaError_enum> {
        let mut count = 0;
        unsafe {
            cuda::cuDeviceGetCount(&mut count as *mut _).to_result()?;
        }
        Ok(count)
    }

    /// Get a device by ordinal.
    pub fn get(ordinal: i32) -> Result<Self, cudaError_enum> {
        let mut handle: cuda::CUdevice = 0;
        unsafe {
            cuda::cuDeviceGet(&mut handle as *mut _, ordinal).to_result()?;
        }
        Ok(Device { handle })
    }

    pub(crate) fn handle(&self) -> cuda::CUdevice {
        self.handle
    }

    /// Device name reported by the driver.
    pub fn name(&self) -> Result<String, cudaError_enum> {
        let mut raw = [0u8; 100];
        unsafe {
            cuda::cuDeviceGetName(raw.as_mut_ptr() as *mut _, raw.len() as i32, self.handle)
                .to_result()?;
        }
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..len]).into_owned())
    }

    fn attribute(&self, attrib: cuda::CUdevice_attribute_enum) -> Result<i32, cudaError_enum> {
        let mut value = 0;
        unsafe {
            cuda::cuDeviceGetAttribute(&mut value as *mut _, attrib, self.handle).to_result()?;
        }
        Ok(value)
    }

    /// SM compute capability as (major, minor).
    pub fn compute_capability(&self) -> Result<(i32, i32), cudaError_enum> {
        Ok((
            self.attribute(
                cuda::CUdevice_attribute_enum::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR,
            )?,
            self.attribute(
                cuda::CUdevice_attribute_enum::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
            )?,
        ))
    }

    /// Total global memory in bytes.
    pub fn total_memory(&self) -> Result<usize, cudaError_enum> {
        let mut bytes = 0usize;
        unsafe {
            cuda::cuDeviceTotalMem_v2(&mut bytes as *mut _, self.handle).to_result()?;
        }
        Ok(bytes)
    }

    /// Widest supported block dimension along x.
    pub fn max_block_dim_x(&self) -> Result<u32, cudaError_enum> {
        let value =
            self.attribute(cuda::CUdevice_attribute_enum::CU_DEVICE_ATTRIBUTE_MAX_BLOCK_DIM_X)?;
        Ok(value as u32)
    }

    /// Whether the device shares one address space with the host.
    pub fn unified_addressing(&self) -> Result<bool, cudaError_enum> {
        let value =
            self.attribute(cuda::CUdevice_attribute_enum::CU_DEVICE_ATTRIBUTE_UNIFIED_ADDRESSING)?;
        Ok(value != 0)
    }

    /// Gather the startup report both demo binaries log.
    pub fn info(&self) -> Result<DeviceInfo, cudaError_enum> {
        Ok(DeviceInfo {
            name: self.name()?,
            compute_capability: self.compute_capability()?,
            total_memory: self.total_memory()?,
            unified_addressing: self.unified_addressing()?,
        })
    }
}

/// Startup report for one device.
#[derive(Debug)]
pub struct DeviceInfo {
    /// Device name reported by the driver.
    pub name: String,
    /// SM compute capability as (major, minor).
    pub compute_capability: (i32, i32),
    /// Total global memory in bytes.
    pub total_memory: usize,
    /// Unified Virtual Addressing support.
    pub unified_addressing: bool,
}

impl DeviceInfo {
    /// Whether the device addresses more than 4 GiB of global memory.
    pub fn has_64bit_addressing(&self) -> bool {
        self.total_memory > 4 * 1024 * 1024 * 1024
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;

    #[serial]
    #[ignore = "requires a CUDA-capable GPU"]
    #[test]
    fn device_report() {
        init().unwrap();
        assert!(Device::count().unwrap() > 0);
        let device = Device::get(0).unwrap();
        let info = device.info().unwrap();
        assert!(!info.name.is_empty());
        assert!(info.total_memory > 0);
        assert!(device.max_block_dim_x().unwrap() >= 1);
    }

    #[test]
    fn wide_memory_threshold() {
        let mut info = DeviceInfo {
            name: String::new(),
            compute_capability: (0, 0),
            total_memory: 4 * 1024 * 1024 * 1024,
            unified_addressing: false,
        };
        assert!(!info.has_64bit_addressing());
        info.total_memory += 1;
        assert!(info.has_64bit_addressing());
    }
}
