//! Context lifetime and default-stream synchronization.

use crate::device::Device;
use crate::error::ToResult;
use cuda_driver_sys::{self as cuda, cudaError_enum};

/// Owned CUDA context, current on the creating thread, destroyed on drop.
pub struct Context {
    inner: cuda::CUcontext,
}

impl Context {
    /// Create a context on `device` and make it current.
    pub fn new(device: &Device) -> Result<Self, cudaError_enum> {
        let inner = unsafe {
            let mut context = std::ptr::null_mut();
            cuda::cuCtxCreate_v2(&mut context as *mut _, 0, device.handle()).to_result()?;
            context
        };
        Ok(Context { inner })
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe {
            cuda::cuCtxDestroy_v2(self.inner);
        }
    }
}

/// Block until all work queued on the default stream has completed.
pub fn synchronize() -> Result<(), cudaError_enum> {
    unsafe { cuda::cuStreamSynchronize(std::ptr::null_mut()).to_result() }
}
