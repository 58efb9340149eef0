//! Module loading and kernel lookup.

use crate::error::ToResult;
use crate::{KernelArg, LaunchConfig};
use cuda_driver_sys::{self as cuda, cudaError_enum};
use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;

/// Loaded compute module, unloaded on drop.
pub struct Module {
    inner: cuda::CUmodule,
}

impl Module {
    /// Load a compiled module (e.g. a `.ptx` file) from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, cudaError_enum> {
        let path = CString::new(path.as_ref().to_string_lossy().into_owned())
            .map_err(|_| cudaError_enum::CUDA_ERROR_INVALID_VALUE)?;
        let inner = unsafe {
            let mut module = std::ptr::null_mut();
            cuda::cuModuleLoad(&mut module as *mut _, path.as_ptr()).to_result()?;
            module
        };
        Ok(Module { inner })
    }

    /// Load a module from an in-memory, NUL-terminated image.
    pub fn from_image(image: &[u8]) -> Result<Self, cudaError_enum> {
        let inner = unsafe {
            let mut module = std::ptr::null_mut();
            cuda::cuModuleLoadData(&mut module as *mut _, image.as_ptr() as *const _)
                .to_result()?;
            module
        };
        Ok(Module { inner })
    }

    /// Resolve an exported kernel by name.
    pub fn function(&self, name: &str) -> Result<Function<'_>, cudaError_enum> {
        let name = CString::new(name).map_err(|_| cudaError_enum::CUDA_ERROR_INVALID_VALUE)?;
        let inner = unsafe {
            let mut function = std::ptr::null_mut();
            cuda::cuModuleGetFunction(&mut function as *mut _, self.inner, name.as_ptr())
                .to_result()?;
            function
        };
        Ok(Function {
            inner,
            _module: PhantomData,
        })
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        unsafe {
            cuda::cuModuleUnload(self.inner);
        }
    }
}

/// Kernel handle resolved from a loaded module.
pub struct Function<'m> {
    inner: cuda::CUfunction,
    _module: PhantomData<&'m Module>,
}

impl Function<'_> {
    /// Launch on the default stream with no dynamic shared memory.
    pub fn launch(&self, config: &LaunchConfig, args: &[KernelArg]) -> Result<(), cudaError_enum> {
        let mut values = args
            .iter()
            .map(|arg| match arg {
                KernelArg::Pointer(pointer) => *pointer,
                KernelArg::Scalar(value) => *value,
            })
            .collect::<Vec<u64>>();
        let mut params = values
            .iter_mut()
            .map(|value| value as *mut _ as *mut std::ffi::c_void)
            .collect::<Vec<_>>();
        unsafe {
            cuda::cuLaunchKernel(
                self.inner,
                config.grid_x,
                1,
                1,
                config.block_x,
                1,
                1,
                0,
                std::ptr::null_mut(),
                params.as_mut_ptr(),
                std::ptr::null_mut(),
            )
            .to_result()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{init, synchronize, Context, Device, DeviceBuffer};
    use serial_test::serial;

    #[serial]
    #[ignore = "requires a CUDA-capable GPU"]
    #[test]
    fn load_and_launch() {
        init().unwrap();
        let device = Device::get(0).unwrap();
        let _context = Context::new(&device).unwrap();
        let mut image = include_bytes!("../resources/kernel.ptx").to_vec();
        image.push(0);
        let module = Module::from_image(&image).unwrap();
        let kernel = module.function("Sum").unwrap();
        let mut a = DeviceBuffer::<i32>::new(10).unwrap();
        let mut b = DeviceBuffer::<i32>::new(10).unwrap();
        let c = DeviceBuffer::<i32>::new(10).unwrap();
        a.copy_from_slice(&[1; 10]).unwrap();
        b.copy_from_slice(&[2; 10]).unwrap();
        kernel
            .launch(
                &LaunchConfig::for_device(&device, 10).unwrap(),
                &[
                    KernelArg::Pointer(a.as_device_ptr()),
                    KernelArg::Pointer(b.as_device_ptr()),
                    KernelArg::Pointer(c.as_device_ptr()),
                    KernelArg::Scalar(10),
                ],
            )
            .unwrap();
        synchronize().unwrap();
        let mut sums = [0i32; 10];
        c.copy_to_slice(&mut sums).unwrap();
        assert_eq!(sums, [3; 10]);
    }
}
