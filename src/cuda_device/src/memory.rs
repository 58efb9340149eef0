//! Device-resident and pinned host allocations.

use crate::error::ToResult;
use cuda_driver_sys::{self as cuda, cudaError_enum};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};

/// Device allocation holding `len` elements of `T`, freed on drop.
pub struct DeviceBuffer<T> {
    pointer: cuda::CUdeviceptr,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy> DeviceBuffer<T> {
    /// Allocate room for `len` elements.
    pub fn new(len: usize) -> Result<Self, cudaError_enum> {
        let pointer = unsafe {
            let mut pointer = 0;
            cuda::cuMemAlloc_v2(&mut pointer as *mut _, len * mem::size_of::<T>()).to_result()?;
            pointer
        };
        Ok(DeviceBuffer {
            pointer,
            len,
            _marker: PhantomData,
        })
    }

    /// Copy `source` into the allocation.
    pub fn copy_from_slice(&mut self, source: &[T]) -> Result<(), cudaError_enum> {
        if source.len() > self.len {
            return Err(cudaError_enum::CUDA_ERROR_INVALID_VALUE);
        }
        unsafe {
            cuda::cuMemcpyHtoD_v2(
                self.pointer,
                source.as_ptr() as *const _,
                source.len() * mem::size_of::<T>(),
            )
            .to_result()
        }
    }

    /// Copy the allocation out into `target`.
    pub fn copy_to_slice(&self, target: &mut [T]) -> Result<(), cudaError_enum> {
        if target.len() > self.len {
            return Err(cudaError_enum::CUDA_ERROR_INVALID_VALUE);
        }
        unsafe {
            cuda::cuMemcpyDtoH_v2(
                target.as_mut_ptr() as *mut _,
                self.pointer,
                target.len() * mem::size_of::<T>(),
            )
            .to_result()
        }
    }
}

impl<T> DeviceBuffer<T> {
    /// Device-visible address of the allocation.
    pub fn as_device_ptr(&self) -> u64 {
        self.pointer
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        unsafe {
            cuda::cuMemFree_v2(self.pointer);
        }
    }
}

/// Page-locked host allocation the device addresses directly, freed on
/// drop. Derefs to `[T]` so the host reads and writes it in place.
pub struct PinnedBuffer<T> {
    pointer: *mut T,
    len: usize,
}

impl<T: Copy + Default> PinnedBuffer<T> {
    /// Allocate and zero room for `len` elements.
    pub fn new(len: usize) -> Result<Self, cudaError_enum> {
        let pointer = unsafe {
            let mut pointer = std::ptr::null_mut();
            cuda::cuMemAllocHost_v2(&mut pointer as *mut _ as *mut _, len * mem::size_of::<T>())
                .to_result()?;
            pointer
        };
        let mut buffer = PinnedBuffer { pointer, len };
        for slot in buffer.iter_mut() {
            *slot = T::default();
        }
        Ok(buffer)
    }
}

impl<T> PinnedBuffer<T> {
    /// Device-visible address of the allocation (unified addressing).
    pub fn as_device_ptr(&self) -> u64 {
        self.pointer as u64
    }
}

impl<T> Deref for PinnedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.pointer, self.len) }
    }
}

impl<T> DerefMut for PinnedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.pointer, self.len) }
    }
}

impl<T> Drop for PinnedBuffer<T> {
    fn drop(&mut self) {
        unsafe {
            cuda::cuMemFreeHost(self.pointer as *mut _);
        }
    }
}
