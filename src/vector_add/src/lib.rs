#![deny(warnings)]
#![deny(missing_docs)]
#![warn(clippy::all)]

//! Parallel vector addition driven through the CUDA Driver API.
//!
//! Two run paths share one workload: [`run_device_copy`] stages the
//! operands in device memory with explicit transfers, [`run_unified`]
//! lets the kernel read and write pinned host memory in place.

use clap::{App, Arg};
use cuda_device::{
    cudaError_enum, init, synchronize, Context, Device, DeviceBuffer, KernelArg, LaunchConfig,
    Module, PinnedBuffer,
};
use std::fmt;

/// Demo failure modes.
#[derive(Debug)]
pub enum Error {
    /// A driver call failed.
    Cuda(cudaError_enum),
    /// No CUDA device is visible to the driver.
    NoDevice,
    /// The device cannot map host memory into the GPU address space.
    NoUnifiedAddressing,
    /// Kernel output disagreed with the host-side sums.
    Mismatch {
        /// Number of array positions that failed verification.
        mismatches: usize,
    },
}

impl From<cudaError_enum> for Error {
    fn from(err: cudaError_enum) -> Self {
        Error::Cuda(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cuda(err) => write!(f, "CUDA Driver API error {:?}", err),
            Error::NoDevice => write!(f, "no devices supporting CUDA"),
            Error::NoUnifiedAddressing => {
                write!(f, "Unified Virtual Addressing is not supported on this device")
            }
            Error::Mismatch { mismatches } => {
                write!(f, "result mismatch at {} array positions", mismatches)
            }
        }
    }
}

/// Settings shared by both demo binaries.
pub struct Config {
    /// Path of the compiled kernel module.
    pub module_path: String,
    /// Kernel name exported by the module.
    pub kernel_name: String,
    /// Vector length.
    pub elements: usize,
    /// Device ordinal.
    pub gpu_id: i32,
}

impl Config {
    /// Parse the demo command line.
    pub fn from_args(name: &str, about: &str) -> Self {
        let matches = App::new(name)
            .about(about)
            .arg(
                Arg::with_name("module")
                    .short("m")
                    .help("Path of the compiled kernel module")
                    .default_value("kernel.ptx")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("kernel")
                    .short("k")
                    .help("Kernel name exported by the module")
                    .default_value("Sum")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("elements")
                    .short("n")
                    .help("Vector length")
                    .default_value("10")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("gpu")
                    .short("g")
                    .help("Device ordinal")
                    .default_value("0")
                    .takes_value(true),
            )
            .get_matches();
        Config {
            module_path: matches.value_of("module").unwrap().to_owned(),
            kernel_name: matches.value_of("kernel").unwrap().to_owned(),
            elements: matches.value_of("elements").unwrap().parse().unwrap(),
            gpu_id: matches.value_of("gpu").unwrap().parse().unwrap(),
        }
    }
}

/// Fill the operand arrays: `a[i] = n - i`, `b[i] = i * i`.
pub fn fill_operands(a: &mut [i32], b: &mut [i32]) {
    let n = a.len() as i32;
    for (i, slot) in a.iter_mut().enumerate() {
        *slot = n - i as i32;
    }
    for (i, slot) in b.iter_mut().enumerate() {
        *slot = (i * i) as i32;
    }
}

/// Check `c[i] == a[i] + b[i]` at every position, reporting each failure.
pub fn verify(a: &[i32], b: &[i32], c: &[i32]) -> Result<(), Error> {
    let mut mismatches = 0;
    for (i, ((&x, &y), &got)) in a.iter().zip(b).zip(c).enumerate() {
        if got != x + y {
            log::error!(
                "Error at array position {}: Expected {}, Got {}",
                i,
                x + y,
                got
            );
            mismatches += 1;
        }
    }
    if mismatches == 0 {
        Ok(())
    } else {
        Err(Error::Mismatch { mismatches })
    }
}

fn bring_up(gpu_id: i32) -> Result<(Device, Context), Error> {
    init()?;
    if Device::count()? == 0 {
        return Err(Error::NoDevice);
    }
    let device = Device::get(gpu_id)?;
    let info = device.info()?;
    log::info!("Using device {}: {}", gpu_id, info.name);
    log::info!(
        "GPU Device has SM {}.{} compute capability",
        info.compute_capability.0,
        info.compute_capability.1
    );
    log::info!("Total amount of global memory: {} bytes", info.total_memory);
    log::info!(
        "64-bit memory address: {}",
        if info.has_64bit_addressing() {
            "yes"
        } else {
            "no"
        }
    );
    let context = Context::new(&device)?;
    Ok((device, context))
}

/// Stage the operands in device memory, launch the kernel, copy the sums
/// back and verify them.
pub fn run_device_copy(config: &Config) -> Result<(), Error> {
    let (device, _context) = bring_up(config.gpu_id)?;
    let module = Module::load(&config.module_path)?;
    let kernel = module.function(&config.kernel_name)?;

    let n = config.elements;
    let mut a = vec![0i32; n];
    let mut b = vec![0i32; n];
    fill_operands(&mut a, &mut b);

    let mut d_a = DeviceBuffer::<i32>::new(n)?;
    let mut d_b = DeviceBuffer::<i32>::new(n)?;
    let d_c = DeviceBuffer::<i32>::new(n)?;
    d_a.copy_from_slice(&a)?;
    d_b.copy_from_slice(&b)?;

    log::info!("Running the kernel...");
    kernel.launch(
        &LaunchConfig::for_device(&device, n as u32)?,
        &[
            KernelArg::Pointer(d_a.as_device_ptr()),
            KernelArg::Pointer(d_b.as_device_ptr()),
            KernelArg::Pointer(d_c.as_device_ptr()),
            KernelArg::Scalar(n as u64),
        ],
    )?;
    log::info!("Kernel complete");

    // The synchronous DtoH copy drains the default stream before reading.
    let mut c = vec![0i32; n];
    d_c.copy_to_slice(&mut c)?;
    verify(&a, &b, &c)
}

/// Let the kernel read and write pinned host buffers in place, with one
/// synchronize fencing the host read-back.
pub fn run_unified(config: &Config) -> Result<(), Error> {
    let (device, _context) = bring_up(config.gpu_id)?;
    if !device.unified_addressing()? {
        return Err(Error::NoUnifiedAddressing);
    }
    log::info!("Unified Virtual Addressing is supported on this device");
    let module = Module::load(&config.module_path)?;
    let kernel = module.function(&config.kernel_name)?;

    let n = config.elements;
    let mut a = PinnedBuffer::<i32>::new(n)?;
    let mut b = PinnedBuffer::<i32>::new(n)?;
    let c = PinnedBuffer::<i32>::new(n)?;
    fill_operands(&mut a, &mut b);

    log::info!("Running the kernel...");
    kernel.launch(
        &LaunchConfig::for_device(&device, n as u32)?,
        &[
            KernelArg::Pointer(a.as_device_ptr()),
            KernelArg::Pointer(b.as_device_ptr()),
            KernelArg::Pointer(c.as_device_ptr()),
            KernelArg::Scalar(n as u64),
        ],
    )?;
    // The launch returns before the kernel finishes; fence the default
    // stream before reading the sums back.
    synchronize()?;
    log::info!("Kernel complete");

    verify(&a, &b, &c)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn operand_pattern() {
        let mut a = vec![0; 10];
        let mut b = vec![0; 10];
        fill_operands(&mut a, &mut b);
        assert_eq!(a, vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(b, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    }

    #[test]
    fn verify_accepts_correct_sums() {
        let mut a = vec![0; 10];
        let mut b = vec![0; 10];
        fill_operands(&mut a, &mut b);
        let c = a.iter().zip(&b).map(|(x, y)| x + y).collect::<Vec<_>>();
        assert!(verify(&a, &b, &c).is_ok());
    }

    #[test]
    fn verify_counts_every_mismatch() {
        let a = vec![1, 2, 3];
        let b = vec![4, 5, 6];
        let c = vec![0, 7, 0];
        match verify(&a, &b, &c) {
            Err(Error::Mismatch { mismatches }) => assert_eq!(mismatches, 2),
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(Error::NoDevice.to_string(), "no devices supporting CUDA");
        assert_eq!(
            Error::NoUnifiedAddressing.to_string(),
            "Unified Virtual Addressing is not supported on this device"
        );
        assert_eq!(
            Error::Mismatch { mismatches: 3 }.to_string(),
            "result mismatch at 3 array positions"
        );
    }
}
