use serial_test::serial;
use vector_add::{run_device_copy, run_unified, Config};

fn config(elements: usize) -> Config {
    Config {
        module_path: concat!(env!("CARGO_MANIFEST_DIR"), "/resources/kernel.ptx").to_owned(),
        kernel_name: "Sum".to_owned(),
        elements,
        gpu_id: 0,
    }
}

#[serial]
#[ignore = "requires a CUDA-capable GPU"]
#[test]
fn device_copy_adds_vectors() {
    run_device_copy(&config(10)).unwrap();
}

#[serial]
#[ignore = "requires a CUDA-capable GPU"]
#[test]
fn unified_memory_adds_vectors() {
    run_unified(&config(10)).unwrap();
}

#[serial]
#[ignore = "requires a CUDA-capable GPU"]
#[test]
fn device_copy_spans_multiple_blocks() {
    run_device_copy(&config(4096)).unwrap();
}
