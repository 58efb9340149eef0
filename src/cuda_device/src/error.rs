//! Driver status conversion.

use cuda_driver_sys::cudaError_enum;

/// Convert a raw `CUresult` status into a `Result`.
pub(crate) trait ToResult {
    fn to_result(self) -> Result<(), cudaError_enum>;
}

impl ToResult for cudaError_enum {
    fn to_result(self) -> Result<(), cudaError_enum> {
        match self {
            cudaError_enum::CUDA_SUCCESS => Ok(()),
            // Drop impls can run after the driver shut down at process exit.
            cudaError_enum::CUDA_ERROR_DEINITIALIZED => Ok(()),
            err => {
                log::warn!("Cuda Error {:?}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn success_maps_to_ok() {
        assert_eq!(cudaError_enum::CUDA_SUCCESS.to_result(), Ok(()));
    }

    #[test]
    fn deinitialized_is_not_an_error() {
        assert_eq!(cudaError_enum::CUDA_ERROR_DEINITIALIZED.to_result(), Ok(()));
    }

    #[test]
    fn failure_codes_pass_through() {
        assert_eq!(
            cudaError_enum::CUDA_ERROR_OUT_OF_MEMORY.to_result(),
            Err(cudaError_enum::CUDA_ERROR_OUT_OF_MEMORY)
        );
    }
}
