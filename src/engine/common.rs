// src/engine/common.rs
//
// Common utilities shared across engine modules.

use crate::error::{DecodeError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Run a codec call under the crate's panic policy.
///
/// Codecs backed by C libraries or hand-tuned SIMD occasionally panic on
/// hostile input. A panic is converted into `DecodeError::InternalPanic` so a
/// single bad image fails its own decode instead of tearing down the worker.
pub(crate) fn run_with_panic_policy<T, F>(stage: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(target: "pixel_hunter::decode", %stage, %message, "codec panicked");
            Err(DecodeError::internal_panic(format!("{stage}: {message}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
