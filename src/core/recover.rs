//! Containment for panics raised by command code.
//!
//! The default panic hook prints to stderr, which lands in the middle of a raw-mode screen.
//! While a contained call runs the hook is swapped for one that logs through `tracing`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

/// Run `f`, returning the panic message instead of unwinding past the caller.
pub fn catch_quietly<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        error!(panic = %info, "command code panicked");
    }));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    result.map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "panic with a non-string payload".to_string())
}
