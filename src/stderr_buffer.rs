use std::sync::{Mutex, MutexGuard};

/// Rate-file warnings held back while `--format json` owns stdout.
static HELD_WARNINGS: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn held() -> MutexGuard<'static, Option<Vec<String>>> {
    HELD_WARNINGS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hold warnings for the JSON envelope instead of printing them.
pub fn hold_warnings() {
    *held() = Some(Vec::new());
}

/// Release held warnings for the envelope's `warnings` array.
pub fn take_warnings() -> Vec<String> {
    held().take().unwrap_or_default()
}

pub fn push_warning(msg: String) {
    let mut guard = held();
    match guard.as_mut() {
        Some(warnings) => warnings.push(msg),
        None => {
            drop(guard);
            eprintln!("{}", msg);
        }
    }
}

/// `eprintln!` for warnings that may end up in the JSON envelope.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::push_warning(format!($($arg)*))
    };
}
