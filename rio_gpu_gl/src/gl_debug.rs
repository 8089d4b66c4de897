//! GL error tracking
//!
//! When debug checks are on, the device drains `glGetError` after each operation and feeds
//! every code through `record_gl_error`. Counters are process-wide atomics; the per-code
//! grouping sits behind a mutex.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use rustc_hash::FxHashMap;
use rio_gpu::engine_error;

static ERROR_COUNT: AtomicU32 = AtomicU32::new(0);

static ERRORS_BY_CODE: Mutex<Option<FxHashMap<u32, u32>>> = Mutex::new(None);

/// Snapshot of the recorded GL errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlErrorStats {
    pub total: u32,
    /// (error code, occurrences), sorted by code
    pub by_code: Vec<(u32, u32)>,
}

/// Symbolic name of a `glGetError` code
pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown GL error",
    }
}

/// Count one error raised while performing `operation` and log it
pub fn record_gl_error(operation: &str, code: u32) {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut guard) = ERRORS_BY_CODE.lock() {
        *guard.get_or_insert_with(FxHashMap::default).entry(code).or_insert(0) += 1;
    }
    engine_error!("rio::gl", "{} raised {} ({:#06x})", operation, gl_error_name(code), code);
}

pub fn gl_error_stats() -> GlErrorStats {
    let mut by_code: Vec<(u32, u32)> = ERRORS_BY_CODE
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|map| map.iter().map(|(k, v)| (*k, *v)).collect()))
        .unwrap_or_default();
    by_code.sort_unstable();
    GlErrorStats {
        total: ERROR_COUNT.load(Ordering::Relaxed),
        by_code,
    }
}

pub fn reset_gl_error_stats() {
    ERROR_COUNT.store(0, Ordering::Relaxed);
    if let Ok(mut guard) = ERRORS_BY_CODE.lock() {
        *guard = None;
    }
}

#[cfg(test)]
#[path = "gl_debug_tests.rs"]
mod tests;
