//! Unit tests for gl_debug.rs

use super::*;
use serial_test::serial;

#[test]
fn test_error_names() {
    assert_eq!(gl_error_name(glow::INVALID_ENUM), "GL_INVALID_ENUM");
    assert_eq!(gl_error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
    assert_eq!(gl_error_name(0xDEAD), "unknown GL error");
}

#[test]
#[serial]
fn test_errors_are_counted_per_code() {
    reset_gl_error_stats();
    record_gl_error("glBindTexture", glow::INVALID_OPERATION);
    record_gl_error("glBindTexture", glow::INVALID_OPERATION);
    record_gl_error("glTexImage2D", glow::INVALID_VALUE);

    let stats = gl_error_stats();
    assert_eq!(stats.total, 3);
    assert_eq!(
        stats.by_code,
        vec![(glow::INVALID_VALUE, 1), (glow::INVALID_OPERATION, 2)]
    );
}

#[test]
#[serial]
fn test_reset_clears_everything() {
    record_gl_error("glClear", glow::INVALID_ENUM);
    reset_gl_error_stats();
    assert_eq!(gl_error_stats(), GlErrorStats::default());
}
