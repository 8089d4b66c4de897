//! Integration tests for the engine logging hub
//!
//! Loggers are process-wide, so every test here runs serially and restores the default
//! logger before returning. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

mod gpu_test_utils;

use gpu_test_utils::{cafe_context, CaptureLogger};
use rio_gpu::rio::gpu::{ShaderStage, Texture2D, UniformBlock};
use rio_gpu::rio::log::LogSeverity;
use rio_gpu::rio::{Engine, MemoryFileDevice, RioError};
use serial_test::serial;

// ============================================================================
// LOGGER ROUTING
// ============================================================================

#[test]
#[serial]
fn test_integration_context_creation_is_logged() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    let _ctx = cafe_context(MemoryFileDevice::new());

    {
        let entries = entries.lock().unwrap();
        let created = entries
            .iter()
            .find(|e| e.source == "rio::GraphicsContext")
            .expect("context creation was logged");
        assert_eq!(created.severity, LogSeverity::Info);
        assert!(created.message.contains("Cafe"));
        assert_eq!(created.file, None);
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_contract_violation_logs_error_with_location() {
    let (logger, entries) = CaptureLogger::new();
    let mut ctx = cafe_context(MemoryFileDevice::new());
    let mut block = UniformBlock::new(&mut ctx, ShaderStage::FRAGMENT, 0).unwrap();
    block.upload_consuming(&mut ctx, vec![0u8; 16]).unwrap();
    Engine::set_logger(logger);

    let result = block.set_sub_data(&mut ctx, 1, &[0u8; 4]);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));

    {
        let entries = entries.lock().unwrap();
        let error = entries
            .iter()
            .find(|e| e.severity == LogSeverity::Error)
            .expect("violation was logged");
        assert_eq!(error.source, "rio::gpu::UniformBlock");
        assert!(error.message.contains("not word aligned"));
        assert!(error.file.is_some_and(|f| f.ends_with("uniform_block.rs")));
        assert!(error.line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_failed_asset_load_reports_the_path() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    let mut ctx = cafe_context(MemoryFileDevice::new());
    let Err(RioError::Io(message)) = Texture2D::load(&mut ctx, "missing") else {
        panic!("a missing texture is an I/O error");
    };
    assert!(message.contains("textures/missing.rtx"));
    // Nothing was created, so nothing beyond the context itself was announced at INFO
    let infos = entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.severity == LogSeverity::Info)
        .count();
    assert_eq!(infos, 1);

    Engine::reset_logger();
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_integration_min_severity_filters_resource_chatter() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    let mut ctx = cafe_context(MemoryFileDevice::new());
    let texture = Texture2D::new_empty(
        &mut ctx,
        rio_gpu::rio::gpu::TextureFormat::R8G8B8A8_UNORM,
        4,
        4,
        1,
    )
    .unwrap();
    texture.destroy(&mut ctx).unwrap();
    Engine::log(LogSeverity::Warn, "test::filter", "kept".to_string());

    {
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
    }

    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Trace);
}

#[test]
#[serial]
fn test_integration_reset_detaches_custom_logger() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);
    Engine::log(LogSeverity::Debug, "test::reset", "before".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Error, "test::reset", "after".to_string());

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "before");
}
