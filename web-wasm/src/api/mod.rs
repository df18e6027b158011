//! PII検出サービス連携

pub mod pii_service;

pub use pii_service::{run, service_config};
