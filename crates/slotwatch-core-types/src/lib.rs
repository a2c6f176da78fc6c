//! Core types shared across slotwatch facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: RequestId, RequestContext, Origin
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{Origin, RequestContext, RequestId, REQUEST_ID_HEADER};
pub use sensitive::Sensitive;
