//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

/// System instruction for the product-manager conversation
pub const PRODUCT_MANAGER: &str = include_str!("../../prompts/product-manager.pmt");
