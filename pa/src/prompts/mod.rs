//! Prompt templates
//!
//! The product-manager instruction is the only prompt the agent uses. It is
//! compiled into the binary from `prompts/product-manager.pmt` and handed to
//! the model once, as the system instruction of a new session.
//!
//! Phase progression (discovery, PRD, user stories, CSV export) lives entirely
//! in this text; no local code tracks which phase the conversation is in.

pub mod embedded;

pub use embedded::PRODUCT_MANAGER;
