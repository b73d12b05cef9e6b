//! # BOM Fill Domain Models
//!
//! Plain data shared by the extraction pipeline and its front ends.
//!
//! ## Key Models
//!
//! - **Table**: rectangular, header-named section table; empty string means "no value"
//! - **ParsedDocument**: one BOM report split into typed sections plus its supplier index
//! - **ComponentIndex**: component name to material code, description and per-colorway value
//! - **SupplierIndex**: material code to supplier, zero-padding insensitive
//! - **CareContentIndex**: colorway to care code, content code and fiber breakdown
//! - **ResolvedRow**: a comparison row with every derived output field and its verdict

pub mod table;
pub mod document;
pub mod component;
pub mod supplier;
pub mod care;
pub mod comparison;
pub mod resolved;

#[cfg(test)]
pub mod property_tests;

pub use table::*;
pub use document::*;
pub use component::*;
pub use supplier::*;
pub use care::*;
pub use comparison::*;
pub use resolved::*;
