//! DhrLang editor integration.
//!
//! Catalog-driven completion and hover for `.dhr` files, plus discovery and
//! invocation of the external `DhrLang.jar` toolchain.

pub mod actions;
pub mod catalog;
pub mod config;
pub mod lsp;
pub mod toolchain;
