//! Best-effort static export extraction.
//!
//! When a module cannot be loaded in the current process (native code, side
//! effects, missing platform APIs), its export surface is approximated by
//! scanning the entry source text for export statements: CommonJS property
//! assignment, ES named/default exports, and one level of re-export
//! indirection through a sibling file. The scanner is deliberately not a JS
//! parser; its output is always paired with a safe empty default downstream.

mod api;

pub use api::{scan_file, scan_source, scan_with_reexports, ExportScanner, ScannedExport};
