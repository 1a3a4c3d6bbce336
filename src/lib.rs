// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # surface-audit
//!
//! Reconciles the HTTP surface a backend declares with the calls its frontend
//! makes.
//!
//! ## Core Concept
//!
//! Both sides are reduced to **snapshots**: the backend lists controllers,
//! endpoints, DTO shapes, service interfaces and their implementations; the
//! frontend lists service methods with the HTTP verb and URL each one calls,
//! plus its declared types. Every route and URL is canonicalized into a
//! `VERB:path` key so the two sides become comparable.
//!
//! From a pair of snapshots, surface-audit reports:
//!
//! - **Broken calls**: frontend calls no backend endpoint answers
//! - **Dead endpoints**: backend endpoints no frontend call reaches
//! - **Unimplemented methods**: interface methods missing from an implementation
//! - **Shape mismatches**: DTO fields present on only one side
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use surface_audit::{load_backend, load_frontend, reconcile, MatchOptions};
//!
//! let backend = load_backend("backend_audit.json".as_ref())?;
//! let frontend = load_frontend("frontend_audit.json".as_ref())?;
//!
//! let report = reconcile(&backend.value, &frontend.value, &MatchOptions::default())
//!     .with_inputs(Some(backend.fingerprint), Some(frontend.fingerprint));
//!
//! println!("{}", report.to_report());
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! extract ──► snapshot ──► canon ──► index ──► matcher ──┐
//!                   │                                    ├──► reconcile ──► render
//!                   └──► contracts / shape ──────────────┘
//! ```
//!
//! The endpoint index is immutable once built; matching returns the set of
//! keys it reached instead of flagging index entries.

pub mod canon;
pub mod config;
pub mod contracts;
pub mod error;
pub mod extract;
pub mod index;
pub mod markers;
pub mod matcher;
pub mod reconcile;
pub mod render;
pub mod shape;
pub mod snapshot;

pub use canon::{canonical_path, normalize_verb, with_api_prefix, CanonicalKey};
pub use config::AuditConfig;
pub use contracts::{check_contracts, check_interfaces, UnimplementedMethod};
pub use error::{Error, Result};
pub use extract::{extract_backend, extract_frontend};
pub use index::{EndpointIndex, EndpointRecord, KeyCollision};
pub use markers::{scan_empty_catches, scan_markers, MarkerHit};
pub use matcher::{match_calls, CallResolution, ClientCallRecord, MatchOptions, MatchOutcome, Strategy};
pub use reconcile::{reconcile, AuditStatus, BrokenCall, DeadEndpoint, ReconcileReport, Summary};
pub use render::render_markdown;
pub use shape::{diff_shapes, ShapeMismatch};
pub use snapshot::{load_backend, load_frontend, BackendSnapshot, FrontendSnapshot, Loaded};

/// Version of surface-audit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
