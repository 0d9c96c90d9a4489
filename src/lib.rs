// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Counts and byte sizes fixed at startup fit the narrower GPU types
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

//! Real-time particle-cloud and mesh viewer built on wgpu.
//!
//! Driftview animates a cloud of free-floating point particles and renders
//! a spinning, flat-shaded triangulated mesh under one shared camera
//! projection. Particle positions are re-uploaded in full every frame; the
//! mesh geometry is uploaded once and only its model transform changes.
//!
//! # Key entry points
//!
//! - [`Viewer`] - window plus event loop wrapping the whole system
//! - [`engine::DriftEngine`] - per-frame update/render orchestration
//! - [`particles::ParticleCloud`] - CPU-side particle simulation
//! - [`config::Config`] - runtime configuration (window, simulation,
//!   scene, camera)
//!
//! # Architecture
//!
//! Everything runs on one thread. CPU-side state (particle cloud, mesh
//! spin angle) is advanced first, uploaded through fixed-capacity buffers
//! ([`gpu::buffer::FixedBuffer`]), then drawn in a single render pass:
//! point primitives first, triangles second. Shader programs are parsed
//! and validated on the CPU ([`gpu::shader`]) so a broken WGSL file
//! degrades to a logged diagnostic and a skipped draw instead of a crash.

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod particles;
pub mod render;
pub mod viewer;

pub use error::DriftError;
pub use viewer::Viewer;
