//! # pdf-snap – Live-tree region → paginated PDF exporter
//!
//! This crate converts a live, rendered region of a document tree into a
//! paginated PDF, handling content taller than one page and content nested
//! inside independently-scrolling containers. The export stages are:
//!
//! 1. **Break layout** – insert blank spacers so marked elements never
//!    straddle a page boundary ([`breaks`])
//! 2. **Expand** – neutralize scrolled/clipped descendants so hidden
//!    content renders in natural flow, with guaranteed restore ([`scroll`])
//! 3. **Capture** – rasterize the full subtree once at 2x density
//!    ([`raster`])
//! 4. **Slice** – compute per-page placements of that one oversized
//!    capture ([`slicer`], [`plan`])
//! 5. **Assemble** – emit PDF bytes via printpdf ([`document`])
//!
//! [`exporter`] sequences the stages into `generate`, `download` and
//! `preview`; [`tree`] provides an in-memory scene implementation of the
//! [`element::LiveElement`] capability surface.

pub mod breaks;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod exporter;
pub mod host;
pub mod plan;
pub mod raster;
pub mod samples;
pub mod scroll;
pub mod slicer;
pub mod tree;

// Re-exports for convenience
pub use config::{ExportConfig, Orientation};
pub use error::{Error, Result};
pub use exporter::{DefaultExporter, PdfExporter};
