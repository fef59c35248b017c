//! Export orchestrator – sequences the break walk, scroll expansion,
//! capture, slicing and document assembly into the public operations
//! (generate, download, preview).

use std::time::Duration;

use crate::breaks::apply_breaks;
use crate::config::ExportConfig;
use crate::document::{Document, DocumentEngine};
use crate::element::{HeightStyle, LiveElement};
use crate::error::Result;
use crate::host::{HostEnvironment, LANDSCAPE_PRINT_CSS};
use crate::plan::ExportPlan;
use crate::raster::{capture_full_content, Bitmap, Rasterizer};
use crate::scroll::{expand_scrollables, ScrollRestorer};
use crate::slicer::slice;

/// Fixed delay between style mutation and capture, letting the layout
/// engine apply the expanded overflow state.
pub const STYLE_SETTLE: Duration = Duration::from_millis(100);

/// Converts one live subtree into paginated PDF documents.
///
/// The exporter owns a handle to its target element for its lifetime
/// and mutates the target's style state during each run; only one
/// export may run against a given target at a time. Scroll and
/// overflow state is always restored, on success and on failure.
/// Spacer insertions from the break walk survive `generate`, and are
/// cleaned up by `download` and `preview`.
pub struct PdfExporter<E, R, D, H> {
    target: E,
    config: ExportConfig,
    rasterizer: R,
    engine: D,
    host: H,
}

impl<E, R, D, H> PdfExporter<E, R, D, H>
where
    E: LiveElement,
    R: Rasterizer<E>,
    D: DocumentEngine,
    H: HostEnvironment,
{
    pub fn new(target: E, config: ExportConfig, rasterizer: R, engine: D, host: H) -> Self {
        Self {
            target,
            config,
            rasterizer,
            engine,
            host,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Produce the paginated document for the current state of the
    /// target. The target's scroll and overflow state is restored
    /// before this returns, on every path; spacers inserted by the
    /// break walk are left in place for the caller.
    pub async fn generate(&self) -> Result<D::Document> {
        Ok(self.generate_with_plan().await?.0)
    }

    /// Like [`generate`](Self::generate), also returning the slicing
    /// plan the document was assembled from.
    pub async fn generate_with_plan(&self) -> Result<(D::Document, ExportPlan)> {
        log::info!(
            "export started ({}x{}pt pages, {:?})",
            self.config.page_width,
            self.config.page_height,
            self.config.orientation
        );

        // Let the root grow to its natural content height so break
        // geometry and the capture both see the full extent.
        self.target.set_inline_height(Some(HeightStyle::Natural));

        apply_breaks(&self.target, &self.config);

        let restorer = if self.config.expand_scrollables {
            expand_scrollables(&self.target)?
        } else {
            ScrollRestorer::empty()
        };
        let snapshots = restorer.len();

        self.host.settle(STYLE_SETTLE).await;

        let captured = capture_full_content(&self.rasterizer, &self.target).await;
        restorer.restore();
        if snapshots > 0 {
            log::debug!("restored {snapshots} scroll snapshot(s)");
        }
        let bitmap = captured?;

        let encoded = bitmap.encode()?;
        let plan = slice(bitmap.pixel_width(), bitmap.pixel_height(), &self.config);

        let mut doc = self.engine.create(self.config.orientation);
        for embed in &plan.embeds {
            if embed.page > 1 {
                doc.add_page();
            }
            doc.add_image(&encoded, embed.x, embed.y, embed.width, embed.height)?;
        }

        self.target.set_inline_height(None);
        log::info!("assembled {} page document", doc.page_count());
        Ok((doc, plan))
    }

    /// Generate and save as `<file_name>.pdf` (the configured name
    /// unless overridden), then remove every spacer from the target.
    /// Spacer cleanup runs even when the save step fails.
    pub async fn download(&self, file_name: Option<&str>) -> Result<()> {
        let doc = self.generate().await?;
        let name = file_name.unwrap_or(self.config.file_name.as_str());
        let saved = doc.save(name).await;
        self.cleanup_spacers();
        saved
    }

    /// Generate and push the document through the host's hidden-frame
    /// print flow, in landscape, then tear the frame down and remove
    /// every spacer from the target.
    pub async fn preview(&self) -> Result<()> {
        let doc = self.generate().await?;
        let uri = doc.to_data_uri()?;

        let frame = self.host.open_hidden_frame(&uri, LANDSCAPE_PRINT_CSS)?;
        let printed = self.host.invoke_print(&frame).await;
        if printed.is_ok() {
            self.host.await_dialog_dismissal(&frame).await;
        }
        self.host.remove_frame(frame);
        self.cleanup_spacers();
        printed
    }

    fn cleanup_spacers(&self) {
        let removed = self.target.remove_spacers();
        if removed > 0 {
            log::debug!("removed {removed} spacer(s)");
        }
    }
}

// ---------------------------------------------------------------------------
// Default stack
// ---------------------------------------------------------------------------

use crate::document::PrintPdfEngine;
use crate::host::NativeHost;
use crate::raster::SceneRasterizer;
use crate::tree::SceneNode;

/// Exporter over the in-memory scene tree with the bundled rasterizer,
/// `printpdf` engine and native host.
pub type DefaultExporter = PdfExporter<SceneNode, SceneRasterizer, PrintPdfEngine, NativeHost>;

impl DefaultExporter {
    pub fn with_default_stack(target: SceneNode, config: ExportConfig) -> Self {
        PdfExporter::new(target, config, SceneRasterizer, PrintPdfEngine, NativeHost)
    }
}
