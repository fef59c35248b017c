//! PDF document assembly – the engine seam the exporter drives (create a
//! document, place embeds, add pages, save) and its `printpdf` (v0.8
//! ops-based API) implementation.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, XObjectId,
    XObjectTransform,
};

use crate::config::Orientation;
use crate::error::{Error, Result};
use crate::raster::EncodedImage;

/// A4 page size in points, portrait.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

const PT_TO_MM: f32 = 0.352778;

/// Creates empty paged documents. The page format is fixed at creation;
/// only the orientation varies per export.
pub trait DocumentEngine {
    type Document: Document;

    fn create(&self, orientation: Orientation) -> Self::Document;
}

/// One paged document under assembly.
///
/// Documents start with a single blank page. Placement coordinates use
/// the page's top-left corner as origin, in points; a negative `y`
/// hangs the embed above the page top so a lower slice of it shows.
#[async_trait(?Send)]
pub trait Document {
    /// Place `image` on the current page at `(x, y)` scaled to
    /// `width` by `height` points.
    fn add_image(
        &mut self,
        image: &EncodedImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()>;

    /// Append a blank page and make it current.
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// Serialize the document to PDF bytes.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Write the document to `<file_name>.pdf`.
    async fn save(&self, file_name: &str) -> Result<()>;

    /// Serialize to a `data:application/pdf;base64,` URI.
    fn to_data_uri(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        Ok(format!(
            "data:application/pdf;base64,{}",
            BASE64_STD.encode(bytes)
        ))
    }
}

// ---------------------------------------------------------------------------
// printpdf implementation
// ---------------------------------------------------------------------------

/// Engine producing A4 documents via `printpdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPdfEngine;

impl DocumentEngine for PrintPdfEngine {
    type Document = PrintPdfDocument;

    fn create(&self, orientation: Orientation) -> PrintPdfDocument {
        let (page_width, page_height) = match orientation {
            Orientation::Portrait => (A4_WIDTH_PT, A4_HEIGHT_PT),
            Orientation::Landscape => (A4_HEIGHT_PT, A4_WIDTH_PT),
        };
        PrintPdfDocument {
            doc: PdfDocument::new("document"),
            page_width,
            page_height,
            pages: vec![Vec::new()],
            resources: Vec::new(),
        }
    }
}

/// A registered XObject together with the pixel dimensions of the
/// source image.
struct ImageResource {
    bytes: Vec<u8>,
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

pub struct PrintPdfDocument {
    doc: PdfDocument,
    page_width: f32,
    page_height: f32,
    pages: Vec<Vec<Op>>,
    resources: Vec<ImageResource>,
}

impl PrintPdfDocument {
    /// Page size in points, width then height.
    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// Number of distinct bitmaps registered with the document.
    pub fn embedded_image_count(&self) -> usize {
        self.resources.len()
    }

    /// Register `image` as a reusable XObject, or reuse the existing
    /// registration when the same bytes were embedded before.
    fn resource_for(&mut self, image: &EncodedImage) -> Result<usize> {
        if let Some(pos) = self.resources.iter().position(|r| r.bytes == image.bytes) {
            return Ok(pos);
        }

        // Decode with the `image` crate to obtain pixel dimensions.
        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|e| Error::Render(format!("embed decode error: {e}")))?;
        let (px_width, px_height) = (decoded.width(), decoded.height());

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let raw = RawImage::decode_from_bytes(&image.bytes, &mut warnings)
            .map_err(|e| Error::Render(format!("embed encode error: {e}")))?;
        let xobj_id = self.doc.add_image(&raw);
        log::debug!("registered {px_width}x{px_height}px bitmap as {:?}", xobj_id);

        self.resources.push(ImageResource {
            bytes: image.bytes.clone(),
            xobj_id,
            px_width,
            px_height,
        });
        Ok(self.resources.len() - 1)
    }
}

#[async_trait(?Send)]
impl Document for PrintPdfDocument {
    fn add_image(
        &mut self,
        image: &EncodedImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let pos = self.resource_for(image)?;
        let res = &self.resources[pos];

        // PDF origin is bottom-left; placement origin is top-left.
        // translate_y = bottom edge of the image in PDF coordinates.
        let img_bottom_y = self.page_height - y - height;

        // At dpi=72 printpdf renders 1 px = 1 pt, so
        // scale = desired_pt / px_dim.
        let scale_x = if res.px_width > 0 {
            width / res.px_width as f32
        } else {
            1.0
        };
        let scale_y = if res.px_height > 0 {
            height / res.px_height as f32
        } else {
            1.0
        };

        let op = Op::UseXobject {
            id: res.xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(img_bottom_y)),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        };
        self.pages
            .last_mut()
            .ok_or_else(|| Error::Render("document has no pages".into()))?
            .push(op);
        Ok(())
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let page_w = Mm(self.page_width * PT_TO_MM);
        let page_h = Mm(self.page_height * PT_TO_MM);

        let pages: Vec<PdfPage> = self
            .pages
            .iter()
            .map(|ops| PdfPage::new(page_w, page_h, ops.clone()))
            .collect();

        let mut doc = self.doc.clone();
        doc.with_pages(pages);
        Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
    }

    async fn save(&self, file_name: &str) -> Result<()> {
        let bytes = self.to_bytes()?;
        let path = format!("{file_name}.pdf");
        std::fs::write(&path, &bytes).map_err(|e| Error::Save(e.to_string()))?;
        log::info!("saved {} page(s) to {path}", self.page_count());
        Ok(())
    }
}
