//! Raster capture – the collaborator seam for turning a live subtree into
//! one bitmap, the thin adapter that derives capture parameters from the
//! expanded tree, and the default painter for the in-memory scene tree.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::element::{Axis, LiveElement, Rect};
use crate::error::{Error, Result};
use crate::tree::SceneNode;

/// Pixel density multiplier for captures; doubled for sharper embeds.
pub const CAPTURE_SCALE: f32 = 2.0;

/// JPEG quality used when encoding the embeddable form.
pub const JPEG_QUALITY: u8 = 100;

/// Options passed to the rasterizer collaborator for one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureParams {
    /// Ask the rasterizer to fetch cross-origin resources with CORS.
    pub use_cors: bool,
    /// Allow tainted canvases rather than failing outright.
    pub allow_taint: bool,
    /// Pixel density multiplier.
    pub scale: f32,
    /// Horizontal scroll applied to the capture viewport.
    pub scroll_x: f32,
    /// Vertical scroll applied to the capture viewport.
    pub scroll_y: f32,
    /// Capture width in source pixels.
    pub width: f32,
    /// Capture height in source pixels.
    pub height: f32,
    /// Window width the rasterizer should assume.
    pub window_width: f32,
    /// Window height the rasterizer should assume.
    pub window_height: f32,
}

/// Image format of an encoded capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
        }
    }
}

/// A capture encoded once into its embeddable form.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// A captured bitmap: pixel dimensions plus one-shot encoding.
pub trait Bitmap {
    fn pixel_width(&self) -> u32;
    fn pixel_height(&self) -> u32;

    /// Encode to the embeddable image form. Called once per export; the
    /// result is reused for every page embed.
    fn encode(&self) -> Result<EncodedImage>;
}

/// External rasterizer collaborator.
///
/// Futures need not be `Send`; an export runs on the thread that owns
/// the tree.
#[async_trait(?Send)]
pub trait Rasterizer<E: LiveElement> {
    type Output: Bitmap;

    /// Capture the subtree rooted at `element` with the given options.
    /// A rejection (cross-origin taint, unsupported style, an empty
    /// capture area) surfaces as [`Error::Render`].
    async fn capture(&self, element: &E, params: &CaptureParams) -> Result<Self::Output>;
}

/// Capture the full content of `root`: client width by scroll height,
/// pinned to the document origin, at double density. Runs after scroll
/// expansion so the scroll height already includes unclipped content.
pub async fn capture_full_content<E, R>(rasterizer: &R, root: &E) -> Result<R::Output>
where
    E: LiveElement,
    R: Rasterizer<E>,
{
    let width = root.client_size().width;
    let height = root.scroll_size().height;
    let params = CaptureParams {
        use_cors: true,
        allow_taint: true,
        scale: CAPTURE_SCALE,
        scroll_x: 0.0,
        scroll_y: 0.0,
        width,
        height,
        window_width: width,
        window_height: height,
    };
    log::debug!("requesting {width}x{height}px capture at {CAPTURE_SCALE}x density");
    rasterizer.capture(root, &params).await
}

// ---------------------------------------------------------------------------
// Default scene-tree rasterizer
// ---------------------------------------------------------------------------

/// Paints a [`SceneNode`] subtree: white ground, background fills in
/// document order, clipping honored for nodes whose resolved overflow
/// hides content, bounding rects already carrying ancestor scroll.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneRasterizer;

#[async_trait(?Send)]
impl Rasterizer<SceneNode> for SceneRasterizer {
    type Output = RasterBitmap;

    async fn capture(&self, element: &SceneNode, params: &CaptureParams) -> Result<RasterBitmap> {
        if params.width <= 0.0 || params.height <= 0.0 {
            return Err(Error::Render(format!(
                "capture area is empty: {}x{}",
                params.width, params.height
            )));
        }

        let pixel_width = (params.width * params.scale).round().max(1.0) as u32;
        let pixel_height = (params.height * params.scale).round().max(1.0) as u32;
        let mut image = RgbaImage::from_pixel(pixel_width, pixel_height, Rgba([255, 255, 255, 255]));

        let origin = element.bounding_rect();
        let viewport = Rect::new(
            origin.left + params.scroll_x,
            origin.top + params.scroll_y,
            params.width,
            params.height,
        );
        paint(element, &mut image, viewport, &viewport, params.scale)?;

        log::debug!("captured {pixel_width}x{pixel_height}px bitmap");
        Ok(RasterBitmap { image })
    }
}

/// Paint one node and its subtree into `image`.
///
/// `clip` is the region still paintable in document coordinates. Any
/// clipping overflow on a node narrows the clip for its whole subtree;
/// per-axis clipping is not modeled separately.
fn paint(
    node: &SceneNode,
    image: &mut RgbaImage,
    clip: Rect,
    viewport: &Rect,
    scale: f32,
) -> Result<()> {
    if clip.width <= 0.0 || clip.height <= 0.0 {
        return Ok(());
    }

    let rect = node.bounding_rect();
    if let Some(color) = node.background() {
        fill(image, intersect(rect, clip), viewport, scale, color);
    }

    let clips = node.resolved_overflow(Axis::Horizontal)?.clips()
        || node.resolved_overflow(Axis::Vertical)?.clips();
    let child_clip = if clips { intersect(rect, clip) } else { clip };

    for child in node.children() {
        paint(&child, image, child_clip, viewport, scale)?;
    }
    Ok(())
}

fn intersect(a: Rect, b: Rect) -> Rect {
    let left = a.left.max(b.left);
    let top = a.top.max(b.top);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    Rect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
}

fn fill(image: &mut RgbaImage, rect: Rect, viewport: &Rect, scale: f32, color: [u8; 3]) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let x0 = (((rect.left - viewport.left) * scale).round().max(0.0)) as u32;
    let y0 = (((rect.top - viewport.top) * scale).round().max(0.0)) as u32;
    let x1 = ((((rect.right() - viewport.left) * scale).round()).max(0.0) as u32).min(image.width());
    let y1 = ((((rect.bottom() - viewport.top) * scale).round()).max(0.0) as u32).min(image.height());
    let pixel = Rgba([color[0], color[1], color[2], 255]);
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x, y, pixel);
        }
    }
}

/// Bitmap produced by [`SceneRasterizer`].
#[derive(Debug, Clone)]
pub struct RasterBitmap {
    image: RgbaImage,
}

impl RasterBitmap {
    /// Pixel value at the given coordinates, for probing captures.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }
}

impl Bitmap for RasterBitmap {
    fn pixel_width(&self) -> u32 {
        self.image.width()
    }

    fn pixel_height(&self) -> u32 {
        self.image.height()
    }

    fn encode(&self) -> Result<EncodedImage> {
        // JPEG has no alpha channel; flatten first.
        let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| Error::Render(e.to_string()))?;
        Ok(EncodedImage {
            format: ImageFormat::Jpeg,
            bytes,
        })
    }
}
