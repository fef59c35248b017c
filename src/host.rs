//! Host environment – the seam for everything the exporter needs from its
//! surroundings: waiting for styles to settle, and the hidden-frame print
//! flow used by previews.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Print CSS injected into the preview frame so the dialog offers the
/// rotated paper.
pub const LANDSCAPE_PRINT_CSS: &str = "@page { size: landscape; }";

/// How often a host should re-check whether the print dialog is still
/// open while awaiting dismissal.
pub const DISMISSAL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Surroundings of an export run.
///
/// A browser-backed host would park these calls on the event loop; the
/// native host resolves them directly.
#[async_trait(?Send)]
pub trait HostEnvironment {
    type Frame;

    /// Wait for pending style or layout work to apply.
    async fn settle(&self, duration: Duration);

    /// Mount an invisible frame showing `uri`, with `css` injected into
    /// the framed document.
    fn open_hidden_frame(&self, uri: &str, css: &str) -> Result<Self::Frame>;

    /// Open the print dialog for the framed document.
    async fn invoke_print(&self, frame: &Self::Frame) -> Result<()>;

    /// Resolve once the print dialog has been dismissed.
    async fn await_dialog_dismissal(&self, frame: &Self::Frame);

    /// Tear the frame down.
    fn remove_frame(&self, frame: Self::Frame);
}

/// Frame handle used by [`NativeHost`]; keeps the preview payload so
/// callers can inspect what would have been shown.
#[derive(Debug, Clone)]
pub struct NativeFrame {
    pub uri: String,
    pub css: String,
}

/// Host for running outside a browser. There is no real print dialog;
/// the print flow logs and resolves immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

#[async_trait(?Send)]
impl HostEnvironment for NativeHost {
    type Frame = NativeFrame;

    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn open_hidden_frame(&self, uri: &str, css: &str) -> Result<NativeFrame> {
        log::debug!("opened hidden frame ({} byte uri)", uri.len());
        Ok(NativeFrame {
            uri: uri.to_string(),
            css: css.to_string(),
        })
    }

    async fn invoke_print(&self, _frame: &NativeFrame) -> Result<()> {
        log::info!("print dialog requested");
        Ok(())
    }

    async fn await_dialog_dismissal(&self, _frame: &NativeFrame) {
        log::debug!("no dialog to dismiss");
    }

    fn remove_frame(&self, frame: NativeFrame) {
        log::debug!("removed hidden frame ({} byte uri)", frame.uri.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn native_frame_keeps_the_preview_payload() {
        let host = NativeHost;
        let frame = host
            .open_hidden_frame("data:application/pdf;base64,AAAA", LANDSCAPE_PRINT_CSS)
            .unwrap();
        assert_eq!(frame.uri, "data:application/pdf;base64,AAAA");
        assert_eq!(frame.css, "@page { size: landscape; }");
        host.invoke_print(&frame).await.unwrap();
        host.await_dialog_dismissal(&frame).await;
        host.remove_frame(frame);
    }

    #[tokio::test]
    async fn settle_waits_the_requested_interval() {
        let host = NativeHost;
        let started = std::time::Instant::now();
        host.settle(Duration::from_millis(10)).await;
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
