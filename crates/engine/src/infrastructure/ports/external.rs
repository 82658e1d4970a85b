//! External service port traits.

use super::error::BarcodeError;

/// 2D-barcode rendering.
///
/// The engine hands the renderer an opaque payload string and receives back
/// an image suitable for display; it never implements rendering itself.
#[cfg_attr(test, mockall::automock)]
pub trait BarcodePort: Send + Sync {
    /// Render the payload as an SVG document.
    fn render_svg(&self, payload: &str) -> Result<String, BarcodeError>;
}
