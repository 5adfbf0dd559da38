//! Booking confirmations and their check-in QR codes

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use serde::Serialize;

use crate::error::{AppError, Result};

use super::wizard::BookingPayload;

/// Confirmation returned to the guest once the wizard completes
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub reference: String,
    pub booking: BookingPayload,
    /// PNG QR code of the reference, base64-encoded
    pub qr_code_png_base64: String,
}

impl Confirmation {
    /// Build a confirmation for a completed booking
    pub fn issue(booking: BookingPayload) -> Result<Self> {
        let qr_code_png_base64 = render_qr_png_base64(&booking.reference)?;
        Ok(Self {
            reference: booking.reference.clone(),
            booking,
            qr_code_png_base64,
        })
    }
}

/// Render `data` as a QR code PNG and base64-encode it
pub fn render_qr_png_base64(data: &str) -> Result<String> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encoding failed: {}", e)))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(200, 200)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("PNG encoding failed: {}", e)))?;

    Ok(base64::engine::general_purpose::STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_render_qr_png_base64_is_png() {
        let encoded = render_qr_png_base64("SB-1A2B3C4D5E6F").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();

        assert!(bytes.len() > PNG_MAGIC.len());
        assert_eq!(bytes[..8], PNG_MAGIC);
    }

    #[test]
    fn test_render_qr_differs_per_reference() {
        let a = render_qr_png_base64("SB-AAAAAAAAAAAA").unwrap();
        let b = render_qr_png_base64("SB-BBBBBBBBBBBB").unwrap();
        assert_ne!(a, b);
    }
}
