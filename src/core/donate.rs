use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::utils::error::{BotError, Result};
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Static donation wallets, in display order.
#[derive(Debug, Clone, Default)]
pub struct Wallets {
    entries: Vec<(String, String)>,
}

impl Wallets {
    pub fn new(usdt_sol: Option<String>, sol: Option<String>) -> Self {
        let mut entries = Vec::new();
        for (coin, addr) in [("USDT (Solana)", usdt_sol), ("SOL", sol)] {
            if let Some(addr) = addr {
                let addr = addr.trim();
                if !addr.is_empty() {
                    entries.push((coin.to_string(), addr.to_string()));
                }
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn address(&self, coin: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == coin)
            .map(|(_, addr)| addr.as_str())
    }

    pub fn keyboard(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup {
            inline_keyboard: self
                .entries
                .iter()
                .map(|(coin, _)| {
                    vec![InlineKeyboardButton::callback(
                        coin.clone(),
                        format!("donate:{}", coin),
                    )]
                })
                .collect(),
        }
    }
}

/// Payload encoded into the QR. SOL uses the solana: scheme; USDT keeps the
/// raw address for widest wallet compatibility.
pub fn qr_payload(coin: &str, addr: &str) -> String {
    if coin == "SOL" {
        format!("solana:{}", addr)
    } else {
        addr.to_string()
    }
}

pub fn qr_png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| BotError::Validation {
        message: format!("QR encoding failed: {}", e),
    })?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(360, 360)
        .quiet_zone(true)
        .build();

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

pub fn donation_caption(coin: &str, addr: &str) -> String {
    format!(
        "**{} Donation**\n`{}`\n\n• Network: Solana (SPL for USDT)\n• Scan the QR in your wallet app or copy the address above.",
        coin, addr
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_addresses_are_dropped() {
        let wallets = Wallets::new(Some("  ".to_string()), Some("So1AddR".to_string()));
        assert!(!wallets.is_empty());
        assert!(wallets.address("USDT (Solana)").is_none());
        assert_eq!(wallets.address("SOL"), Some("So1AddR"));
    }

    #[test]
    fn test_no_addresses_means_empty() {
        assert!(Wallets::new(None, None).is_empty());
    }

    #[test]
    fn test_addresses_are_trimmed() {
        let wallets = Wallets::new(Some(" usdtAddr \n".to_string()), None);
        assert_eq!(wallets.address("USDT (Solana)"), Some("usdtAddr"));
    }

    #[test]
    fn test_keyboard_has_one_row_per_coin() {
        let wallets = Wallets::new(Some("a".to_string()), Some("b".to_string()));
        let kb = wallets.keyboard();
        assert_eq!(kb.inline_keyboard.len(), 2);
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "donate:USDT (Solana)");
        assert_eq!(kb.inline_keyboard[1][0].callback_data, "donate:SOL");
    }

    #[test]
    fn test_qr_payload_scheme() {
        assert_eq!(qr_payload("SOL", "abc"), "solana:abc");
        assert_eq!(qr_payload("USDT (Solana)", "abc"), "abc");
    }

    #[test]
    fn test_qr_png_is_decodable() {
        let png = qr_png("solana:3xyzAddress").unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert!(img.width() >= 360);
        assert!(img.height() >= 360);
    }

    #[test]
    fn test_donation_caption_carries_address() {
        let caption = donation_caption("SOL", "3xyzAddress");
        assert!(caption.contains("`3xyzAddress`"));
        assert!(caption.contains("SOL Donation"));
    }
}
