//! QR code entity and its rendering customization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    #[default]
    H,
}

/// Rendering options stored with a QR code.
///
/// Serialized with the same camelCase keys the admin front-end uses so the
/// stored JSON can be fed straight into a QR renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrCustomization {
    pub size: u32,
    pub fg_color: String,
    pub bg_color: String,
    pub level: ErrorCorrectionLevel,
}

impl Default for QrCustomization {
    fn default() -> Self {
        Self {
            size: 256,
            fg_color: "#000000".to_string(),
            bg_color: "#FFFFFF".to_string(),
            level: ErrorCorrectionLevel::H,
        }
    }
}

/// A trackable QR code belonging to a worker.
///
/// `tracking_url` holds the opaque token embedded in the encoded redirect URL
/// (`/r/{tracking_url}`). It is unique and never changes after creation.
#[derive(Debug, Clone)]
pub struct QrCode {
    pub id: i64,
    pub worker_id: i64,
    pub purpose: String,
    pub username: Option<String>,
    pub product_code: Option<String>,
    pub target_url: String,
    pub tracking_url: String,
    pub customization: QrCustomization,
    pub scan_count: i64,
    pub created_at: DateTime<Utc>,
}

impl QrCode {
    /// Case-insensitive match against purpose, username or product code.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&query))
        };

        self.purpose.to_lowercase().contains(&query)
            || contains(&self.username)
            || contains(&self.product_code)
    }

    /// Display label: `(username) purpose`, or just the purpose.
    pub fn label(&self) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("({}) {}", username, self.purpose),
            None => self.purpose.clone(),
        }
    }
}

/// Input data for creating a new QR code.
#[derive(Debug, Clone)]
pub struct NewQrCode {
    pub worker_id: i64,
    pub purpose: String,
    pub username: Option<String>,
    pub product_code: Option<String>,
    pub target_url: String,
    pub tracking_url: String,
    pub customization: QrCustomization,
}

#[cfg(test)]
pub(crate) fn sample_qr_code(id: i64, worker_id: i64, tracking_url: &str) -> QrCode {
    QrCode {
        id,
        worker_id,
        purpose: "Flyer".to_string(),
        username: None,
        product_code: None,
        target_url: "https://example.com".to_string(),
        tracking_url: tracking_url.to_string(),
        customization: QrCustomization::default(),
        scan_count: 0,
        created_at: Utc::now(),
    }
}
