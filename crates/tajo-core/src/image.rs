//! # Image Store Boundary
//!
//! The core only stores `imageUrl` strings on products. Deleting the
//! remote asset behind such a URL is the job of an external collaborator;
//! this module defines that seam and the URL parsing it needs.
//!
//! Hosted upload URLs look like:
//!
//! ```text
//! https://res.example.com/shop/image/upload/v1712345/products/ribeye.jpg
//!                                    └──────┘ └──────────────┘
//!                                  optional version   public id
//! ```
//!
//! The collaborator is tolerant by contract: a malformed URL produces a
//! reported failure, never a crash in the caller.

use thiserror::Error;

// =============================================================================
// Public Id Extraction
// =============================================================================

/// Pulls the hosting public id out of an upload URL.
///
/// The public id is everything after the `/upload/` segment (minus an
/// optional `v<digits>/` version prefix) with the file extension removed.
/// Returns `None` when the URL does not match that shape.
pub fn extract_public_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/upload/")?;

    // Optional version segment: v<digits>/
    let rest = match rest.split_once('/') {
        Some((first, tail))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };

    // Strip the extension; it must exist and be word characters only
    let (public_id, ext) = rest.rsplit_once('.')?;
    if public_id.is_empty()
        || ext.is_empty()
        || !ext.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        return None;
    }

    Some(public_id.to_string())
}

// =============================================================================
// Image Store Seam
// =============================================================================

/// A successful remote deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDeletion {
    pub url: String,
    pub public_id: String,
}

/// Failures the image collaborator can report.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The URL does not look like a hosted upload; nothing to delete.
    #[error("not a recognized image upload url: {url:?}")]
    MalformedUrl { url: String },

    /// The remote host refused or failed the deletion.
    #[error("image store failure: {0}")]
    Store(String),
}

/// The external image-hosting collaborator.
///
/// Implementations live outside this workspace (the HTTP adapter wires
/// one in); the catalog only hands over URLs after a product is removed.
pub trait ImageStore {
    /// Deletes the remote asset behind `url`.
    fn delete_image(&self, url: &str) -> Result<ImageDeletion, ImageError>;

    /// Deletes many assets, reporting per-URL outcomes. One malformed URL
    /// must not stop the rest.
    fn delete_images(&self, urls: &[String]) -> Vec<Result<ImageDeletion, ImageError>> {
        urls.iter().map(|url| self.delete_image(url)).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
