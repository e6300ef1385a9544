//! # Web Client
//!
//! The single-page inventory UI from `public/`, embedded into the binary
//! with rust-embed. Asset lookup doubles as the router fallback: a path that
//! names no asset gets the JSON "Route not found" response.

use crate::error::GarageError;
use axum::{
    body::Body,
    http::{header, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "public"]
pub struct ClientAssets;

pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Router fallback: serve an embedded asset or 404
pub async fn serve_client(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => "index.html",
        other => other,
    };

    match asset_response(path) {
        Some(response) => response,
        None => GarageError::NotFound(ROUTE_NOT_FOUND.to_string()).into_response(),
    }
}

fn asset_response(path: &str) -> Option<Response> {
    let content = ClientAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Some(
        (
            [
                (header::CONTENT_TYPE, mime.as_ref().to_string()),
                (header::CACHE_CONTROL, "no-cache".to_string()),
            ],
            Body::from(content.data.into_owned()),
        )
            .into_response(),
    )
}
