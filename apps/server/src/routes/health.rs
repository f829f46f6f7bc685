// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check and API information endpoints.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

const SERVICE: &str = "bim-showcase-server";

/// GET /api/v1/health - Health check endpoint.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: SERVICE,
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    let endpoint = |method, path, description| EndpointInfo {
        method,
        path,
        description,
    };

    Json(ApiInfoResponse {
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
        description: "BIM object showcase: load, resize, move and inspect IFC models",
        endpoints: vec![
            endpoint("GET", "/api/v1/health", "Health check endpoint"),
            endpoint("GET", "/api/v1/models", "Demo catalog and available model files"),
            endpoint("POST", "/api/v1/session/load", "Load a model from the objects directory"),
            endpoint("GET", "/api/v1/session", "Session state: model, dimensions, camera, lighting"),
            endpoint("POST", "/api/v1/session/dimensions/apply", "Rescale the model to target dimensions"),
            endpoint("POST", "/api/v1/session/dimensions/reset", "Restore the load-time scale"),
            endpoint("POST", "/api/v1/session/drag", "Start, move or end a drag of the model"),
            endpoint("GET", "/api/v1/session/views", "Floor plan and elevation views"),
            endpoint("POST", "/api/v1/session/lighting", "Set light intensities"),
            endpoint("GET", "/api/v1/session/elements/:id/properties", "Select an element and list its properties"),
            endpoint("GET", "/api/v1/session/elements/:id/properties.tsv", "Export element properties as TSV"),
            endpoint("DELETE", "/api/v1/session/selection", "Clear the selection"),
        ],
    })
}
