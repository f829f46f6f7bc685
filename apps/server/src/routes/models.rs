// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model catalog endpoint.

use crate::error::ApiError;
use crate::types::{CatalogItem, ModelsResponse};
use crate::AppState;
use axum::{extract::State, Json};
use bim_showcase_viewer::{model_id, ViewerError, DEMO_CATALOG};

/// GET /api/v1/models - Demo catalog plus the files actually on disk.
pub async fn list(State(state): State<AppState>) -> Result<Json<ModelsResponse>, ApiError> {
    let objects = state.objects.clone();
    let available = match tokio::task::spawn_blocking(move || objects.list()).await? {
        Ok(names) => names,
        Err(ViewerError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(dir = %state.objects.root().display(), "Objects directory does not exist");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let catalog = DEMO_CATALOG
        .iter()
        .map(|entry| CatalogItem {
            file_name: entry.file_name,
            label: entry.label,
            model_id: model_id(entry.file_name),
        })
        .collect();

    Ok(Json(ModelsResponse { catalog, available }))
}
