// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer session endpoints: load, rescale, drag, views, lighting and the
//! property inspector.

use crate::error::ApiError;
use crate::types::{
    vector, ApplyResponse, BoundsInfo, DimensionsRequest, DragRequest, DragResponse, LightingInfo,
    LightingRequest, LoadRequest, LoadResponse, PropertiesQuery, ResetResponse, SessionResponse, ViewInfo,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bim_showcase_core::ElementProperties;
use bim_showcase_geometry::Vector3;
use bim_showcase_viewer::{compute_scale, LoadTicket, ModelSource, ViewerSession};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Clears the session's loading state if a load request ends before its
/// result is installed (timeout, client gone, conversion task failed).
pub(crate) struct PendingLoad {
    session: Arc<Mutex<ViewerSession>>,
    ticket: Option<LoadTicket>,
}

impl PendingLoad {
    pub(crate) fn new(session: Arc<Mutex<ViewerSession>>, ticket: LoadTicket) -> Self {
        Self {
            session,
            ticket: Some(ticket),
        }
    }

    /// The load reached `finish_load`; nothing to clean up
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        match self.session.try_lock() {
            Ok(mut session) => {
                session.abandon_load(&ticket);
            }
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let session = self.session.clone();
                    handle.spawn(async move {
                        session.lock().await.abandon_load(&ticket);
                    });
                }
                Err(_) => {
                    tracing::error!(file = ticket.file_name(), "Cannot release abandoned load")
                }
            },
        }
    }
}

/// POST /api/v1/session/load - Load a model from the objects directory.
///
/// The file is read and converted on the blocking pool without holding the
/// session lock. A load started later wins; this one then fails with
/// `LOAD_SUPERSEDED`. If the request is dropped before the result is
/// installed, the loading state is released again.
pub async fn load(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let ticket = state.session.lock().await.begin_load(&request.file_name)?;
    let mut pending = PendingLoad::new(state.session.clone(), ticket.clone());

    let objects = state.objects.clone();
    let importer = state.importer;
    let file_name = request.file_name;
    let result = tokio::task::spawn_blocking(move || {
        let bytes = objects.fetch(&file_name)?;
        importer.process(&bytes, |percent, stage| {
            tracing::debug!(file = %file_name, percent, stage, "Conversion progress");
        })
    })
    .await?;

    let mut session = state.session.lock().await;
    pending.disarm();
    let loaded = session.finish_load(ticket, result)?;

    Ok(Json(LoadResponse {
        model_id: loaded.model_id,
        element_count: loaded.element_count,
        bounds: BoundsInfo::from(&loaded.bounds),
        original: loaded.original.into(),
        status: session.status_line().unwrap_or_default(),
    }))
}

/// GET /api/v1/session - Current session state.
pub async fn state(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    let world = session.world();

    Json(SessionResponse {
        model_id: session.model_id().map(str::to_string),
        loading: session.loading().map(str::to_string),
        status: session.status_line(),
        original: session.original_dimensions().map(Into::into),
        target: session.target_dimensions().map(Into::into),
        scale: session.model_scale().as_ref().map(vector),
        position: session.model_position().as_ref().map(vector),
        bounds: session.model_bounds().as_ref().map(BoundsInfo::from),
        selected: session.selection().selected_id(),
        camera: (&world.camera).into(),
        lighting: (&world.lighting).into(),
        grid: (&world.grid).into(),
    })
}

/// POST /api/v1/session/dimensions/apply - Rescale to the target dimensions.
///
/// Fields present in the body replace the matching target value first; an
/// invalid target is rejected without touching the stored one.
pub async fn apply_dimensions(
    State(state): State<AppState>,
    Json(request): Json<DimensionsRequest>,
) -> Result<Json<ApplyResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let original = session.original_dimensions().ok_or(ApiError::NoModelLoaded)?;
    let mut target = session.target_dimensions().ok_or(ApiError::NoModelLoaded)?;

    if let Some(width) = request.width {
        target.width = width;
    }
    if let Some(height) = request.height {
        target.height = height;
    }
    if let Some(depth) = request.depth {
        target.depth = depth;
    }
    compute_scale(&target, &original)?;

    session.set_target_dimensions(target)?;
    let factors = session.apply_dimensions()?;
    let scale = session.model_scale().ok_or(ApiError::NoModelLoaded)?;

    Ok(Json(ApplyResponse {
        factors: [factors.x, factors.y, factors.z],
        scale: vector(&scale),
        bounds: session.model_bounds().as_ref().map(BoundsInfo::from),
        status: session.status_line(),
    }))
}

/// POST /api/v1/session/dimensions/reset - Restore the load-time scale.
pub async fn reset_dimensions(
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let dimensions = session.reset_dimensions()?;
    let scale = session.model_scale().ok_or(ApiError::NoModelLoaded)?;

    Ok(Json(ResetResponse {
        dimensions: dimensions.into(),
        scale: vector(&scale),
        status: session.status_line(),
    }))
}

/// POST /api/v1/session/drag - Drive the drag helper.
pub async fn drag(
    State(state): State<AppState>,
    Json(request): Json<DragRequest>,
) -> Result<Json<DragResponse>, ApiError> {
    let mut session = state.session.lock().await;

    let position = match request {
        DragRequest::Start => {
            session.start_drag()?;
            session.model_position()
        }
        DragRequest::Move { position: [x, y, z] } => Some(session.drag_to(Vector3::new(x, y, z))?),
        DragRequest::End => {
            session.end_drag()?;
            session.model_position()
        }
    };

    Ok(Json(DragResponse {
        position: position.as_ref().map(vector),
        controls_enabled: session.world().camera.controls_enabled(),
    }))
}

/// GET /api/v1/session/views - Floor plans and elevations.
pub async fn views(State(state): State<AppState>) -> Result<Json<Vec<ViewInfo>>, ApiError> {
    let session = state.session.lock().await;
    let views = session.views()?;
    Ok(Json(views.iter().map(ViewInfo::from).collect()))
}

/// POST /api/v1/session/lighting - Set light intensities.
pub async fn lighting(
    State(state): State<AppState>,
    Json(request): Json<LightingRequest>,
) -> Json<LightingInfo> {
    let mut session = state.session.lock().await;
    session.set_lighting(request.directional, request.ambient);
    Json((&session.world().lighting).into())
}

/// GET /api/v1/session/elements/:id/properties - Select an element.
pub async fn properties(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<PropertiesQuery>,
) -> Result<Json<ElementProperties>, ApiError> {
    let mut session = state.session.lock().await;
    let properties = session.select(id)?;

    let table = session
        .selection()
        .table(query.q.as_deref())
        .unwrap_or(properties);
    Ok(Json(table))
}

/// GET /api/v1/session/elements/:id/properties.tsv - Export as TSV.
pub async fn properties_tsv(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<PropertiesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = state.session.lock().await;
    let properties = session.select(id)?;

    let tsv = match query.q.as_deref() {
        Some(q) => properties.filter(q).to_tsv(),
        None => session.selection().export_tsv().unwrap_or_default(),
    };
    let file_name = format!(
        "{}-{}.tsv",
        session.model_id().unwrap_or("model"),
        id
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/tab-separated-values; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        tsv,
    ))
}

/// DELETE /api/v1/session/selection - Clear the selection.
pub async fn clear_selection(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.clear_selection();
    StatusCode::NO_CONTENT
}
