//! Drive handlers: the file listing, page views and the record mutators.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::SessionClaims;
use crate::drive::{
    EntityStore, FileId, FileRecord, FilterConfig, FilterContext, PageState, PageView, Viewer,
};
use crate::web::dto::{
    ApiResponse, FileListQuery, FileListResponse, MutationResponse, PageQuery, PageResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionUser;

fn filter_context(state: &AppState, claims: &SessionClaims) -> FilterContext {
    FilterContext::new(Viewer::new(&claims.email)).in_timezone(state.timezone)
}

/// Run the pipeline over the store and copy the result out of the locks.
async fn working_set<F, T>(
    state: &AppState,
    claims: &SessionClaims,
    config: &FilterConfig,
    consume: F,
) -> (T, bool)
where
    F: FnOnce(&[&FileRecord]) -> T,
{
    let ctx = filter_context(state, claims);
    let store = state.store.read().await;
    let mut cache = state.view_cache.lock().await;
    let rows: Vec<&FileRecord> = cache.get_or_derive(&store, config, &ctx).iter().collect();
    (consume(&rows), store.is_loading())
}

/// GET /api/files - Working set under the given filters.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let config = query.to_config()?;
    let (files, loading) = working_set(&state, &claims, &config, |rows| {
        rows.iter().map(|r| (*r).clone()).collect::<Vec<_>>()
    })
    .await;

    Ok(Json(ApiResponse::new(FileListResponse {
        files,
        loading,
        filters: config,
    })))
}

/// GET /api/files/page/:page - A page view, sorted.
pub async fn page_view(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(page): Path<String>,
    Query(page_query): Query<PageQuery>,
    Query(filters): Query<FileListQuery>,
) -> Result<Json<ApiResponse<PageResponse>>, ApiError> {
    let page: PageView = page.parse().map_err(ApiError::not_found)?;
    let sort = page_query.to_sort()?;
    let config = filters.to_config()?;

    let page_state = PageState::new(page).with_sort(sort);
    let (files, _) = working_set(&state, &claims, &config, |rows| {
        page_state
            .render(rows, &config)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    })
    .await;

    Ok(Json(ApiResponse::new(PageResponse {
        page,
        title: page.title(),
        sort,
        files,
    })))
}

/// Apply a mutator under the write lock and report the outcome.
async fn mutate<F>(
    state: &AppState,
    claims: &SessionClaims,
    id: FileId,
    action: &'static str,
    op: F,
) -> Json<ApiResponse<MutationResponse>>
where
    F: FnOnce(&mut EntityStore, FileId) -> bool,
{
    let mut store = state.store.write().await;
    let changed = op(&mut *store, id);
    let file = store.get(id).cloned();
    drop(store);

    if changed {
        tracing::info!(id, user_id = claims.sub, action, "File updated");
    } else {
        tracing::debug!(id, user_id = claims.sub, action, "No file with this id");
    }

    Json(ApiResponse::new(MutationResponse { id, changed, file }))
}

/// POST /api/files/:id/star - Toggle the star.
pub async fn star_file(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(id): Path<FileId>,
) -> Json<ApiResponse<MutationResponse>> {
    mutate(&state, &claims, id, "star", EntityStore::toggle_star).await
}

/// POST /api/files/:id/trash - Move to the bin.
pub async fn trash_file(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(id): Path<FileId>,
) -> Json<ApiResponse<MutationResponse>> {
    mutate(&state, &claims, id, "trash", EntityStore::soft_delete).await
}

/// POST /api/files/:id/restore - Take out of the bin.
pub async fn restore_file(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(id): Path<FileId>,
) -> Json<ApiResponse<MutationResponse>> {
    mutate(&state, &claims, id, "restore", EntityStore::restore_from_bin).await
}

/// POST /api/files/:id/touch - Record an access.
pub async fn touch_file(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(id): Path<FileId>,
) -> Json<ApiResponse<MutationResponse>> {
    mutate(&state, &claims, id, "touch", EntityStore::touch_last_accessed).await
}

/// DELETE /api/files/:id - Delete permanently.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
    Path(id): Path<FileId>,
) -> Json<ApiResponse<MutationResponse>> {
    mutate(&state, &claims, id, "delete", EntityStore::delete_forever).await
}
