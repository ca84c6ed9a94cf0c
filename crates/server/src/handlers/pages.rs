#![forbid(unsafe_code)]

use super::ListQuery;
use crate::{ApiError, AppState, render, views};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use ob_core::text::slugify;

pub(crate) async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, ApiError> {
    let request = query.to_request()?;
    let summaries = state.with_store(|store| store.client_summaries(request))?;
    Ok(Html(render::dashboard(&summaries)))
}

/// Creates the next numbered placeholder client and sends the browser to its
/// form with `303 See Other`.
pub(crate) async fn new_client(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let (client, _) = state.with_store(|store| store.client_create_placeholder())?;
    Ok(Redirect::to(&format!("/cliente/{}", client.slug)))
}

/// Non-canonical paths such as `/cliente/Acme-Corp` are redirected to their
/// slug; paths with nothing usable get an HTML 404.
pub(crate) async fn client_form(
    State(state): State<AppState>,
    Path(requested): Path<String>,
) -> Result<Response, ApiError> {
    let slug = slugify(&requested);
    if slug.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Html(render::not_found_page(&requested)),
        )
            .into_response());
    }
    if slug != requested {
        return Ok(Redirect::permanent(&format!("/cliente/{slug}")).into_response());
    }

    let (display_name, data) = state.with_store(|store| {
        let client = store.client_get_or_create_by_slug(&slug)?;
        let form = store.form_get_or_create(client.id)?;
        let data = views::page_data(store.schema(), &client, Some(&form));
        Ok((client.display_name, data))
    })?;
    Ok(Html(render::form_page(&display_name, &data)).into_response())
}
