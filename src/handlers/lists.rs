// handlers/lists.rs - CRUD for lists
//
// GET    /                 -> 302 /lists
// GET    /lists            index page
// GET    /lists/:id        show page
// POST   /lists            create, returns the new card
// GET    /lists/:id/edit   card in rename mode
// PATCH  /lists/:id        rename, returns the card
// DELETE /lists/:id        204, whether or not the list existed

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::extract::{FormOrJson, ListId, Viewer};
use super::{fragment, page};
use crate::app::AppState;
use crate::database::ListName;
use crate::error::AppError;
use crate::middleware::response::{HX_RESWAP, HX_RETARGET};
use crate::view::{Card, NewListForm, Partial, View};

#[derive(Debug, Deserialize)]
pub struct NameInput {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
struct IndexPage {
    lists: Vec<Card>,
    form: NewListForm,
}

#[derive(Serialize)]
struct CardData {
    card: Card,
}

#[derive(Serialize)]
struct FormData {
    form: NewListForm,
}

#[derive(Serialize)]
struct CreatedData {
    card: Card,
    form: NewListForm,
}

pub async fn root() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/lists")]).into_response()
}

pub async fn list_index(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Response, AppError> {
    let lists = state.lists.filter_lists().await?;
    debug!(count = lists.len(), "listing lists");

    let data = IndexPage {
        lists: lists.into_iter().map(Card::new).collect(),
        form: NewListForm::default(),
    };
    page(&state, &viewer, StatusCode::OK, View::ListsIndex, &data).await
}

pub async fn show_list(
    State(state): State<AppState>,
    viewer: Viewer,
    ListId(id): ListId,
) -> Result<Response, AppError> {
    let list = state.lists.get_list_by_id(id).await?;
    let data = CardData { card: Card::new(list) };
    page(&state, &viewer, StatusCode::OK, View::ListsShow, &data).await
}

/// Rejected names come back as the form with an inline error (422) so the
/// page can show it in place.
pub async fn create_list(
    State(state): State<AppState>,
    viewer: Viewer,
    FormOrJson(input): FormOrJson<NameInput>,
) -> Result<Response, AppError> {
    debug!(name = %input.name, "create list");

    let name = match ListName::parse(&input.name) {
        Ok(name) => name,
        Err(err) => {
            let data = FormData {
                form: NewListForm::rejected(input.name, err),
            };
            let mut response = fragment(
                &state,
                &viewer,
                StatusCode::UNPROCESSABLE_ENTITY,
                Partial::ListForm,
                &data,
            )
            .await?;
            let headers = response.headers_mut();
            headers.insert(HX_RETARGET, HeaderValue::from_static("#new-list-form"));
            headers.insert(HX_RESWAP, HeaderValue::from_static("outerHTML"));
            return Ok(response);
        }
    };

    let list = state.lists.create_list(&name).await?;
    info!(id = list.id, "created list");

    let data = CreatedData {
        card: Card::new(list),
        form: NewListForm::reset(),
    };
    fragment(&state, &viewer, StatusCode::OK, Partial::ListCreated, &data).await
}

pub async fn edit_list(
    State(state): State<AppState>,
    viewer: Viewer,
    ListId(id): ListId,
) -> Result<Response, AppError> {
    let list = state.lists.get_list_by_id(id).await?;
    let data = CardData {
        card: Card::editing(list),
    };
    fragment(&state, &viewer, StatusCode::OK, Partial::ListCard, &data).await
}

pub async fn update_list(
    State(state): State<AppState>,
    viewer: Viewer,
    ListId(id): ListId,
    FormOrJson(input): FormOrJson<NameInput>,
) -> Result<Response, AppError> {
    debug!(id, name = %input.name, "update list");

    let name = ListName::parse(&input.name)?;
    let list = state.lists.update_list_by_id(id, &name).await?;

    let data = CardData { card: Card::new(list) };
    fragment(&state, &viewer, StatusCode::OK, Partial::ListCard, &data).await
}

pub async fn delete_list(State(state): State<AppState>, ListId(id): ListId) -> Result<StatusCode, AppError> {
    state.lists.delete_list_by_id(id).await?;
    info!(id, "deleted list");
    Ok(StatusCode::NO_CONTENT)
}
