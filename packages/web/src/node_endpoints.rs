//! Tree page endpoints
//!
//! Each page is a GET-render / POST-mutate pair; successful writes redirect
//! to the index (303 See Other).
//!
//! # Endpoints
//!
//! - `GET /` - Tree in pre-order, or a link to create the root
//! - `GET|POST /node` - Create the root node
//! - `GET|POST /node/:uuid` - Show and rename a node
//! - `GET|POST /node/:uuid/add` - Show a node with the add-child form / add a child
//! - `GET|POST /node/:uuid/remove` - Delete a node and its subtree
//! - `GET /health` - Health check (JSON)

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Serialize;
use tracing::debug;

use crate::views::{self, EditNodePage};
use crate::{AppState, HttpError};
use treegraph_core::{TreeNode, TreeNodeForm, TreeServiceError};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Messages shown next to a form that failed validation
fn form_errors(form: &TreeNodeForm) -> Vec<String> {
    match form.validate() {
        Ok(()) => Vec::new(),
        Err(err) => vec![err.to_string()],
    }
}

async fn load_node(state: &AppState, uuid: &str) -> Result<TreeNode, HttpError> {
    state
        .service
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| HttpError::node_not_found(uuid))
}

/// Turn a rejected write on `uuid` into 404 when no such node is stored
///
/// The service reports unknown nodes as invalid arguments, so the lookup only
/// runs once a write has already failed.
async fn write_failed(state: &AppState, uuid: &str, err: TreeServiceError) -> HttpError {
    if matches!(err, TreeServiceError::InvalidArgument(_))
        && matches!(state.service.find_by_uuid(uuid).await, Ok(None))
    {
        return HttpError::node_not_found(uuid);
    }
    err.into()
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let stored = state.service.count().await?;
    let html = match state.service.get_root_node().await? {
        Some(root) => views::index_page(&state.service.get_preordered(&root), stored),
        None => views::index_page(&[], stored),
    };
    Ok(Html(html))
}

async fn create_tree_form() -> Html<String> {
    Html(views::create_tree_page(&TreeNodeForm::default(), &[]))
}

async fn submit_create_tree(
    State(state): State<AppState>,
    Form(form): Form<TreeNodeForm>,
) -> Result<Response, HttpError> {
    let errors = form_errors(&form);
    if !errors.is_empty() {
        debug!("Validation errors occurred");
        return Ok(Html(views::create_tree_page(&form, &errors)).into_response());
    }

    let _guard = state.write_lock.lock().await;
    state.service.create_tree(form.name()).await?;
    Ok(Redirect::to("/").into_response())
}

/// Render the edit page for `node`
async fn edit_page(
    state: &AppState,
    node: &TreeNode,
    form: &TreeNodeForm,
    errors: &[String],
    child_form: Option<&TreeNodeForm>,
    child_errors: &[String],
) -> Result<Html<String>, HttpError> {
    let children = state.service.find_by_parent(node).await?;
    let page = EditNodePage {
        node,
        children: &children,
        form,
        errors,
        child_form,
        child_errors,
    };
    Ok(Html(page.render()))
}

async fn edit_node_form(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Html<String>, HttpError> {
    let node = load_node(&state, &uuid).await?;
    edit_page(&state, &node, &TreeNodeForm::from_node(&node), &[], None, &[]).await
}

async fn submit_edit_node(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Form(form): Form<TreeNodeForm>,
) -> Result<Response, HttpError> {
    let errors = form_errors(&form);
    if !errors.is_empty() {
        debug!("Validation errors occurred");
        let node = load_node(&state, &uuid).await?;
        let page = edit_page(&state, &node, &form, &errors, None, &[]).await?;
        return Ok(page.into_response());
    }

    let _guard = state.write_lock.lock().await;
    match state.service.update_node(Some(&form), &uuid).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(err) => Err(write_failed(&state, &uuid, err).await),
    }
}

async fn add_child_form(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Html<String>, HttpError> {
    let node = load_node(&state, &uuid).await?;
    edit_page(
        &state,
        &node,
        &TreeNodeForm::from_node(&node),
        &[],
        Some(&TreeNodeForm::default()),
        &[],
    )
    .await
}

async fn submit_add_child(
    State(state): State<AppState>,
    Path(parent_uuid): Path<String>,
    Form(child_form): Form<TreeNodeForm>,
) -> Result<Response, HttpError> {
    let errors = form_errors(&child_form);
    if !errors.is_empty() {
        debug!("Validation errors occurred");
        let node = load_node(&state, &parent_uuid).await?;
        let form = TreeNodeForm::from_node(&node);
        let page = edit_page(&state, &node, &form, &[], Some(&child_form), &errors).await?;
        return Ok(page.into_response());
    }

    let _guard = state.write_lock.lock().await;
    let child = TreeNode::new(child_form.name());
    match state.service.add_node(Some(child), &parent_uuid).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(err) => Err(write_failed(&state, &parent_uuid, err).await),
    }
}

async fn remove_node(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Redirect, HttpError> {
    let _guard = state.write_lock.lock().await;
    match state.service.delete_node(&uuid).await {
        Ok(()) => Ok(Redirect::to("/")),
        Err(err) => Err(write_failed(&state, &uuid, err).await),
    }
}

/// Create the router with all tree page endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/node", get(create_tree_form).post(submit_create_tree))
        .route("/node/:uuid", get(edit_node_form).post(submit_edit_node))
        .route("/node/:uuid/add", get(add_child_form).post(submit_add_child))
        .route("/node/:uuid/remove", get(remove_node).post(remove_node))
        .with_state(state)
}
