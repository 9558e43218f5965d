use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::document::split_topology;
use crate::errors::{NetworkError, NetworkResult};
use crate::server::app::AppState;
use crate::server::extract::{CurrentUser, JsonBody};
use crate::server::flash::{self, redirect_with};
use crate::server::responses::{network_json_error, network_page_error, HOME_PATH};
use crate::services::{FlashMessage, NetworkAccess, NetworkView};

const MISSING_GUID_ON_DELETE: &str = "Пропущен параметр GUID. И какую сеть мне удалить?!";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GuidQuery {
    /// Network GUID
    pub guid: Option<String>,
}

impl GuidQuery {
    fn guid(&self) -> Result<&str, NetworkError> {
        self.guid
            .as_deref()
            .filter(|g| !g.is_empty())
            .ok_or(NetworkError::MissingGuid)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameForm {
    pub network_title: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Done {
    pub message: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NetworkSummary {
    pub guid: String,
    pub title: String,
    pub share_mode: bool,
}

fn editor_path(guid: &str) -> String {
    format!("/web_network?guid={}", guid)
}

fn done() -> Response {
    (
        StatusCode::CREATED,
        Json(Done {
            message: "Done",
            code: "SUCCESS",
        }),
    )
        .into_response()
}

/// The caller's networks and any messages left by the last redirect.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Networks owned by the caller"))
)]
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Response {
    let messages = flash::pending(&headers);
    let networks = match state.networks.list_owned(&user).await {
        Ok(networks) => networks,
        Err(e) => return network_json_error(e),
    };

    let networks: Vec<NetworkSummary> = networks
        .into_iter()
        .map(|n| NetworkSummary {
            guid: n.guid,
            title: n.title,
            share_mode: n.share_mode,
        })
        .collect();

    let mut response = Json(json!({
        "user": user.nick,
        "networks": networks,
        "messages": messages,
    }))
    .into_response();
    if !messages.is_empty() {
        flash::clear(&mut response);
    }
    response
}

#[utoipa::path(
    post,
    path = "/create_network",
    responses((status = 303, description = "Redirect to the editor of the new network"))
)]
pub async fn create_network(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Response {
    match state.networks.create(&user).await {
        Ok(network) => Redirect::to(&editor_path(&network.guid)).into_response(),
        Err(e) => network_page_error(e),
    }
}

/// GET only checks the network; POST renames it.
pub async fn network_config(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
) -> Response {
    let result = match query.guid() {
        Ok(guid) => state.networks.owned(&user, guid).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(network) => Redirect::to(&editor_path(&network.guid)).into_response(),
        Err(e) => network_page_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/update_network_config",
    params(GuidQuery),
    request_body(content = RenameForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Redirect to the editor, or home with a message"))
)]
pub async fn update_network_config(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
    Form(form): Form<RenameForm>,
) -> Response {
    let guid = match query.guid() {
        Ok(guid) => guid,
        Err(e) => return network_page_error(e),
    };
    let title = form.network_title.unwrap_or_default();
    match state.networks.rename(&user, guid, &title).await {
        Ok(_) => Redirect::to(&editor_path(guid)).into_response(),
        Err(e) => network_page_error(e),
    }
}

fn delete_guid(query: &GuidQuery) -> Result<&str, Response> {
    query.guid().map_err(|_| {
        redirect_with(HOME_PATH, &[FlashMessage::warning(MISSING_GUID_ON_DELETE)])
    })
}

/// Confirmation page stand-in: checks ownership and goes home.
pub async fn delete_network_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
) -> Response {
    let guid = match delete_guid(&query) {
        Ok(guid) => guid,
        Err(response) => return response,
    };
    match state.networks.owned(&user, guid).await {
        Ok(_) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => network_page_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/delete_network",
    params(GuidQuery),
    responses((status = 303, description = "Network deleted, redirect home"))
)]
pub async fn delete_network(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
) -> Response {
    let guid = match delete_guid(&query) {
        Ok(guid) => guid,
        Err(response) => return response,
    };
    match state.networks.delete(&user, guid).await {
        Ok(()) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => network_page_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/web_network",
    params(GuidQuery),
    responses(
        (status = 200, description = "The owner's view of the network", body = NetworkView),
        (status = 303, description = "Shared view of a foreign network, or home")
    )
)]
pub async fn web_network(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
) -> Response {
    let result = match query.guid() {
        Ok(guid) => state.networks.open(&user, guid).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(NetworkAccess::Owner(view)) => Json(*view).into_response(),
        Ok(NetworkAccess::Shared { guid }) => {
            Redirect::to(&format!("/web_network_shared?guid={}", guid)).into_response()
        }
        Err(e) => network_page_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/web_network_shared",
    params(GuidQuery),
    responses(
        (status = 200, description = "Read-only view of a shared network", body = NetworkView),
        (status = 303, description = "Network is missing or not shared")
    )
)]
pub async fn web_network_shared(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<GuidQuery>,
) -> Response {
    let result = match query.guid() {
        Ok(guid) => state.networks.open_shared(guid).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(view) => Json(view).into_response(),
        Err(e) => network_page_error(e),
    }
}

/// Body: the complete node array.
#[utoipa::path(
    post,
    path = "/post_nodes",
    params(GuidQuery),
    request_body = Vec<Object>,
    responses(
        (status = 201, description = "Nodes replaced, simulations discarded", body = Done),
        (status = 400, description = "Missing GUID, unknown network or bad body")
    )
)]
pub async fn post_nodes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
    JsonBody(payload): JsonBody,
) -> Response {
    let result: NetworkResult<()> = async {
        let guid = query.guid()?;
        let nodes = payload?;
        state.networks.replace_nodes(&user, guid, nodes).await
    }
    .await;
    result.map_or_else(network_json_error, |()| done())
}

/// Body: the complete edge array.
#[utoipa::path(
    post,
    path = "/post_edges",
    params(GuidQuery),
    request_body = Vec<Object>,
    responses(
        (status = 201, description = "Edges replaced", body = Done),
        (status = 400, description = "Missing GUID, unknown network or bad body")
    )
)]
pub async fn post_edges(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
    JsonBody(payload): JsonBody,
) -> Response {
    let result: NetworkResult<()> = async {
        let guid = query.guid()?;
        let edges = payload?;
        state.networks.replace_edges(&user, guid, edges).await
    }
    .await;
    result.map_or_else(network_json_error, |()| done())
}

/// Body: `[nodes, edges]`.
#[utoipa::path(
    post,
    path = "/post_nodes_edges",
    params(GuidQuery),
    request_body = Vec<Vec<Object>>,
    responses(
        (status = 201, description = "Topology replaced, orphan jobs pruned, simulations discarded", body = Done),
        (status = 400, description = "Missing GUID, unknown network or bad body")
    )
)]
pub async fn post_nodes_edges(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
    JsonBody(payload): JsonBody,
) -> Response {
    let result: NetworkResult<()> = async {
        let guid = query.guid()?;
        let (nodes, edges) = split_topology(payload?)?;
        state.networks.replace_topology(&user, guid, nodes, edges).await
    }
    .await;
    result.map_or_else(network_json_error, |()| done())
}

/// Body: the node array with updated positions.
#[utoipa::path(
    post,
    path = "/move_nodes",
    params(GuidQuery),
    request_body = Vec<Object>,
    responses(
        (status = 201, description = "Nodes replaced, simulations kept", body = Done),
        (status = 400, description = "Missing GUID, unknown network or bad body")
    )
)]
pub async fn move_nodes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GuidQuery>,
    JsonBody(payload): JsonBody,
) -> Response {
    let result: NetworkResult<()> = async {
        let guid = query.guid()?;
        let nodes = payload?;
        state.networks.move_nodes(&user, guid, nodes).await
    }
    .await;
    result.map_or_else(network_json_error, |()| done())
}
