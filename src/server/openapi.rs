use utoipa::OpenApi;

use super::handlers::{admin, auth, health, networks};
use crate::admin::{Choice, ColumnSpec, ViewInfo};
use crate::services::{CheckReport, FlashLevel, FlashMessage, NetworkView};

#[derive(OpenApi)]
#[openapi(
    info(title = "Miminet server", description = "Network editor and quiz admin API"),
    paths(
        health::health_check,
        auth::login_page,
        auth::login,
        auth::logout,
        networks::home,
        networks::create_network,
        networks::update_network_config,
        networks::delete_network,
        networks::web_network,
        networks::web_network_shared,
        networks::post_nodes,
        networks::post_edges,
        networks::post_nodes_edges,
        networks::move_nodes,
        admin::index,
        admin::check_by_question_form,
        admin::check_by_question,
        admin::create_check_task_form,
        admin::create_check_task,
    ),
    components(schemas(
        NetworkView,
        networks::Done,
        networks::NetworkSummary,
        networks::RenameForm,
        auth::LoginForm,
        auth::LoginResponse,
        admin::AdminIndex,
        admin::AdminTool,
        admin::CheckByQuestionForm,
        admin::CreateCheckTaskForm,
        ViewInfo,
        ColumnSpec,
        Choice,
        CheckReport,
        FlashMessage,
        FlashLevel,
    ))
)]
pub struct ApiDoc;
