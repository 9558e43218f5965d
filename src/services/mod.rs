pub mod auth_service;
pub mod check_service;
pub mod check_task;
pub mod messages;
pub mod network_service;

pub use auth_service::*;
pub use check_service::*;
pub use check_task::*;
pub use messages::*;
pub use network_service::*;
