pub mod answers;
pub mod networks;
pub mod question_categories;
pub mod questions;
pub mod quiz_sessions;
pub mod quiz_tests;
pub mod sections;
pub mod session_questions;
pub mod simulates;
pub mod user_sessions;
pub mod users;
