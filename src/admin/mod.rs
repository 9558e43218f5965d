//! Admin panel: model-bound CRUD views over the quiz tables.
//!
//! Every admin route sits behind one gate, [`is_admin`]. The HTTP layer
//! applies it through the `AdminUser` extractor, so a view never sees a
//! caller that failed it.

pub mod format;
pub mod picker;
pub mod view;
pub mod views;

use std::sync::Arc;

pub use picker::{Choice, Picker};
pub use view::{AdminView, ColumnSpec, ListPage, ListQuery, ModelView, Row, ViewInfo};
pub use views::*;

use crate::database::entities::users;

/// Minimum `users.role` that opens the admin panel.
pub const ADMIN_ROLE_LEVEL: i32 = 1;

pub fn is_admin(user: &users::Model) -> bool {
    user.role >= ADMIN_ROLE_LEVEL
}

/// The registered views, in menu order.
#[derive(Clone)]
pub struct AdminRegistry {
    views: Vec<Arc<dyn AdminView>>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self {
            views: vec![
                Arc::new(TestView),
                Arc::new(SectionView),
                Arc::new(QuestionView),
                Arc::new(AnswerView),
                Arc::new(QuestionCategoryView),
                Arc::new(SessionQuestionView),
            ],
        }
    }

    pub fn views(&self) -> &[Arc<dyn AdminView>] {
        &self.views
    }

    pub fn get(&self, slug: &str) -> Option<Arc<dyn AdminView>> {
        self.views.iter().find(|v| v.info().slug == slug).cloned()
    }
}

impl Default for AdminRegistry {
    fn default() -> Self {
        Self::new()
    }
}
