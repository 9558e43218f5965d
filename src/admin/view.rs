//! Generic model-bound admin views.
//!
//! A [`ModelView`] describes one table: its columns, how a form is applied to
//! an active model, and how a row is formatted. Every `ModelView` is an
//! [`AdminView`] through the blanket impl below, which owns the shared CRUD
//! flow: ownership stamping on create, the creator check on edit, sorting and
//! pagination.

use std::str::FromStr;

use async_trait::async_trait;
use sea_orm::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use super::picker::{Choice, Picker};
use crate::database::entities::users;
use crate::errors::{AdminError, AdminResult};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A formatted row, keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            sortable: false,
        }
    }

    pub const fn sortable(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            sortable: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Column to sort by; must be sortable
    pub sort: Option<String>,
    #[serde(default)]
    pub desc: bool,
    /// 1-based page number
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListQuery {
    fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListPage {
    pub view: &'static str,
    pub columns: Vec<ColumnSpec>,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub can_create: bool,
    pub can_delete: bool,
    pub columns: Vec<ColumnSpec>,
}

/// One admin table.
#[async_trait]
pub trait ModelView: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::Active>
        + Clone
        + Send
        + Sync
        + 'static;
    type Active: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + Default
        + Send
        + 'static;
    type Form: DeserializeOwned + Send + 'static;

    const SLUG: &'static str;
    const TITLE: &'static str;
    const CAN_CREATE: bool = true;
    const CAN_DELETE: bool = true;
    /// Rows record their creator and may only be edited by them
    const OWNED: bool = true;

    fn columns(&self) -> &'static [ColumnSpec];

    fn id_column(&self) -> <Self::Entity as EntityTrait>::Column;

    fn id(&self, model: &Self::Model) -> i32;

    fn created_by(&self, _model: &Self::Model) -> Option<i32> {
        None
    }

    fn pickers(&self) -> &'static [(&'static str, Picker)] {
        &[]
    }

    /// Fill creator and timestamp columns of a new row.
    fn stamp_created(&self, _active: &mut Self::Active, _user: &users::Model) {}

    fn stamp_updated(&self, _active: &mut Self::Active) {}

    /// Validate the form and copy it into `active`. Nothing is written if
    /// this fails.
    async fn apply_form(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: Self::Form,
        active: &mut Self::Active,
    ) -> AdminResult<()>;

    async fn format_row(&self, db: &DatabaseConnection, model: &Self::Model) -> AdminResult<Row>;
}

/// Object-safe face of a view, used by the router.
#[async_trait]
pub trait AdminView: Send + Sync {
    fn info(&self) -> ViewInfo;

    async fn list(&self, db: &DatabaseConnection, query: &ListQuery) -> AdminResult<ListPage>;

    async fn get(&self, db: &DatabaseConnection, id: i32) -> AdminResult<Row>;

    async fn create(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: Value,
    ) -> AdminResult<Row>;

    async fn update(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        id: i32,
        form: Value,
    ) -> AdminResult<Row>;

    async fn delete(&self, db: &DatabaseConnection, id: i32) -> AdminResult<()>;

    async fn choices(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        field: &str,
    ) -> AdminResult<Vec<Choice>>;
}

/// Unwrap a `json!({...})` literal into a row.
pub fn into_row(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        _ => Row::new(),
    }
}

fn parse_form<F: DeserializeOwned>(form: Value) -> AdminResult<F> {
    serde_json::from_value(form).map_err(|e| AdminError::Validation(e.to_string()))
}

async fn find_row<V: ModelView>(
    view: &V,
    db: &DatabaseConnection,
    id: i32,
) -> AdminResult<V::Model> {
    V::Entity::find()
        .filter(view.id_column().eq(id))
        .one(db)
        .await?
        .ok_or(AdminError::NotFound { view: V::SLUG, id })
}

#[async_trait]
impl<V: ModelView> AdminView for V {
    fn info(&self) -> ViewInfo {
        ViewInfo {
            slug: V::SLUG,
            title: V::TITLE,
            can_create: V::CAN_CREATE,
            can_delete: V::CAN_DELETE,
            columns: self.columns().to_vec(),
        }
    }

    async fn list(&self, db: &DatabaseConnection, query: &ListQuery) -> AdminResult<ListPage> {
        let sort_column = query
            .sort
            .as_deref()
            .filter(|name| self.columns().iter().any(|c| c.sortable && c.name == *name))
            .and_then(|name| <V::Entity as EntityTrait>::Column::from_str(name).ok())
            .unwrap_or_else(|| self.id_column());
        let order = if query.desc { Order::Desc } else { Order::Asc };

        let page_size = query.page_size();
        let page = query.page();

        let paginator = V::Entity::find()
            .order_by(sort_column, order)
            .paginate(db, page_size);
        let totals = paginator.num_items_and_pages().await?;
        let models = paginator.fetch_page(page - 1).await?;

        let mut rows = Vec::with_capacity(models.len());
        for model in &models {
            rows.push(self.format_row(db, model).await?);
        }

        Ok(ListPage {
            view: V::SLUG,
            columns: self.columns().to_vec(),
            rows,
            page,
            page_size,
            total: totals.number_of_items,
            pages: totals.number_of_pages,
        })
    }

    async fn get(&self, db: &DatabaseConnection, id: i32) -> AdminResult<Row> {
        let model = find_row(self, db, id).await?;
        self.format_row(db, &model).await
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: Value,
    ) -> AdminResult<Row> {
        if !V::CAN_CREATE {
            return Err(AdminError::ActionNotAllowed {
                view: V::SLUG,
                action: "create",
            });
        }

        let form: V::Form = parse_form(form)?;
        let mut active = <V::Active as Default>::default();
        self.apply_form(db, user, form, &mut active).await?;
        self.stamp_created(&mut active, user);

        let model = active.insert(db).await?;
        info!("User {} created {} {}", user.id, V::SLUG, self.id(&model));
        self.format_row(db, &model).await
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        id: i32,
        form: Value,
    ) -> AdminResult<Row> {
        let existing = find_row(self, db, id).await?;

        if V::OWNED && self.created_by(&existing) != Some(user.id) {
            error!(
                "User {} tried to edit {} {} created by {:?}",
                user.id,
                V::SLUG,
                id,
                self.created_by(&existing)
            );
            return Err(AdminError::ForeignEdit { view: V::SLUG, id });
        }

        let form: V::Form = parse_form(form)?;
        let mut active: V::Active = existing.into_active_model();
        self.apply_form(db, user, form, &mut active).await?;
        self.stamp_updated(&mut active);

        let model = active.update(db).await?;
        self.format_row(db, &model).await
    }

    async fn delete(&self, db: &DatabaseConnection, id: i32) -> AdminResult<()> {
        if !V::CAN_DELETE {
            return Err(AdminError::ActionNotAllowed {
                view: V::SLUG,
                action: "delete",
            });
        }

        let result = V::Entity::delete_many()
            .filter(self.id_column().eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AdminError::NotFound { view: V::SLUG, id });
        }
        info!("Deleted {} {}", V::SLUG, id);
        Ok(())
    }

    async fn choices(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        field: &str,
    ) -> AdminResult<Vec<Choice>> {
        let picker = self
            .pickers()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, picker)| *picker)
            .ok_or_else(|| AdminError::UnknownPicker {
                view: V::SLUG,
                field: field.to_string(),
            })?;
        picker.choices(db, user).await
    }
}
