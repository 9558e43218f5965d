use chrono::Utc;
use sea_orm::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::entities::{networks, simulates, users};
use crate::document::NetworkDocument;
use crate::errors::{NetworkError, NetworkResult};

/// Everything the editor needs to draw a network.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NetworkView {
    pub guid: String,
    pub title: String,
    pub share_mode: bool,
    pub author_id: i32,
    #[schema(value_type = Vec<Object>)]
    pub nodes: Value,
    #[schema(value_type = Vec<Object>)]
    pub edges: Value,
    #[schema(value_type = Option<Object>)]
    pub packets: Value,
    #[schema(value_type = Vec<Object>)]
    pub jobs: Value,
    /// The running simulation, if any
    #[schema(value_type = Option<Object>)]
    pub simulating: Option<simulates::Model>,
}

/// Outcome of opening a network through the owner's editor route.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkAccess {
    Owner(Box<NetworkView>),
    /// Not the owner, but the network is shared read-only
    Shared { guid: String },
}

/// Ownership-checked access to network documents.
///
/// Mutations are a whole-document read-modify-write inside one transaction;
/// concurrent writers overwrite each other (last write wins).
#[derive(Clone)]
pub struct NetworkService {
    db: DatabaseConnection,
}

impl NetworkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, user: &users::Model) -> NetworkResult<networks::Model> {
        let now = Utc::now();
        let network = networks::ActiveModel {
            guid: Set(Uuid::new_v4().to_string()),
            author_id: Set(user.id),
            title: Set(networks::DEFAULT_TITLE.to_string()),
            share_mode: Set(false),
            network: Set(NetworkDocument::empty().to_json_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let network = network.insert(&self.db).await?;
        info!("User {} created network {}", user.id, network.guid);
        Ok(network)
    }

    /// Networks of `user`, most recently edited first.
    pub async fn list_owned(&self, user: &users::Model) -> NetworkResult<Vec<networks::Model>> {
        let networks = networks::Entity::find()
            .filter(networks::Column::AuthorId.eq(user.id))
            .order_by_desc(networks::Column::UpdatedAt)
            .all(&self.db)
            .await?;
        Ok(networks)
    }

    /// The network `guid` if `user` owns it.
    pub async fn owned(&self, user: &users::Model, guid: &str) -> NetworkResult<networks::Model> {
        find_owned(&self.db, user.id, guid).await
    }

    /// Set a new title. A blank title leaves the row untouched and returns
    /// `false`.
    pub async fn rename(
        &self,
        user: &users::Model,
        guid: &str,
        title: &str,
    ) -> NetworkResult<bool> {
        let network = find_owned(&self.db, user.id, guid).await?;

        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let mut active: networks::ActiveModel = network.into();
        active.title = Set(title.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn delete(&self, user: &users::Model, guid: &str) -> NetworkResult<()> {
        let network = find_owned(&self.db, user.id, guid).await?;
        networks::Entity::delete_by_id(network.id).exec(&self.db).await?;
        info!("User {} deleted network {}", user.id, guid);
        Ok(())
    }

    /// Open a network in the editor.
    pub async fn open(&self, user: &users::Model, guid: &str) -> NetworkResult<NetworkAccess> {
        let network = find_by_guid(&self.db, guid).await?;

        if network.author_id != user.id {
            if network.share_mode {
                return Ok(NetworkAccess::Shared { guid: network.guid });
            }
            warn!("User {} denied access to network {}", user.id, guid);
            return Err(NetworkError::AccessDenied);
        }

        let view = self.render(network).await?;
        Ok(NetworkAccess::Owner(Box::new(view)))
    }

    /// Open a network through its shared link.
    pub async fn open_shared(&self, guid: &str) -> NetworkResult<NetworkView> {
        let network = find_by_guid(&self.db, guid).await?;
        if !network.share_mode {
            return Err(NetworkError::AccessDenied);
        }
        self.render(network).await
    }

    /// Legacy node replacement. Drops simulations.
    pub async fn replace_nodes(
        &self,
        user: &users::Model,
        guid: &str,
        nodes: Value,
    ) -> NetworkResult<()> {
        self.mutate(user, guid, true, |doc| doc.replace_nodes(nodes))
            .await
    }

    /// Legacy edge replacement. Simulations are kept.
    pub async fn replace_edges(
        &self,
        user: &users::Model,
        guid: &str,
        edges: Value,
    ) -> NetworkResult<()> {
        self.mutate(user, guid, false, |doc| doc.replace_edges(edges))
            .await
    }

    /// Replace nodes and edges together, prune jobs whose host is gone and
    /// drop simulations.
    pub async fn replace_topology(
        &self,
        user: &users::Model,
        guid: &str,
        nodes: Value,
        edges: Value,
    ) -> NetworkResult<()> {
        self.mutate(user, guid, true, |doc| {
            let pruned = doc.replace_topology(nodes, edges);
            if pruned > 0 {
                debug!("Pruned {} jobs without a host from {}", pruned, guid);
            }
        })
        .await
    }

    /// Node positions changed; a running simulation stays valid.
    pub async fn move_nodes(
        &self,
        user: &users::Model,
        guid: &str,
        nodes: Value,
    ) -> NetworkResult<()> {
        self.mutate(user, guid, false, |doc| doc.replace_nodes(nodes))
            .await
    }

    async fn mutate<F>(
        &self,
        user: &users::Model,
        guid: &str,
        invalidate_simulations: bool,
        apply: F,
    ) -> NetworkResult<()>
    where
        F: FnOnce(&mut NetworkDocument) + Send,
    {
        let txn = self.db.begin().await?;

        let network = find_owned(&txn, user.id, guid).await?;
        let network_id = network.id;
        let mut document = NetworkDocument::parse(&network.network)?;
        apply(&mut document);

        let mut active: networks::ActiveModel = network.into();
        active.network = Set(document.to_json_string());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        if invalidate_simulations {
            let removed = simulates::Entity::delete_many()
                .filter(simulates::Column::NetworkId.eq(network_id))
                .exec(&txn)
                .await?;
            if removed.rows_affected > 0 {
                debug!(
                    "Discarded {} simulations of network {}",
                    removed.rows_affected, guid
                );
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn render(&self, network: networks::Model) -> NetworkResult<NetworkView> {
        let document = NetworkDocument::parse(&network.network)?.view();
        let simulating = simulates::Entity::find()
            .filter(simulates::Column::NetworkId.eq(network.id))
            .one(&self.db)
            .await?;

        Ok(NetworkView {
            guid: network.guid,
            title: network.title,
            share_mode: network.share_mode,
            author_id: network.author_id,
            nodes: document.nodes,
            edges: document.edges,
            packets: document.packets,
            jobs: document.jobs,
            simulating,
        })
    }
}

async fn find_by_guid<C: ConnectionTrait>(conn: &C, guid: &str) -> NetworkResult<networks::Model> {
    if guid.is_empty() {
        return Err(NetworkError::MissingGuid);
    }
    networks::Entity::find()
        .filter(networks::Column::Guid.eq(guid))
        .one(conn)
        .await?
        .ok_or(NetworkError::NotFound)
}

/// A network owned by someone else is reported as missing.
async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    guid: &str,
) -> NetworkResult<networks::Model> {
    if guid.is_empty() {
        return Err(NetworkError::MissingGuid);
    }
    networks::Entity::find()
        .filter(networks::Column::Guid.eq(guid))
        .filter(networks::Column::AuthorId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(NetworkError::NotFound)
}
