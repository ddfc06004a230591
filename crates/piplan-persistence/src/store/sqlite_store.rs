use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot};
use async_trait::async_trait;
use piplan_core::{PlanningError, PlanningResult};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../schema.sql");

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotData {
    #[serde(default)]
    boards: Vec<serde_json::Value>,
    #[serde(default)]
    sprints: Vec<serde_json::Value>,
    #[serde(default)]
    features: Vec<serde_json::Value>,
    #[serde(default)]
    stories: Vec<serde_json::Value>,
    #[serde(default)]
    members: Vec<serde_json::Value>,
    #[serde(default)]
    allocations: Vec<serde_json::Value>,
}

/// Relational backend. Saves replace the stored snapshot wholesale inside
/// a single transaction, which gives the same all-or-nothing contract as
/// the JSON store's atomic rename.
pub struct SqliteStore {
    path: PathBuf,
    instance_id: Uuid,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
            pool: tokio::sync::OnceCell::new(),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    async fn get_pool(&self) -> PlanningResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options = SqliteConnectOptions::from_str(&format!(
                    "sqlite://{}?mode=rwc",
                    self.path.display()
                ))
                .map_err(|e| PlanningError::Database(e.to_string()))?
                .create_if_missing(true)
                .foreign_keys(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(|e| PlanningError::Database(e.to_string()))?;

                // Initialize schema
                sqlx::raw_sql(SCHEMA)
                    .execute(&pool)
                    .await
                    .map_err(|e| PlanningError::Database(e.to_string()))?;

                Ok(pool)
            })
            .await
    }
}

fn db_err(e: sqlx::Error) -> PlanningError {
    PlanningError::Database(e.to_string())
}

fn text(value: &serde_json::Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

fn opt_text(value: &serde_json::Value, key: &str) -> Option<String> {
    value[key].as_str().map(|s| s.to_string())
}

fn int(value: &serde_json::Value, key: &str) -> i64 {
    value[key].as_i64().unwrap_or_default()
}

fn flag(value: &serde_json::Value, key: &str) -> i64 {
    i64::from(value[key].as_bool().unwrap_or(false))
}

fn real(value: &serde_json::Value, key: &str) -> Option<f64> {
    value[key].as_f64()
}

async fn delete_missing(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    table: &str,
    rows: &[serde_json::Value],
) -> PlanningResult<()> {
    let kept: Vec<String> = rows
        .iter()
        .filter_map(|r| r["id"].as_str().map(|s| s.to_string()))
        .collect();

    let existing: Vec<String> = sqlx::query(&format!("SELECT id FROM {}", table))
        .fetch_all(&mut **tx)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|row| row.get::<String, _>("id"))
        .collect();

    for id in existing.iter().filter(|id| !kept.contains(id)) {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
    }

    Ok(())
}

#[async_trait]
impl PersistenceStore for SqliteStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> PlanningResult<PersistenceMetadata> {
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();

        let data: SnapshotData = serde_json::from_slice(&snapshot.data)
            .map_err(|e| PlanningError::Serialization(e.to_string()))?;

        let pool = self.get_pool().await?;
        let mut tx = pool.begin().await.map_err(db_err)?;

        // Children first so cascades cannot fire on rows being kept
        delete_missing(&mut tx, "team_member_sprints", &data.allocations).await?;
        delete_missing(&mut tx, "user_stories", &data.stories).await?;
        delete_missing(&mut tx, "team_members", &data.members).await?;
        delete_missing(&mut tx, "features", &data.features).await?;
        delete_missing(&mut tx, "sprints", &data.sprints).await?;
        delete_missing(&mut tx, "boards", &data.boards).await?;

        for board in &data.boards {
            sqlx::query(
                "INSERT INTO boards (id, name, organization, project, num_sprints,
                    sprint_duration_days, start_date, is_locked, password_hash, is_finalized,
                    finalized_at, dev_test_toggle, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    organization = excluded.organization,
                    project = excluded.project,
                    num_sprints = excluded.num_sprints,
                    sprint_duration_days = excluded.sprint_duration_days,
                    start_date = excluded.start_date,
                    is_locked = excluded.is_locked,
                    password_hash = excluded.password_hash,
                    is_finalized = excluded.is_finalized,
                    finalized_at = excluded.finalized_at,
                    dev_test_toggle = excluded.dev_test_toggle,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(board, "id"))
            .bind(text(board, "name"))
            .bind(opt_text(board, "organization"))
            .bind(opt_text(board, "project"))
            .bind(int(board, "num_sprints"))
            .bind(int(board, "sprint_duration_days"))
            .bind(text(board, "start_date"))
            .bind(flag(board, "is_locked"))
            .bind(opt_text(board, "password_hash"))
            .bind(flag(board, "is_finalized"))
            .bind(opt_text(board, "finalized_at"))
            .bind(flag(board, "dev_test_toggle"))
            .bind(text(board, "created_at"))
            .bind(text(board, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for sprint in &data.sprints {
            sqlx::query(
                "INSERT INTO sprints (id, board_id, number, name, start_date, end_date,
                    created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    board_id = excluded.board_id,
                    number = excluded.number,
                    name = excluded.name,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(sprint, "id"))
            .bind(text(sprint, "board_id"))
            .bind(int(sprint, "number"))
            .bind(text(sprint, "name"))
            .bind(opt_text(sprint, "start_date"))
            .bind(opt_text(sprint, "end_date"))
            .bind(text(sprint, "created_at"))
            .bind(text(sprint, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for feature in &data.features {
            sqlx::query(
                "INSERT INTO features (id, board_id, external_id, title, priority, value_area,
                    is_finalized, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    board_id = excluded.board_id,
                    external_id = excluded.external_id,
                    title = excluded.title,
                    priority = excluded.priority,
                    value_area = excluded.value_area,
                    is_finalized = excluded.is_finalized,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(feature, "id"))
            .bind(text(feature, "board_id"))
            .bind(opt_text(feature, "external_id"))
            .bind(text(feature, "title"))
            .bind(int(feature, "priority"))
            .bind(opt_text(feature, "value_area"))
            .bind(flag(feature, "is_finalized"))
            .bind(text(feature, "created_at"))
            .bind(text(feature, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for story in &data.stories {
            sqlx::query(
                "INSERT INTO user_stories (id, feature_id, external_id, title, story_points,
                    dev_story_points, test_story_points, original_sprint_id, current_sprint_id,
                    is_moved, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    feature_id = excluded.feature_id,
                    external_id = excluded.external_id,
                    title = excluded.title,
                    story_points = excluded.story_points,
                    dev_story_points = excluded.dev_story_points,
                    test_story_points = excluded.test_story_points,
                    original_sprint_id = excluded.original_sprint_id,
                    current_sprint_id = excluded.current_sprint_id,
                    is_moved = excluded.is_moved,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(story, "id"))
            .bind(text(story, "feature_id"))
            .bind(opt_text(story, "external_id"))
            .bind(text(story, "title"))
            .bind(real(story, "story_points"))
            .bind(real(story, "dev_story_points"))
            .bind(real(story, "test_story_points"))
            .bind(opt_text(story, "original_sprint_id"))
            .bind(opt_text(story, "current_sprint_id"))
            .bind(flag(story, "is_moved"))
            .bind(text(story, "created_at"))
            .bind(text(story, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for member in &data.members {
            sqlx::query(
                "INSERT INTO team_members (id, board_id, name, is_dev, is_test, created_at,
                    updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    board_id = excluded.board_id,
                    name = excluded.name,
                    is_dev = excluded.is_dev,
                    is_test = excluded.is_test,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(member, "id"))
            .bind(text(member, "board_id"))
            .bind(text(member, "name"))
            .bind(flag(member, "is_dev"))
            .bind(flag(member, "is_test"))
            .bind(text(member, "created_at"))
            .bind(text(member, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for allocation in &data.allocations {
            sqlx::query(
                "INSERT INTO team_member_sprints (id, member_id, sprint_id, capacity_dev,
                    capacity_test, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    member_id = excluded.member_id,
                    sprint_id = excluded.sprint_id,
                    capacity_dev = excluded.capacity_dev,
                    capacity_test = excluded.capacity_test,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
            )
            .bind(text(allocation, "id"))
            .bind(text(allocation, "member_id"))
            .bind(text(allocation, "sprint_id"))
            .bind(int(allocation, "capacity_dev"))
            .bind(int(allocation, "capacity_test"))
            .bind(text(allocation, "created_at"))
            .bind(text(allocation, "updated_at"))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        sqlx::query(
            "INSERT INTO store_metadata (id, format_version, instance_id, saved_at)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                format_version = excluded.format_version,
                instance_id = excluded.instance_id,
                saved_at = excluded.saved_at",
        )
        .bind(snapshot.metadata.format_version as i64)
        .bind(snapshot.metadata.instance_id.to_string())
        .bind(snapshot.metadata.saved_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(snapshot.metadata)
    }

    async fn load(&self) -> PlanningResult<(StoreSnapshot, PersistenceMetadata)> {
        let pool = self.get_pool().await?;

        let boards = sqlx::query("SELECT * FROM boards")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "name": row.get::<String, _>("name"),
                    "organization": row.get::<Option<String>, _>("organization"),
                    "project": row.get::<Option<String>, _>("project"),
                    "num_sprints": row.get::<i64, _>("num_sprints"),
                    "sprint_duration_days": row.get::<i64, _>("sprint_duration_days"),
                    "start_date": row.get::<String, _>("start_date"),
                    "is_locked": row.get::<i64, _>("is_locked") != 0,
                    "password_hash": row.get::<Option<String>, _>("password_hash"),
                    "is_finalized": row.get::<i64, _>("is_finalized") != 0,
                    "finalized_at": row.get::<Option<String>, _>("finalized_at"),
                    "dev_test_toggle": row.get::<i64, _>("dev_test_toggle") != 0,
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let sprints = sqlx::query("SELECT * FROM sprints")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "board_id": row.get::<String, _>("board_id"),
                    "number": row.get::<i64, _>("number"),
                    "name": row.get::<String, _>("name"),
                    "start_date": row.get::<Option<String>, _>("start_date"),
                    "end_date": row.get::<Option<String>, _>("end_date"),
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let features = sqlx::query("SELECT * FROM features")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "board_id": row.get::<String, _>("board_id"),
                    "external_id": row.get::<Option<String>, _>("external_id"),
                    "title": row.get::<String, _>("title"),
                    "priority": row.get::<i64, _>("priority"),
                    "value_area": row.get::<Option<String>, _>("value_area"),
                    "is_finalized": row.get::<i64, _>("is_finalized") != 0,
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let stories = sqlx::query("SELECT * FROM user_stories")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "feature_id": row.get::<String, _>("feature_id"),
                    "external_id": row.get::<Option<String>, _>("external_id"),
                    "title": row.get::<String, _>("title"),
                    "story_points": row.get::<Option<f64>, _>("story_points"),
                    "dev_story_points": row.get::<Option<f64>, _>("dev_story_points"),
                    "test_story_points": row.get::<Option<f64>, _>("test_story_points"),
                    "original_sprint_id": row.get::<Option<String>, _>("original_sprint_id"),
                    "current_sprint_id": row.get::<Option<String>, _>("current_sprint_id"),
                    "is_moved": row.get::<i64, _>("is_moved") != 0,
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let members = sqlx::query("SELECT * FROM team_members")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "board_id": row.get::<String, _>("board_id"),
                    "name": row.get::<String, _>("name"),
                    "is_dev": row.get::<i64, _>("is_dev") != 0,
                    "is_test": row.get::<i64, _>("is_test") != 0,
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let allocations = sqlx::query("SELECT * FROM team_member_sprints")
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.get::<String, _>("id"),
                    "member_id": row.get::<String, _>("member_id"),
                    "sprint_id": row.get::<String, _>("sprint_id"),
                    "capacity_dev": row.get::<i64, _>("capacity_dev"),
                    "capacity_test": row.get::<i64, _>("capacity_test"),
                    "created_at": row.get::<String, _>("created_at"),
                    "updated_at": row.get::<String, _>("updated_at"),
                })
            })
            .collect::<Vec<_>>();

        let metadata = match sqlx::query("SELECT * FROM store_metadata WHERE id = 1")
            .fetch_optional(pool)
            .await
            .map_err(db_err)?
        {
            Some(row) => {
                let instance_id = Uuid::from_str(&row.get::<String, _>("instance_id"))
                    .map_err(|e| PlanningError::Serialization(e.to_string()))?;
                let saved_at = chrono::DateTime::parse_from_rfc3339(
                    &row.get::<String, _>("saved_at"),
                )
                .map_err(|e| PlanningError::Serialization(e.to_string()))?
                .with_timezone(&chrono::Utc);
                PersistenceMetadata {
                    format_version: row.get::<i64, _>("format_version") as u32,
                    instance_id,
                    saved_at,
                }
            }
            None => PersistenceMetadata::new(self.instance_id),
        };

        let data = SnapshotData {
            boards,
            sprints,
            features,
            stories,
            members,
            allocations,
        };
        let bytes = serde_json::to_vec(&data)
            .map_err(|e| PlanningError::Serialization(e.to_string()))?;

        Ok((
            StoreSnapshot {
                data: bytes,
                metadata: metadata.clone(),
            },
            metadata,
        ))
    }

    async fn exists(&self) -> bool {
        self.path.exists()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use piplan_domain::{generate_sprints, Board, PlanState};
    use tempfile::tempdir;

    fn seeded_state() -> PlanState {
        let board = Board::new(
            "PI-12".to_string(),
            Some("contoso".to_string()),
            Some("platform".to_string()),
            2,
            14,
            Utc::now(),
            true,
        );
        let mut state = PlanState::default();
        state.sprints = generate_sprints(&board);
        state.boards.push(board);
        state
    }

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("plan.db"));
        let state = seeded_state();

        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&state).unwrap(),
            metadata: PersistenceMetadata::new(store.instance_id()),
        };
        store.save(snapshot).await.unwrap();

        let (loaded, _) = store.load().await.unwrap();
        let loaded_state: PlanState = serde_json::from_slice(&loaded.data).unwrap();
        assert_eq!(loaded_state.boards.len(), 1);
        assert_eq!(loaded_state.sprints.len(), 3);
        assert_eq!(loaded_state.boards[0].name, "PI-12");
        assert!(loaded_state.boards[0].dev_test_toggle);
    }

    #[tokio::test]
    async fn test_save_removes_deleted_rows() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("plan.db"));
        let mut state = seeded_state();

        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&state).unwrap(),
            metadata: PersistenceMetadata::new(store.instance_id()),
        };
        store.save(snapshot).await.unwrap();

        state.boards.clear();
        state.sprints.clear();
        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&state).unwrap(),
            metadata: PersistenceMetadata::new(store.instance_id()),
        };
        store.save(snapshot).await.unwrap();

        let (loaded, _) = store.load().await.unwrap();
        let loaded_state: PlanState = serde_json::from_slice(&loaded.data).unwrap();
        assert!(loaded_state.boards.is_empty());
        assert!(loaded_state.sprints.is_empty());
    }
}
