#![forbid(unsafe_code)]

use crate::error::StoreError;
use crate::requests::{
    InvitationCreateRequest, IssueCreateRequest, IssuePatch, MemberAddRequest,
    ProjectCreateRequest, ProjectPatch, StateCreateRequest,
};
use dbl_core::ids::TeamId;
use dbl_core::model::{ProjectStatus, StateType};
use dbl_core::snapshot::{LabelRef, MemberRef, ProjectRef, StateRef, TeamSnapshot};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "doable.db";

#[derive(Clone, Debug)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub key: String,
    pub color: String,
    pub status: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct StateRow {
    pub id: String,
    pub name: String,
    pub state_type: String,
    pub position: i64,
}

#[derive(Clone, Debug)]
pub struct LabelRow {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct MemberRow {
    pub user_id: String,
    pub user_name: String,
    pub role: String,
}

#[derive(Clone, Debug)]
pub struct IssueRow {
    pub id: String,
    pub number: i64,
    pub display_key: String,
    pub title: String,
    pub description: Option<String>,
    pub state_id: String,
    pub priority: String,
    pub project_id: String,
    pub assignee_id: Option<String>,
    pub label_ids: Vec<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct InvitationRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at_ms: i64,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self { conn, storage_dir };
        store.migrate()?;
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
              team TEXT PRIMARY KEY,
              created_at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS counters (
              team TEXT NOT NULL,
              name TEXT NOT NULL,
              value INTEGER NOT NULL,
              PRIMARY KEY (team, name)
            );

            CREATE TABLE IF NOT EXISTS projects (
              team TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              key TEXT NOT NULL,
              color TEXT NOT NULL,
              status TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              PRIMARY KEY (team, id),
              UNIQUE (team, key)
            );

            CREATE TABLE IF NOT EXISTS workflow_states (
              team TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              type TEXT NOT NULL,
              position INTEGER NOT NULL,
              PRIMARY KEY (team, id)
            );

            CREATE TABLE IF NOT EXISTS labels (
              team TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              PRIMARY KEY (team, id)
            );

            CREATE TABLE IF NOT EXISTS members (
              team TEXT NOT NULL,
              user_id TEXT NOT NULL,
              user_name TEXT NOT NULL,
              role TEXT NOT NULL,
              PRIMARY KEY (team, user_id)
            );

            CREATE TABLE IF NOT EXISTS project_members (
              team TEXT NOT NULL,
              project_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              PRIMARY KEY (team, project_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS issues (
              team TEXT NOT NULL,
              id TEXT NOT NULL,
              number INTEGER NOT NULL,
              display_key TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT,
              state_id TEXT NOT NULL,
              priority TEXT NOT NULL,
              project_id TEXT NOT NULL,
              assignee_id TEXT,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              PRIMARY KEY (team, id)
            );

            CREATE TABLE IF NOT EXISTS issue_labels (
              team TEXT NOT NULL,
              issue_id TEXT NOT NULL,
              label_id TEXT NOT NULL,
              PRIMARY KEY (team, issue_id, label_id)
            );

            CREATE TABLE IF NOT EXISTS invitations (
              team TEXT NOT NULL,
              id TEXT NOT NULL,
              email TEXT NOT NULL,
              role TEXT NOT NULL,
              status TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY (team, id)
            );

            CREATE INDEX IF NOT EXISTS idx_issues_team_project ON issues(team, project_id);
            CREATE INDEX IF NOT EXISTS idx_invitations_team_email ON invitations(team, email);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
            params!["schema_version", "v1"],
        )?;
        Ok(())
    }

    pub fn team_snapshot(&self, team: &TeamId) -> Result<TeamSnapshot, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, key, status
            FROM projects
            WHERE team = ?1
            ORDER BY name COLLATE NOCASE ASC, id ASC
            "#,
        )?;
        let raw_projects = stmt
            .query_map(params![team.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut projects = Vec::with_capacity(raw_projects.len());
        for (id, name, key, status) in raw_projects {
            let status = ProjectStatus::parse(&status)
                .ok_or(StoreError::InvalidInput("stored project status is invalid"))?;
            projects.push(ProjectRef {
                id,
                name,
                key,
                status,
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, type
            FROM workflow_states
            WHERE team = ?1
            ORDER BY position ASC, id ASC
            "#,
        )?;
        let raw_states = stmt
            .query_map(params![team.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut states = Vec::with_capacity(raw_states.len());
        for (id, name, state_type) in raw_states {
            let state_type = StateType::parse(&state_type)
                .ok_or(StoreError::InvalidInput("stored workflow state type is invalid"))?;
            states.push(StateRef {
                id,
                name,
                state_type,
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name
            FROM labels
            WHERE team = ?1
            ORDER BY name COLLATE NOCASE ASC, id ASC
            "#,
        )?;
        let labels = stmt
            .query_map(params![team.as_str()], |row| {
                Ok(LabelRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, user_name
            FROM members
            WHERE team = ?1
            ORDER BY user_name COLLATE NOCASE ASC, user_id ASC
            "#,
        )?;
        let members = stmt
            .query_map(params![team.as_str()], |row| {
                Ok(MemberRef {
                    user_id: row.get(0)?,
                    user_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TeamSnapshot {
            projects,
            states,
            labels,
            members,
        })
    }

    pub fn create_project(
        &mut self,
        team: &TeamId,
        request: ProjectCreateRequest,
    ) -> Result<ProjectRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let taken = tx
            .query_row(
                "SELECT 1 FROM projects WHERE team = ?1 AND key = ?2",
                params![team.as_str(), request.key],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(StoreError::DuplicateProjectKey { key: request.key });
        }

        let seq = next_counter_tx(&tx, team.as_str(), "project_seq")?;
        let id = format!("prj_{seq:04}");
        tx.execute(
            r#"
            INSERT INTO projects(team,id,name,key,color,status,created_at_ms,updated_at_ms)
            VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
            "#,
            params![
                team.as_str(),
                id,
                request.name,
                request.key,
                request.color,
                request.status,
                now_ms,
                now_ms
            ],
        )?;
        tx.commit()?;

        Ok(ProjectRow {
            id,
            name: request.name,
            key: request.key,
            color: request.color,
            status: request.status,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn update_project(
        &mut self,
        team: &TeamId,
        id: &str,
        patch: ProjectPatch,
    ) -> Result<ProjectRow, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let row = tx
            .query_row(
                r#"
                SELECT name, key, color, status, created_at_ms
                FROM projects
                WHERE team = ?1 AND id = ?2
                "#,
                params![team.as_str(), id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, key, color, status, created_at_ms)) = row else {
            return Err(StoreError::UnknownId);
        };

        let new_key = patch.key.unwrap_or(key);
        let taken = tx
            .query_row(
                "SELECT 1 FROM projects WHERE team = ?1 AND key = ?2 AND id != ?3",
                params![team.as_str(), new_key, id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(StoreError::DuplicateProjectKey { key: new_key });
        }

        let updated = ProjectRow {
            id: id.to_string(),
            name: patch.name.unwrap_or(name),
            key: new_key,
            color: patch.color.unwrap_or(color),
            status: patch.status.unwrap_or(status),
            created_at_ms,
            updated_at_ms: now_ms,
        };

        tx.execute(
            r#"
            UPDATE projects
            SET name = ?3, key = ?4, color = ?5, status = ?6, updated_at_ms = ?7
            WHERE team = ?1 AND id = ?2
            "#,
            params![
                team.as_str(),
                id,
                updated.name,
                updated.key,
                updated.color,
                updated.status,
                now_ms
            ],
        )?;
        tx.commit()?;
        Ok(updated)
    }

    /// Deleting a project takes its issues and membership rows with it.
    pub fn delete_project(&mut self, team: &TeamId, id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM projects WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
        )?;
        if deleted == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            r#"
            DELETE FROM issue_labels
            WHERE team = ?1 AND issue_id IN (SELECT id FROM issues WHERE team = ?1 AND project_id = ?2)
            "#,
            params![team.as_str(), id],
        )?;
        tx.execute(
            "DELETE FROM issues WHERE team = ?1 AND project_id = ?2",
            params![team.as_str(), id],
        )?;
        tx.execute(
            "DELETE FROM project_members WHERE team = ?1 AND project_id = ?2",
            params![team.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_project(&self, team: &TeamId, id: &str) -> Result<Option<ProjectRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, key, color, status, created_at_ms, updated_at_ms
                FROM projects
                WHERE team = ?1 AND id = ?2
                "#,
                params![team.as_str(), id],
                project_row_from,
            )
            .optional()?)
    }

    pub fn find_projects_by_name(
        &self,
        team: &TeamId,
        name: &str,
    ) -> Result<Vec<ProjectRow>, StoreError> {
        let needle = name.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, key, color, status, created_at_ms, updated_at_ms
            FROM projects
            WHERE team = ?1 AND LOWER(name) = LOWER(?2)
            ORDER BY id ASC
            "#,
        )?;
        let exact = stmt
            .query_map(params![team.as_str(), needle], project_row_from)?
            .collect::<Result<Vec<_>, _>>()?;
        if !exact.is_empty() {
            return Ok(exact);
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, key, color, status, created_at_ms, updated_at_ms
            FROM projects
            WHERE team = ?1 AND LOWER(name) LIKE '%' || LOWER(?2) || '%' ESCAPE '\'
            ORDER BY id ASC
            "#,
        )?;
        Ok(stmt
            .query_map(params![team.as_str(), escape_like(needle)], project_row_from)?
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn create_workflow_state(
        &mut self,
        team: &TeamId,
        request: StateCreateRequest,
    ) -> Result<StateRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let seq = next_counter_tx(&tx, team.as_str(), "state_seq")?;
        let id = format!("wfs_{seq:04}");
        tx.execute(
            r#"
            INSERT INTO workflow_states(team,id,name,type,position)
            VALUES (?1,?2,?3,?4,?5)
            "#,
            params![
                team.as_str(),
                id,
                request.name,
                request.state_type,
                request.position
            ],
        )?;
        tx.commit()?;

        Ok(StateRow {
            id,
            name: request.name,
            state_type: request.state_type,
            position: request.position,
        })
    }

    pub fn create_label(&mut self, team: &TeamId, name: &str) -> Result<LabelRow, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("label name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let seq = next_counter_tx(&tx, team.as_str(), "label_seq")?;
        let id = format!("lbl_{seq:04}");
        tx.execute(
            "INSERT INTO labels(team,id,name) VALUES (?1,?2,?3)",
            params![team.as_str(), id, name],
        )?;
        tx.commit()?;

        Ok(LabelRow {
            id,
            name: name.to_string(),
        })
    }

    pub fn add_member(
        &mut self,
        team: &TeamId,
        request: MemberAddRequest,
    ) -> Result<MemberRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM members WHERE team = ?1 AND user_id = ?2",
                params![team.as_str(), request.user_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::InvalidInput("member already exists"));
        }

        tx.execute(
            "INSERT INTO members(team,user_id,user_name,role) VALUES (?1,?2,?3,?4)",
            params![
                team.as_str(),
                request.user_id,
                request.user_name,
                request.role
            ],
        )?;
        tx.commit()?;

        Ok(MemberRow {
            user_id: request.user_id,
            user_name: request.user_name,
            role: request.role,
        })
    }

    pub fn get_member(&self, team: &TeamId, user_id: &str) -> Result<Option<MemberRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT user_id, user_name, role FROM members WHERE team = ?1 AND user_id = ?2",
                params![team.as_str(), user_id],
                |row| {
                    Ok(MemberRow {
                        user_id: row.get(0)?,
                        user_name: row.get(1)?,
                        role: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    /// Removing a member also clears their project memberships and
    /// unassigns their issues.
    pub fn remove_member(&mut self, team: &TeamId, user_id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM members WHERE team = ?1 AND user_id = ?2",
            params![team.as_str(), user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            "DELETE FROM project_members WHERE team = ?1 AND user_id = ?2",
            params![team.as_str(), user_id],
        )?;
        tx.execute(
            "UPDATE issues SET assignee_id = NULL, updated_at_ms = ?3 WHERE team = ?1 AND assignee_id = ?2",
            params![team.as_str(), user_id, now_ms],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn project_member_add(
        &mut self,
        team: &TeamId,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        require_project_tx(&tx, team, project_id)?;
        require_member_tx(&tx, team, user_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO project_members(team,project_id,user_id) VALUES (?1,?2,?3)",
            params![team.as_str(), project_id, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn project_member_remove(
        &mut self,
        team: &TeamId,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        require_project_tx(&tx, team, project_id)?;
        let deleted = tx.execute(
            "DELETE FROM project_members WHERE team = ?1 AND project_id = ?2 AND user_id = ?3",
            params![team.as_str(), project_id, user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.commit()?;
        Ok(())
    }

    pub fn create_issue(
        &mut self,
        team: &TeamId,
        request: IssueCreateRequest,
    ) -> Result<IssueRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let project_key = tx
            .query_row(
                "SELECT key FROM projects WHERE team = ?1 AND id = ?2",
                params![team.as_str(), request.project_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        let Some(project_key) = project_key else {
            return Err(StoreError::UnknownId);
        };
        require_state_tx(&tx, team, &request.state_id)?;
        if let Some(assignee_id) = request.assignee_id.as_deref() {
            require_member_tx(&tx, team, assignee_id)?;
        }
        for label_id in &request.label_ids {
            require_label_tx(&tx, team, label_id)?;
        }

        let seq = next_counter_tx(&tx, team.as_str(), "issue_seq")?;
        let id = format!("iss_{seq:06}");
        // Display numbers are per project so confirmations read like the
        // board does: WEB-1, WEB-2, MOB-1.
        let number = next_counter_tx(
            &tx,
            team.as_str(),
            &format!("issue_num:{}", request.project_id),
        )?;
        let display_key = format!("{}-{}", project_key.to_uppercase(), number);

        tx.execute(
            r#"
            INSERT INTO issues(team,id,number,display_key,title,description,state_id,priority,project_id,assignee_id,created_at_ms,updated_at_ms)
            VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)
            "#,
            params![
                team.as_str(),
                id,
                number,
                display_key,
                request.title,
                request.description,
                request.state_id,
                request.priority,
                request.project_id,
                request.assignee_id,
                now_ms,
                now_ms
            ],
        )?;
        for label_id in &request.label_ids {
            tx.execute(
                "INSERT OR IGNORE INTO issue_labels(team,issue_id,label_id) VALUES (?1,?2,?3)",
                params![team.as_str(), id, label_id],
            )?;
        }
        tx.commit()?;

        Ok(IssueRow {
            id,
            number,
            display_key,
            title: request.title,
            description: request.description,
            state_id: request.state_id,
            priority: request.priority,
            project_id: request.project_id,
            assignee_id: request.assignee_id,
            label_ids: request.label_ids,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn update_issue(
        &mut self,
        team: &TeamId,
        id: &str,
        patch: IssuePatch,
    ) -> Result<IssueRow, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let row = tx
            .query_row(
                r#"
                SELECT id, number, display_key, title, description, state_id, priority, project_id, assignee_id, created_at_ms, updated_at_ms
                FROM issues
                WHERE team = ?1 AND id = ?2
                "#,
                params![team.as_str(), id],
                issue_row_from,
            )
            .optional()?;
        let Some(current) = row else {
            return Err(StoreError::UnknownId);
        };

        if let Some(state_id) = patch.state_id.as_deref() {
            require_state_tx(&tx, team, state_id)?;
        }
        if let Some(project_id) = patch.project_id.as_deref() {
            require_project_tx(&tx, team, project_id)?;
        }
        if let Some(Some(assignee_id)) = patch.assignee_id.as_ref() {
            require_member_tx(&tx, team, assignee_id)?;
        }
        if let Some(label_ids) = patch.label_ids.as_ref() {
            for label_id in label_ids {
                require_label_tx(&tx, team, label_id)?;
            }
        }

        let updated = IssueRow {
            id: current.id,
            number: current.number,
            // The display key stays with the issue even when it moves to
            // another project; renumbering existing references would break
            // links in past conversations.
            display_key: current.display_key,
            title: patch.title.unwrap_or(current.title),
            description: patch.description.unwrap_or(current.description),
            state_id: patch.state_id.unwrap_or(current.state_id),
            priority: patch.priority.unwrap_or(current.priority),
            project_id: patch.project_id.unwrap_or(current.project_id),
            assignee_id: patch.assignee_id.unwrap_or(current.assignee_id),
            label_ids: Vec::new(),
            created_at_ms: current.created_at_ms,
            updated_at_ms: now_ms,
        };

        tx.execute(
            r#"
            UPDATE issues
            SET title = ?3, description = ?4, state_id = ?5, priority = ?6, project_id = ?7, assignee_id = ?8, updated_at_ms = ?9
            WHERE team = ?1 AND id = ?2
            "#,
            params![
                team.as_str(),
                id,
                updated.title,
                updated.description,
                updated.state_id,
                updated.priority,
                updated.project_id,
                updated.assignee_id,
                now_ms
            ],
        )?;

        if let Some(label_ids) = patch.label_ids.as_ref() {
            tx.execute(
                "DELETE FROM issue_labels WHERE team = ?1 AND issue_id = ?2",
                params![team.as_str(), id],
            )?;
            for label_id in label_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO issue_labels(team,issue_id,label_id) VALUES (?1,?2,?3)",
                    params![team.as_str(), id, label_id],
                )?;
            }
        }

        let label_ids = issue_label_ids_tx(&tx, team, id)?;
        tx.commit()?;
        Ok(IssueRow {
            label_ids,
            ..updated
        })
    }

    pub fn delete_issue(&mut self, team: &TeamId, id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM issues WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
        )?;
        if deleted == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            "DELETE FROM issue_labels WHERE team = ?1 AND issue_id = ?2",
            params![team.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_issue(&self, team: &TeamId, id: &str) -> Result<Option<IssueRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, number, display_key, title, description, state_id, priority, project_id, assignee_id, created_at_ms, updated_at_ms
                FROM issues
                WHERE team = ?1 AND id = ?2
                "#,
                params![team.as_str(), id],
                issue_row_from,
            )
            .optional()?;
        let Some(mut row) = row else {
            return Ok(None);
        };
        row.label_ids = self.issue_label_ids(team, &row.id)?;
        Ok(Some(row))
    }

    pub fn find_issues_by_title(
        &self,
        team: &TeamId,
        title: &str,
    ) -> Result<Vec<IssueRow>, StoreError> {
        let needle = title.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, number, display_key, title, description, state_id, priority, project_id, assignee_id, created_at_ms, updated_at_ms
            FROM issues
            WHERE team = ?1 AND LOWER(title) = LOWER(?2)
            ORDER BY id ASC
            "#,
        )?;
        let mut rows = stmt
            .query_map(params![team.as_str(), needle], issue_row_from)?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, number, display_key, title, description, state_id, priority, project_id, assignee_id, created_at_ms, updated_at_ms
                FROM issues
                WHERE team = ?1 AND LOWER(title) LIKE '%' || LOWER(?2) || '%' ESCAPE '\'
                ORDER BY id ASC
                "#,
            )?;
            rows = stmt
                .query_map(params![team.as_str(), escape_like(needle)], issue_row_from)?
                .collect::<Result<Vec<_>, _>>()?;
        }

        for row in rows.iter_mut() {
            row.label_ids = self.issue_label_ids(team, &row.id)?;
        }
        Ok(rows)
    }

    pub fn create_invitation(
        &mut self,
        team: &TeamId,
        request: InvitationCreateRequest,
    ) -> Result<InvitationRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_team_tx(&tx, team, now_ms)?;

        let pending = tx
            .query_row(
                "SELECT 1 FROM invitations WHERE team = ?1 AND LOWER(email) = LOWER(?2) AND status = 'pending'",
                params![team.as_str(), request.email],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if pending {
            return Err(StoreError::InvalidInput(
                "an invitation is already pending for this email",
            ));
        }

        let seq = next_counter_tx(&tx, team.as_str(), "invitation_seq")?;
        let id = format!("inv_{seq:04}");
        tx.execute(
            r#"
            INSERT INTO invitations(team,id,email,role,status,created_at_ms)
            VALUES (?1,?2,?3,?4,'pending',?5)
            "#,
            params![team.as_str(), id, request.email, request.role, now_ms],
        )?;
        tx.commit()?;

        Ok(InvitationRow {
            id,
            email: request.email,
            role: request.role,
            status: "pending".to_string(),
            created_at_ms: now_ms,
        })
    }

    pub fn revoke_invitation(&mut self, team: &TeamId, id: &str) -> Result<InvitationRow, StoreError> {
        let tx = self.conn.transaction()?;
        let row = tx
            .query_row(
                r#"
                SELECT id, email, role, status, created_at_ms
                FROM invitations
                WHERE team = ?1 AND id = ?2
                "#,
                params![team.as_str(), id],
                invitation_row_from,
            )
            .optional()?;
        let Some(mut row) = row else {
            return Err(StoreError::UnknownId);
        };
        if row.status != "pending" {
            return Err(StoreError::InvalidInput("invitation is not pending"));
        }
        tx.execute(
            "UPDATE invitations SET status = 'revoked' WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
        )?;
        tx.commit()?;
        row.status = "revoked".to_string();
        Ok(row)
    }

    pub fn find_pending_invitations_by_email(
        &self,
        team: &TeamId,
        email: &str,
    ) -> Result<Vec<InvitationRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, email, role, status, created_at_ms
            FROM invitations
            WHERE team = ?1 AND LOWER(email) = LOWER(?2) AND status = 'pending'
            ORDER BY id ASC
            "#,
        )?;
        Ok(stmt
            .query_map(params![team.as_str(), email.trim()], invitation_row_from)?
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn issue_label_ids(&self, team: &TeamId, issue_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT label_id FROM issue_labels WHERE team = ?1 AND issue_id = ?2 ORDER BY label_id ASC",
        )?;
        Ok(stmt
            .query_map(params![team.as_str(), issue_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn issue_label_ids_tx(
    tx: &Transaction<'_>,
    team: &TeamId,
    issue_id: &str,
) -> Result<Vec<String>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT label_id FROM issue_labels WHERE team = ?1 AND issue_id = ?2 ORDER BY label_id ASC",
    )?;
    let label_ids = stmt
        .query_map(params![team.as_str(), issue_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(label_ids)
}

fn project_row_from(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        name: row.get(1)?,
        key: row.get(2)?,
        color: row.get(3)?,
        status: row.get(4)?,
        created_at_ms: row.get(5)?,
        updated_at_ms: row.get(6)?,
    })
}

fn issue_row_from(row: &rusqlite::Row<'_>) -> rusqlite::Result<IssueRow> {
    Ok(IssueRow {
        id: row.get(0)?,
        number: row.get(1)?,
        display_key: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        state_id: row.get(5)?,
        priority: row.get(6)?,
        project_id: row.get(7)?,
        assignee_id: row.get(8)?,
        label_ids: Vec::new(),
        created_at_ms: row.get(9)?,
        updated_at_ms: row.get(10)?,
    })
}

fn invitation_row_from(row: &rusqlite::Row<'_>) -> rusqlite::Result<InvitationRow> {
    Ok(InvitationRow {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        status: row.get(3)?,
        created_at_ms: row.get(4)?,
    })
}

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis().min(i64::MAX as u128) as i64
}

fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn ensure_team_tx(tx: &Transaction<'_>, team: &TeamId, now_ms: i64) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO teams(team, created_at_ms) VALUES (?1, ?2)",
        params![team.as_str(), now_ms],
    )?;
    Ok(())
}

fn next_counter_tx(tx: &Transaction<'_>, team: &str, name: &str) -> Result<i64, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE team = ?1 AND name = ?2",
            params![team, name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    tx.execute(
        r#"
        INSERT INTO counters(team, name, value) VALUES (?1, ?2, ?3)
        ON CONFLICT(team, name) DO UPDATE SET value=excluded.value
        "#,
        params![team, name, next],
    )?;
    Ok(next)
}

fn require_project_tx(tx: &Transaction<'_>, team: &TeamId, id: &str) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM projects WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if exists { Ok(()) } else { Err(StoreError::UnknownId) }
}

fn require_state_tx(tx: &Transaction<'_>, team: &TeamId, id: &str) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM workflow_states WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if exists { Ok(()) } else { Err(StoreError::UnknownId) }
}

fn require_member_tx(tx: &Transaction<'_>, team: &TeamId, user_id: &str) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM members WHERE team = ?1 AND user_id = ?2",
            params![team.as_str(), user_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if exists { Ok(()) } else { Err(StoreError::UnknownId) }
}

fn require_label_tx(tx: &Transaction<'_>, team: &TeamId, id: &str) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM labels WHERE team = ?1 AND id = ?2",
            params![team.as_str(), id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if exists { Ok(()) } else { Err(StoreError::UnknownId) }
}
