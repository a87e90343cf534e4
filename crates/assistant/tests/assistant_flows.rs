#![forbid(unsafe_code)]

use dbl_core::ids::TeamId;
use dbl_storage::{MemberAddRequest, ProjectCreateRequest, SqliteStore, StateCreateRequest};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    storage_dir: PathBuf,
    next_id: i64,
}

impl Server {
    fn start_in(storage_dir: PathBuf) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_dbl_assistant"))
            .arg("--storage-dir")
            .arg(&storage_dir)
            .arg("--team")
            .arg("acme")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("spawn dbl_assistant");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = BufReader::new(child.stdout.take().expect("stdout"));

        let mut server = Self {
            child,
            stdin,
            stdout,
            storage_dir,
            next_id: 1,
        };
        let resp = server.request("initialize", json!({}));
        assert_eq!(resp["result"]["serverInfo"]["name"], "doable-assistant");
        server.send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }));
        server
    }

    fn send(&mut self, req: Value) {
        writeln!(self.stdin, "{req}").expect("write request");
        self.stdin.flush().expect("flush request");
    }

    fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }));
        let mut line = String::new();
        self.stdout.read_line(&mut line).expect("read response");
        serde_json::from_str(&line).expect("parse response json")
    }

    fn call_tool(&mut self, name: &str, args: Value) -> Value {
        let resp = self.request("tools/call", json!({ "name": name, "arguments": args }));
        let text = resp["result"]["content"][0]["text"]
            .as_str()
            .expect("tool text content");
        serde_json::from_str(text).expect("parse tool envelope")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.storage_dir);
    }
}

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("dbl_assistant_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn seed_team(dir: &Path) {
    let mut store = SqliteStore::open(dir).expect("open store");
    let team = TeamId::try_new("acme").expect("team id");

    store
        .create_project(
            &team,
            ProjectCreateRequest {
                name: "Web".to_string(),
                key: "web".to_string(),
                color: "#6366F1".to_string(),
                status: "active".to_string(),
            },
        )
        .expect("seed project");
    store
        .create_workflow_state(
            &team,
            StateCreateRequest {
                name: "Todo".to_string(),
                state_type: "unstarted".to_string(),
                position: 0,
            },
        )
        .expect("seed state");
    store
        .create_workflow_state(
            &team,
            StateCreateRequest {
                name: "Done".to_string(),
                state_type: "completed".to_string(),
                position: 1,
            },
        )
        .expect("seed state");
    for (user_id, user_name) in [("usr_alice", "Alice"), ("usr_bob", "Bob")] {
        store
            .add_member(
                &team,
                MemberAddRequest {
                    user_id: user_id.to_string(),
                    user_name: user_name.to_string(),
                    role: "developer".to_string(),
                },
            )
            .expect("seed member");
    }
}

#[test]
fn unassigned_spellings_never_fail_assignee_resolution() {
    let dir = temp_dir("unassigned_spellings_never_fail_assignee_resolution");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    for (i, token) in ["unassigned", "null", "undefined"].iter().enumerate() {
        let envelope = server.call_tool(
            "issues_create",
            json!({
                "title": format!("Issue {i}"),
                "workflow_state": "Todo",
                "priority": "low",
                "project": "Web",
                "assignee": token
            }),
        );
        assert_eq!(envelope["success"], true, "token {token:?}: {envelope}");
        assert_eq!(envelope["result"]["issue"]["assignee_id"], Value::Null);
    }

    let envelope = server.call_tool(
        "issues_create",
        json!({
            "title": "Assigned",
            "workflow_state": "Todo",
            "priority": "low",
            "project": "Web",
            "assignee": "alice"
        }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    assert_eq!(envelope["result"]["issue"]["assignee_id"], "usr_alice");
}

#[test]
fn update_locates_by_title_and_clears_assignee() {
    let dir = temp_dir("update_locates_by_title_and_clears_assignee");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let created = server.call_tool(
        "issues_create",
        json!({
            "title": "Fix login",
            "workflow_state": "Todo",
            "priority": "high",
            "project": "Web",
            "assignee": "Bob"
        }),
    );
    assert_eq!(created["success"], true, "envelope: {created}");

    let updated = server.call_tool(
        "issues_update",
        json!({
            "title": "fix login",
            "workflow_state": "Done",
            "assignee": "unassigned"
        }),
    );
    assert_eq!(updated["success"], true, "envelope: {updated}");
    let issue = &updated["result"]["issue"];
    assert_eq!(issue["assignee_id"], Value::Null);
    let summary = updated["summary"].as_str().expect("summary");
    assert!(summary.contains("Updated issue WEB-1"));
}

#[test]
fn title_searches_with_multiple_hits_demand_an_id() {
    let dir = temp_dir("title_searches_with_multiple_hits_demand_an_id");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    for title in ["Fix bug A", "Fix bug B"] {
        let envelope = server.call_tool(
            "issues_create",
            json!({
                "title": title,
                "workflow_state": "Todo",
                "priority": "medium",
                "project": "Web"
            }),
        );
        assert_eq!(envelope["success"], true, "envelope: {envelope}");
    }

    let envelope = server.call_tool("issues_delete", json!({ "title": "fix bug" }));
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "MULTI_MATCH");
    let message = envelope["error"]["message"].as_str().expect("message");
    assert!(message.contains("WEB-1"));
    assert!(message.contains("WEB-2"));

    let envelope = server.call_tool("issues_delete", json!({ "title": "Fix bug A" }));
    assert_eq!(envelope["success"], true, "exact match deletes: {envelope}");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Deleted issue WEB-1"));
}

#[test]
fn ambiguous_project_references_list_candidates() {
    let dir = temp_dir("ambiguous_project_references_list_candidates");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let envelope = server.call_tool(
        "projects_create",
        json!({ "name": "Webhooks", "key": "hooks" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");

    let envelope = server.call_tool(
        "issues_create",
        json!({
            "title": "Fix bug",
            "workflow_state": "Todo",
            "priority": "high",
            "project": "we"
        }),
    );
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "AMBIGUOUS");
    let message = envelope["error"]["message"].as_str().expect("message");
    assert!(message.contains("Web"));
    assert!(message.contains("Webhooks"));
}

#[test]
fn bulk_update_applies_one_change_set_to_many_issues() {
    let dir = temp_dir("bulk_update_applies_one_change_set_to_many_issues");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let mut ids = Vec::new();
    for title in ["One", "Two"] {
        let envelope = server.call_tool(
            "issues_create",
            json!({
                "title": title,
                "workflow_state": "Todo",
                "priority": "low",
                "project": "Web"
            }),
        );
        assert_eq!(envelope["success"], true, "envelope: {envelope}");
        ids.push(
            envelope["result"]["issue"]["id"]
                .as_str()
                .expect("issue id")
                .to_string(),
        );
    }

    let envelope = server.call_tool(
        "issues_bulk_update",
        json!({ "issue_ids": ids, "workflow_state": "done", "priority": "urgent" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    assert_eq!(envelope["summary"], "✅ Updated 2 issues");
    for issue in envelope["result"]["issues"].as_array().expect("issues") {
        assert_eq!(issue["priority"], "urgent");
    }

    let envelope = server.call_tool(
        "issues_bulk_update",
        json!({ "issue_ids": [], "priority": "low" }),
    );
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "INVALID_INPUT");
}

#[test]
fn project_lifecycle_with_defaults_and_duplicate_keys() {
    let dir = temp_dir("project_lifecycle_with_defaults_and_duplicate_keys");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let envelope = server.call_tool(
        "projects_create",
        json!({ "name": "Mobile", "key": "MOB" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    let project = &envelope["result"]["project"];
    assert_eq!(project["key"], "mob", "keys normalize to lowercase");
    assert_eq!(project["status"], "active", "status defaults");
    assert_eq!(project["color"], "#6366F1", "color defaults");

    let envelope = server.call_tool(
        "projects_create",
        json!({ "name": "Mobile 2", "key": "mob" }),
    );
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "STORE_ERROR");
    let message = envelope["error"]["message"].as_str().expect("message");
    assert!(message.contains("'mob' is already in use"));

    let envelope = server.call_tool(
        "projects_update",
        json!({ "name": "Mobile", "status": "paused" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    assert_eq!(envelope["result"]["project"]["status"], "paused");

    let envelope = server.call_tool("projects_delete", json!({ "name": "Mobile" }));
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Deleted project Mobile"));
}

#[test]
fn project_membership_add_and_remove() {
    let dir = temp_dir("project_membership_add_and_remove");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let envelope = server.call_tool(
        "projects_member_add",
        json!({ "project": "Web", "member": "alice" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Added Alice to project Web"));

    let envelope = server.call_tool(
        "projects_member_remove",
        json!({ "project": "Web", "member": "alice" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");

    let envelope = server.call_tool(
        "projects_member_remove",
        json!({ "project": "Web", "member": "alice" }),
    );
    assert_eq!(envelope["success"], false, "second removal has nothing left");
    assert_eq!(envelope["error"]["code"], "STORE_ERROR");
}

#[test]
fn invitations_default_the_role_and_revoke_by_email() {
    let dir = temp_dir("invitations_default_the_role_and_revoke_by_email");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let envelope = server.call_tool(
        "members_invite",
        json!({ "email": "carol@example.com" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    assert_eq!(envelope["result"]["invitation"]["role"], "developer");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Invited carol@example.com as developer"));

    let envelope = server.call_tool(
        "members_invite",
        json!({ "email": "not-an-email" }),
    );
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "VALIDATION");

    let envelope = server.call_tool(
        "invitations_revoke",
        json!({ "email": "carol@example.com" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Revoked invitation for carol@example.com"));

    let envelope = server.call_tool(
        "invitations_revoke",
        json!({ "email": "carol@example.com" }),
    );
    assert_eq!(envelope["success"], false, "nothing pending anymore");
    assert_eq!(envelope["error"]["code"], "NOT_FOUND");
}

#[test]
fn removing_a_member_unassigns_their_issues() {
    let dir = temp_dir("removing_a_member_unassigns_their_issues");
    seed_team(&dir);
    let mut server = Server::start_in(dir);

    let created = server.call_tool(
        "issues_create",
        json!({
            "title": "Owned by Bob",
            "workflow_state": "Todo",
            "priority": "medium",
            "project": "Web",
            "assignee": "Bob"
        }),
    );
    assert_eq!(created["success"], true, "envelope: {created}");
    let issue_id = created["result"]["issue"]["id"]
        .as_str()
        .expect("issue id")
        .to_string();

    let envelope = server.call_tool("members_remove", json!({ "member": "Bob" }));
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    let summary = envelope["summary"].as_str().expect("summary");
    assert!(summary.contains("Removed member Bob"));

    let envelope = server.call_tool(
        "issues_update",
        json!({ "issue_id": issue_id, "priority": "low" }),
    );
    assert_eq!(envelope["success"], true, "envelope: {envelope}");
    assert_eq!(envelope["result"]["issue"]["assignee_id"], Value::Null);
}
