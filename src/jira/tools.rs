//! Declarative tool registry
//!
//! Every tool is one [`ToolSpec`] row: its parameters (which also generate the
//! advertised input schema), the REST call it makes and how the reply is
//! shaped. Tools that need more than one request name a [`Composite`] and are
//! handled in [`super::invoke`].

use crate::error::{BridgeError, Result};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

// ─── Parameter schema ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    String,
    Integer,
    StringList,
    /// List of objects, each checked against the nested parameters
    ObjectList(&'static [Param]),
}

#[derive(Debug, Clone, Copy)]
pub enum Literal {
    Str(&'static str),
    Int(i64),
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Literal::Str(s) => json!(s),
            Literal::Int(n) => json!(n),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Literal>,
}

const fn req(name: &'static str, kind: ParamKind, description: &'static str) -> Param {
    Param {
        name,
        kind,
        description,
        required: true,
        default: None,
    }
}

const fn opt(name: &'static str, kind: ParamKind, description: &'static str) -> Param {
    Param {
        name,
        kind,
        description,
        required: false,
        default: None,
    }
}

impl Param {
    const fn or(mut self, default: Literal) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = match self.kind {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Integer => json!({"type": "integer"}),
            ParamKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::ObjectList(fields) => {
                json!({"type": "array", "items": object_schema(fields)})
            }
        };
        schema["description"] = json!(self.description);
        if let Some(default) = self.default {
            schema["default"] = default.to_value();
        }
        schema
    }
}

fn object_schema(params: &[Param]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), p.schema()))
        .collect();
    let mut schema = json!({"type": "object", "properties": properties});
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

use ParamKind::{Integer as Int, String as Str, StringList as StrList};

// ─── Actions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn method(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

/// How a successful response becomes the tool result
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Jira's JSON as-is
    Json,
    /// `{key: response}`
    Wrap(&'static str),
    /// `{"success": message}`
    Success(&'static str),
    /// `{"success": message, key: response}`; placeholders may name response fields
    SuccessWith(&'static str, &'static str),
    /// `{key: response[pointer]}`, defaulting to an empty list
    Pluck {
        pointer: &'static str,
        key: &'static str,
    },
}

pub type BodyFn = fn(&Args) -> Value;

/// One REST call. `path` and `query` values are `{param}` templates; a query
/// pair whose template names an absent argument is left out.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub verb: Verb,
    pub path: &'static str,
    pub query: &'static [(&'static str, &'static str)],
    pub body: Option<BodyFn>,
    pub reply: Reply,
}

/// Multi-request tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    TransitionIssue,
    SearchFields,
    CustomFields,
    LinkToEpic,
    CloneIssue,
    DownloadAttachment,
    BatchCreateIssues,
    BatchCreateVersions,
    BatchGetChangelogs,
}

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Rest(Endpoint),
    Composite(Composite),
}

#[derive(Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
    pub action: Action,
}

impl ToolSpec {
    /// JSON schema advertised through tools/list
    pub fn input_schema(&self) -> Value {
        object_schema(self.params)
    }
}

const fn get(path: &'static str, reply: Reply) -> Action {
    rest(Verb::Get, path, None, reply)
}

const fn rest(verb: Verb, path: &'static str, body: Option<BodyFn>, reply: Reply) -> Action {
    Action::Rest(Endpoint {
        verb,
        path,
        query: &[],
        body,
        reply,
    })
}

const fn with_query(
    verb: Verb,
    path: &'static str,
    query: &'static [(&'static str, &'static str)],
    reply: Reply,
) -> Action {
    Action::Rest(Endpoint {
        verb,
        path,
        query,
        body: None,
        reply,
    })
}

const SEARCH_FIELDS: &str =
    "summary,status,assignee,reporter,created,updated,description,issuetype,priority";

// ─── Bound arguments ────────────────────────────────────────────────────────

/// Tool arguments checked against a parameter list, defaults filled in
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    /// Validate `arguments` (an object, or null for none) against `params`
    pub fn bind(params: &[Param], arguments: &Value) -> Result<Self> {
        let empty = Map::new();
        let given = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(BridgeError::InvalidParam(
                    "arguments must be an object".to_string(),
                ))
            }
        };
        bind_map(params, given, "")
    }

    /// Wrap one element of an already-bound object list
    pub fn from_item(item: &Value) -> Self {
        Args {
            values: item.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String argument, treating "" as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// String argument or ""
    pub fn text_or_empty(&self, name: &str) -> &str {
        self.values.get(name).and_then(Value::as_str).unwrap_or_default()
    }

    /// Argument value or null
    pub fn value(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn list(&self, name: &str) -> &[Value] {
        self.values
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Display form used in paths, queries and messages
    pub fn render(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn bind_map(params: &[Param], given: &Map<String, Value>, prefix: &str) -> Result<Args> {
    let mut values = Map::new();

    for param in params {
        let qualified = format!("{}{}", prefix, param.name);
        let value = match given.get(param.name).filter(|v| !v.is_null()) {
            Some(v) => coerce(param, v, &qualified)?,
            None => match param.default {
                Some(default) => default.to_value(),
                None if param.required => return Err(BridgeError::MissingParam(qualified)),
                None => continue,
            },
        };
        values.insert(param.name.to_string(), value);
    }

    Ok(Args { values })
}

fn coerce(param: &Param, value: &Value, qualified: &str) -> Result<Value> {
    let invalid = |expected: &str| {
        BridgeError::InvalidParam(format!("{} must be {}", qualified, expected))
    };

    match (param.kind, value) {
        (ParamKind::String, Value::String(_)) => Ok(value.clone()),
        (ParamKind::String, Value::Number(n)) => Ok(json!(n.to_string())),
        (ParamKind::String, _) => Err(invalid("a string")),
        (ParamKind::Integer, Value::Number(n)) if n.is_i64() => Ok(value.clone()),
        (ParamKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|n| json!(n))
            .map_err(|_| invalid("an integer")),
        (ParamKind::Integer, _) => Err(invalid("an integer")),
        (ParamKind::StringList, Value::Array(items)) => {
            if items.iter().all(Value::is_string) {
                Ok(value.clone())
            } else {
                Err(invalid("a list of strings"))
            }
        }
        (ParamKind::StringList, _) => Err(invalid("a list of strings")),
        (ParamKind::ObjectList(fields), Value::Array(items)) => {
            let mut bound = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let Some(map) = item.as_object() else {
                    return Err(invalid("a list of objects"));
                };
                let args = bind_map(fields, map, &format!("{}[{}].", qualified, i))?;
                bound.push(Value::Object(args.values));
            }
            Ok(Value::Array(bound))
        }
        (ParamKind::ObjectList(_), _) => Err(invalid("a list of objects")),
    }
}

// ─── Templates ──────────────────────────────────────────────────────────────

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Fill `{name}` placeholders, failing with the name of the first unresolved one
pub fn render_strict<F>(template: &str, lookup: F) -> std::result::Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let rendered = placeholder().replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        lookup(name).unwrap_or_else(|| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });
    match missing {
        Some(name) => Err(name),
        None => Ok(rendered.into_owned()),
    }
}

/// Fill `{name}` placeholders, leaving unresolved ones empty
pub fn render_message<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    placeholder()
        .replace_all(template, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

// ─── Request bodies ─────────────────────────────────────────────────────────

fn comment_body(a: &Args) -> Value {
    json!({"body": a.text_or_empty("comment")})
}

fn worklog_body(a: &Args) -> Value {
    json!({"timeSpent": a.text_or_empty("time_spent"), "comment": a.text_or_empty("comment")})
}

fn worklog_update_body(a: &Args) -> Value {
    let mut body = Map::new();
    if let Some(t) = a.text("time_spent") {
        body.insert("timeSpent".into(), json!(t));
    }
    if let Some(c) = a.text("comment") {
        body.insert("comment".into(), json!(c));
    }
    Value::Object(body)
}

/// Issue `fields` for a create call; shared with the bulk-create tool
pub fn new_issue_fields(a: &Args) -> Value {
    json!({
        "fields": {
            "project": {"key": a.text_or_empty("project_key")},
            "summary": a.text_or_empty("summary"),
            "description": a.text_or_empty("description"),
            "issuetype": {"name": a.text("issue_type").unwrap_or("Task")}
        }
    })
}

fn issue_update_body(a: &Args) -> Value {
    let mut fields = Map::new();
    if let Some(s) = a.text("summary") {
        fields.insert("summary".into(), json!(s));
    }
    if let Some(d) = a.text("description") {
        fields.insert("description".into(), json!(d));
    }
    json!({"fields": fields})
}

fn assign_body(a: &Args) -> Value {
    json!({"name": a.text_or_empty("assignee")})
}

fn unassign_body(_: &Args) -> Value {
    json!({"name": null})
}

fn version_body(a: &Args) -> Value {
    json!({
        "name": a.text_or_empty("name"),
        "description": a.text_or_empty("description"),
        "project": a.text_or_empty("project_key")
    })
}

fn issue_link_body(a: &Args) -> Value {
    json!({
        "type": {"name": a.text("link_type").unwrap_or("Relates")},
        "inwardIssue": {"key": a.text_or_empty("inward_issue")},
        "outwardIssue": {"key": a.text_or_empty("outward_issue")}
    })
}

fn remote_link_body(a: &Args) -> Value {
    json!({
        "object": {
            "url": a.text_or_empty("url"),
            "title": a.text_or_empty("title"),
            "summary": a.text_or_empty("summary")
        }
    })
}

fn sprint_create_body(a: &Args) -> Value {
    json!({
        "name": a.text_or_empty("name"),
        "originBoardId": a.value("board_id"),
        "goal": a.text_or_empty("goal")
    })
}

fn sprint_update_body(a: &Args) -> Value {
    let mut body = Map::new();
    if let Some(n) = a.text("name") {
        body.insert("name".into(), json!(n));
    }
    if let Some(g) = a.text("goal") {
        body.insert("goal".into(), json!(g));
    }
    Value::Object(body)
}

fn sprint_start_body(a: &Args) -> Value {
    let mut body = json!({"state": "active"});
    if let Some(d) = a.text("start_date") {
        body["startDate"] = json!(d);
    }
    if let Some(d) = a.text("end_date") {
        body["endDate"] = json!(d);
    }
    body
}

fn sprint_complete_body(_: &Args) -> Value {
    json!({"state": "closed"})
}

fn watcher_body(a: &Args) -> Value {
    // Jira expects a bare JSON string here
    json!(a.text_or_empty("username"))
}

// ─── Registry ───────────────────────────────────────────────────────────────

const ISSUE_KEY: Param = req("issue_key", Str, "Issue key (e.g., PROJ-123)");
const PROJECT_KEY: Param = req("project_key", Str, "Project key");
const BOARD_ID: Param = req("board_id", Int, "Board ID");
const SPRINT_ID: Param = req("sprint_id", Int, "Sprint ID");
const MAX_RESULTS: Param = opt("max_results", Int, "Max results").or(Literal::Int(50));
const ISSUE_TYPE: Param = opt("issue_type", Str, "Issue type").or(Literal::Str("Task"));

const NEW_ISSUE_PARAMS: &[Param] = &[
    PROJECT_KEY,
    req("summary", Str, "Issue summary"),
    opt("description", Str, "Issue description"),
    ISSUE_TYPE,
];

const NEW_VERSION_PARAMS: &[Param] = &[
    req("name", Str, "Version name"),
    opt("description", Str, "Version description"),
];

const SEARCH_QUERY: &[(&str, &str)] = &[
    ("jql", "{jql}"),
    ("maxResults", "{max_results}"),
    ("fields", SEARCH_FIELDS),
];

use Composite as C;
use Reply::{Json, Success, SuccessWith, Wrap};
use Verb::{Delete, Post, Put};

pub static TOOLS: &[ToolSpec] = &[
    // Issues and search
    ToolSpec {
        name: "jira_search",
        description: "Search Jira issues using JQL query",
        params: &[req("jql", Str, "JQL query"), MAX_RESULTS],
        action: with_query(Verb::Get, "rest/api/2/search", SEARCH_QUERY, Json),
    },
    ToolSpec {
        name: "jira_get_issue",
        description: "Get details of a specific Jira issue",
        params: &[ISSUE_KEY],
        action: get("rest/api/2/issue/{issue_key}", Json),
    },
    ToolSpec {
        name: "jira_get_user_profile",
        description: "Get current user profile",
        params: &[],
        action: get("rest/api/2/myself", Json),
    },
    ToolSpec {
        name: "jira_get_project_issues",
        description: "Get issues for a project",
        params: &[PROJECT_KEY, MAX_RESULTS],
        action: with_query(
            Verb::Get,
            "rest/api/2/search",
            &[
                ("jql", "project = {project_key}"),
                ("maxResults", "{max_results}"),
                ("fields", SEARCH_FIELDS),
            ],
            Json,
        ),
    },
    ToolSpec {
        name: "jira_create_issue",
        description: "Create a new Jira issue",
        params: NEW_ISSUE_PARAMS,
        action: rest(
            Post,
            "rest/api/2/issue",
            Some(new_issue_fields),
            SuccessWith("Created issue {key}", "issue"),
        ),
    },
    ToolSpec {
        name: "jira_update_issue",
        description: "Update an existing issue",
        params: &[
            ISSUE_KEY,
            opt("summary", Str, "New summary"),
            opt("description", Str, "New description"),
        ],
        action: rest(
            Put,
            "rest/api/2/issue/{issue_key}",
            Some(issue_update_body),
            Success("Updated issue {issue_key}"),
        ),
    },
    ToolSpec {
        name: "jira_delete_issue",
        description: "Delete a Jira issue",
        params: &[ISSUE_KEY],
        action: rest(
            Delete,
            "rest/api/2/issue/{issue_key}",
            None,
            Success("Deleted issue {issue_key}"),
        ),
    },
    ToolSpec {
        name: "jira_clone_issue",
        description: "Clone/duplicate an existing issue",
        params: &[
            req("issue_key", Str, "Issue key to clone"),
            req("summary", Str, "Summary for cloned issue"),
            opt("project_key", Str, "Target project key (optional)"),
        ],
        action: Action::Composite(C::CloneIssue),
    },
    ToolSpec {
        name: "jira_assign_issue",
        description: "Assign an issue to a user",
        params: &[ISSUE_KEY, req("assignee", Str, "Username to assign to")],
        action: rest(
            Put,
            "rest/api/2/issue/{issue_key}/assignee",
            Some(assign_body),
            Success("Assigned {issue_key} to {assignee}"),
        ),
    },
    ToolSpec {
        name: "jira_unassign_issue",
        description: "Remove assignee from an issue",
        params: &[ISSUE_KEY],
        action: rest(
            Put,
            "rest/api/2/issue/{issue_key}/assignee",
            Some(unassign_body),
            Success("Unassigned {issue_key}"),
        ),
    },
    // Comments
    ToolSpec {
        name: "jira_add_comment",
        description: "Add a comment to a Jira issue",
        params: &[ISSUE_KEY, req("comment", Str, "Comment text")],
        action: rest(
            Post,
            "rest/api/2/issue/{issue_key}/comment",
            Some(comment_body),
            Json,
        ),
    },
    ToolSpec {
        name: "jira_get_comments",
        description: "Get all comments for an issue",
        params: &[ISSUE_KEY],
        action: get("rest/api/2/issue/{issue_key}/comment", Json),
    },
    ToolSpec {
        name: "jira_update_comment",
        description: "Update an existing comment",
        params: &[
            ISSUE_KEY,
            req("comment_id", Str, "Comment ID"),
            req("comment", Str, "Updated comment text"),
        ],
        action: rest(
            Put,
            "rest/api/2/issue/{issue_key}/comment/{comment_id}",
            Some(comment_body),
            Success("Comment {comment_id} updated"),
        ),
    },
    ToolSpec {
        name: "jira_delete_comment",
        description: "Delete a comment from an issue",
        params: &[ISSUE_KEY, req("comment_id", Str, "Comment ID to delete")],
        action: rest(
            Delete,
            "rest/api/2/issue/{issue_key}/comment/{comment_id}",
            None,
            Success("Comment {comment_id} deleted"),
        ),
    },
    // Projects
    ToolSpec {
        name: "jira_get_projects",
        description: "Get all accessible projects",
        params: &[],
        action: get("rest/api/2/project", Wrap("projects")),
    },
    ToolSpec {
        name: "jira_get_project",
        description: "Get details of a specific project",
        params: &[PROJECT_KEY],
        action: get("rest/api/2/project/{project_key}", Json),
    },
    ToolSpec {
        name: "jira_get_project_versions",
        description: "Get all versions for a project",
        params: &[PROJECT_KEY],
        action: get("rest/api/2/project/{project_key}/versions", Wrap("versions")),
    },
    ToolSpec {
        name: "jira_create_version",
        description: "Create a new project version",
        params: &[
            PROJECT_KEY,
            req("name", Str, "Version name"),
            opt("description", Str, "Version description"),
        ],
        action: rest(
            Post,
            "rest/api/2/version",
            Some(version_body),
            SuccessWith("Created version {name}", "version"),
        ),
    },
    // Transitions
    ToolSpec {
        name: "jira_get_transitions",
        description: "Get available transitions for an issue",
        params: &[ISSUE_KEY],
        action: get("rest/api/2/issue/{issue_key}/transitions", Json),
    },
    ToolSpec {
        name: "jira_transition_issue",
        description: "Transition an issue to a new status",
        params: &[
            ISSUE_KEY,
            req(
                "transition_name",
                Str,
                "Transition name (e.g., 'In Progress', 'Done')",
            ),
        ],
        action: Action::Composite(C::TransitionIssue),
    },
    // Worklogs
    ToolSpec {
        name: "jira_get_worklog",
        description: "Get work logs for an issue",
        params: &[ISSUE_KEY],
        action: get("rest/api/2/issue/{issue_key}/worklog", Json),
    },
    ToolSpec {
        name: "jira_add_worklog",
        description: "Add work log to an issue",
        params: &[
            ISSUE_KEY,
            req("time_spent", Str, "Time spent (e.g., '2h', '30m')"),
            opt("comment", Str, "Work description"),
        ],
        action: rest(
            Post,
            "rest/api/2/issue/{issue_key}/worklog",
            Some(worklog_body),
            Success("Added {time_spent} worklog to {issue_key}"),
        ),
    },
    ToolSpec {
        name: "jira_update_worklog",
        description: "Update an existing worklog entry",
        params: &[
            ISSUE_KEY,
            req("worklog_id", Str, "Worklog ID"),
            opt("time_spent", Str, "Time spent (e.g., '2h', '30m')"),
            opt("comment", Str, "Work description"),
        ],
        action: rest(
            Put,
            "rest/api/2/issue/{issue_key}/worklog/{worklog_id}",
            Some(worklog_update_body),
            Success("Updated worklog {worklog_id}"),
        ),
    },
    ToolSpec {
        name: "jira_delete_worklog",
        description: "Delete a worklog entry",
        params: &[ISSUE_KEY, req("worklog_id", Str, "Worklog ID to delete")],
        action: rest(
            Delete,
            "rest/api/2/issue/{issue_key}/worklog/{worklog_id}",
            None,
            Success("Deleted worklog {worklog_id}"),
        ),
    },
    // Boards and sprints
    ToolSpec {
        name: "jira_get_boards",
        description: "Get all agile boards",
        params: &[],
        action: get("rest/agile/1.0/board", Json),
    },
    ToolSpec {
        name: "jira_get_board_issues",
        description: "Get issues from a board",
        params: &[BOARD_ID],
        action: get("rest/agile/1.0/board/{board_id}/issue", Json),
    },
    ToolSpec {
        name: "jira_get_all_sprints_from_board",
        description: "Get all sprints from a board",
        params: &[BOARD_ID],
        action: get("rest/agile/1.0/board/{board_id}/sprint", Json),
    },
    ToolSpec {
        name: "jira_create_sprint",
        description: "Create a new sprint",
        params: &[
            BOARD_ID,
            req("name", Str, "Sprint name"),
            opt("goal", Str, "Sprint goal"),
        ],
        action: rest(
            Post,
            "rest/agile/1.0/sprint",
            Some(sprint_create_body),
            Json,
        ),
    },
    ToolSpec {
        name: "jira_get_sprint_issues",
        description: "Get issues in a sprint",
        params: &[SPRINT_ID],
        action: get("rest/agile/1.0/sprint/{sprint_id}/issue", Json),
    },
    ToolSpec {
        name: "jira_update_sprint",
        description: "Update sprint details",
        params: &[
            SPRINT_ID,
            opt("name", Str, "Sprint name"),
            opt("goal", Str, "Sprint goal"),
        ],
        action: rest(
            Put,
            "rest/agile/1.0/sprint/{sprint_id}",
            Some(sprint_update_body),
            Success("Updated sprint {sprint_id}"),
        ),
    },
    ToolSpec {
        name: "jira_start_sprint",
        description: "Start a sprint",
        params: &[
            SPRINT_ID,
            opt("start_date", Str, "Start date (YYYY-MM-DD)"),
            opt("end_date", Str, "End date (YYYY-MM-DD)"),
        ],
        action: rest(
            Put,
            "rest/agile/1.0/sprint/{sprint_id}",
            Some(sprint_start_body),
            Success("Started sprint {sprint_id}"),
        ),
    },
    ToolSpec {
        name: "jira_complete_sprint",
        description: "Complete/close a sprint",
        params: &[SPRINT_ID],
        action: rest(
            Put,
            "rest/agile/1.0/sprint/{sprint_id}",
            Some(sprint_complete_body),
            Success("Completed sprint {sprint_id}"),
        ),
    },
    // Fields and epics
    ToolSpec {
        name: "jira_get_fields",
        description: "Get all available fields",
        params: &[],
        action: get("rest/api/2/field", Wrap("fields")),
    },
    ToolSpec {
        name: "jira_search_fields",
        description: "Search for specific fields by name",
        params: &[req("query", Str, "Field search query")],
        action: Action::Composite(C::SearchFields),
    },
    ToolSpec {
        name: "jira_get_custom_fields",
        description: "Get all custom fields",
        params: &[],
        action: Action::Composite(C::CustomFields),
    },
    ToolSpec {
        name: "jira_link_to_epic",
        description: "Link an issue to an epic",
        params: &[
            req("issue_key", Str, "Issue key to link"),
            req("epic_key", Str, "Epic key"),
        ],
        action: Action::Composite(C::LinkToEpic),
    },
    ToolSpec {
        name: "jira_get_epic_issues",
        description: "Get all issues in an epic",
        params: &[req("epic_key", Str, "Epic key")],
        action: with_query(
            Verb::Get,
            "rest/api/2/search",
            &[
                ("jql", "\"Epic Link\" = {epic_key}"),
                ("maxResults", "100"),
                ("fields", SEARCH_FIELDS),
            ],
            Json,
        ),
    },
    // Users
    ToolSpec {
        name: "jira_get_user_by_username",
        description: "Get user profile by username",
        params: &[req("username", Str, "Username to lookup")],
        action: with_query(
            Verb::Get,
            "rest/api/2/user",
            &[("username", "{username}")],
            Json,
        ),
    },
    // Links
    ToolSpec {
        name: "jira_create_issue_link",
        description: "Create a link between two issues",
        params: &[
            req("inward_issue", Str, "Source issue key"),
            req("outward_issue", Str, "Target issue key"),
            opt("link_type", Str, "Link type (e.g., 'Blocks', 'Relates')")
                .or(Literal::Str("Relates")),
        ],
        action: rest(
            Post,
            "rest/api/2/issueLink",
            Some(issue_link_body),
            Success("Created {link_type} link between {inward_issue} and {outward_issue}"),
        ),
    },
    ToolSpec {
        name: "jira_get_issue_link_types",
        description: "Get all available issue link types",
        params: &[],
        action: get("rest/api/2/issueLinkType", Json),
    },
    ToolSpec {
        name: "jira_create_remote_issue_link",
        description: "Create a remote/web link for an issue",
        params: &[
            ISSUE_KEY,
            req("url", Str, "Remote URL"),
            req("title", Str, "Link title"),
            opt("summary", Str, "Link summary/description"),
        ],
        action: rest(
            Post,
            "rest/api/2/issue/{issue_key}/remotelink",
            Some(remote_link_body),
            Success("Created remote link '{title}' for {issue_key}"),
        ),
    },
    ToolSpec {
        name: "jira_remove_issue_link",
        description: "Remove a link between two issues",
        params: &[req("link_id", Str, "Issue link ID to remove")],
        action: rest(
            Delete,
            "rest/api/2/issueLink/{link_id}",
            None,
            Success("Removed issue link {link_id}"),
        ),
    },
    // Attachments
    ToolSpec {
        name: "jira_get_attachments",
        description: "Get all attachments for an issue",
        params: &[ISSUE_KEY],
        action: with_query(
            Verb::Get,
            "rest/api/2/issue/{issue_key}",
            &[("fields", "attachment")],
            Reply::Pluck {
                pointer: "/fields/attachment",
                key: "attachments",
            },
        ),
    },
    ToolSpec {
        name: "jira_download_attachment",
        description: "Download an attachment from an issue",
        params: &[
            req("attachment_id", Str, "Attachment ID"),
            opt("filename", Str, "Path to save the content to (must not exist)"),
        ],
        action: Action::Composite(C::DownloadAttachment),
    },
    ToolSpec {
        name: "jira_delete_attachment",
        description: "Delete an attachment from an issue",
        params: &[req("attachment_id", Str, "Attachment ID to delete")],
        action: rest(
            Delete,
            "rest/api/2/attachment/{attachment_id}",
            None,
            Success("Attachment {attachment_id} deleted"),
        ),
    },
    // Watchers
    ToolSpec {
        name: "jira_get_watchers",
        description: "Get all watchers for an issue",
        params: &[ISSUE_KEY],
        action: get("rest/api/2/issue/{issue_key}/watchers", Json),
    },
    ToolSpec {
        name: "jira_add_watcher",
        description: "Add a watcher to an issue",
        params: &[ISSUE_KEY, req("username", Str, "Username to add as watcher")],
        action: rest(
            Post,
            "rest/api/2/issue/{issue_key}/watchers",
            Some(watcher_body),
            Success("Added {username} as watcher to {issue_key}"),
        ),
    },
    ToolSpec {
        name: "jira_remove_watcher",
        description: "Remove a watcher from an issue",
        params: &[
            ISSUE_KEY,
            req("username", Str, "Username to remove as watcher"),
        ],
        action: with_query(
            Delete,
            "rest/api/2/issue/{issue_key}/watchers",
            &[("username", "{username}")],
            Success("Removed {username} as watcher from {issue_key}"),
        ),
    },
    // Batch operations
    ToolSpec {
        name: "jira_batch_create_issues",
        description: "Create multiple issues at once",
        params: &[req(
            "issues",
            ParamKind::ObjectList(NEW_ISSUE_PARAMS),
            "Array of issue objects to create",
        )],
        action: Action::Composite(C::BatchCreateIssues),
    },
    ToolSpec {
        name: "jira_batch_create_versions",
        description: "Create multiple project versions at once",
        params: &[
            PROJECT_KEY,
            req(
                "versions",
                ParamKind::ObjectList(NEW_VERSION_PARAMS),
                "Array of version objects to create",
            ),
        ],
        action: Action::Composite(C::BatchCreateVersions),
    },
    ToolSpec {
        name: "jira_batch_get_changelogs",
        description: "Get changelogs for multiple issues",
        params: &[req("issue_keys", StrList, "Array of issue keys")],
        action: Action::Composite(C::BatchGetChangelogs),
    },
];

/// Look up a tool by name
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}
