use crate::error::AdminError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paginated admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Users,
    Conversations,
    Messages,
    Admins,
    Logs,
}

impl Resource {
    /// Path segment and the key holding the rows in the response.
    pub fn key(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Conversations => "conversations",
            Resource::Messages => "messages",
            Resource::Admins => "admins",
            Resource::Logs => "logs",
        }
    }

    /// Table columns as (header, row field).
    pub fn columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Resource::Users => &[
                ("ID", "id"),
                ("EMAIL", "email"),
                ("REGISTERED", "created_at"),
                ("LAST LOGIN", "last_login"),
            ],
            Resource::Conversations => &[
                ("ID", "id"),
                ("USER", "user_email"),
                ("DATE", "date"),
                ("MESSAGES", "message_count"),
            ],
            Resource::Messages => &[
                ("ID", "id"),
                ("USER", "user_email"),
                ("CONVERSATION", "conversation_id"),
                ("TEXT", "text"),
                ("CREATED", "created_at"),
                ("FROM", "is_user"),
                ("AGENT", "agent_type"),
            ],
            Resource::Admins => &[
                ("ID", "id"),
                ("USERNAME", "username"),
                ("EMAIL", "email"),
                ("ROLE", "role"),
                ("CREATED", "created_at"),
                ("LAST LOGIN", "last_login"),
            ],
            Resource::Logs => &[
                ("ID", "id"),
                ("ADMIN", "admin_username"),
                ("ACTION", "action"),
                ("TARGET", "target_id"),
                ("DETAILS", "details"),
                ("TIME", "created_at"),
            ],
        }
    }
}

/// Listings the search endpoint supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    Users,
    Conversations,
    Messages,
}

impl From<SearchScope> for Resource {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Users => Resource::Users,
            SearchScope::Conversations => Resource::Conversations,
            SearchScope::Messages => Resource::Messages,
        }
    }
}

pub type Row = Map<String, Value>;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub resource: Resource,
    pub rows: Vec<Row>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Pull rows out of `{ "<resource>": [...], "total": n }`.
    pub fn from_value(
        resource: Resource,
        page: u32,
        per_page: u32,
        mut value: Value,
    ) -> Result<Self, AdminError> {
        let obj = value
            .as_object_mut()
            .ok_or_else(|| AdminError::Shape(format!("{} listing is not an object", resource.key())))?;

        let rows = match obj.remove(resource.key()) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(row) => Some(row),
                    other => {
                        tracing::warn!(%other, "skipping non-object row");
                        None
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(AdminError::Shape(format!(
                    "`{}` is not an array: {other}",
                    resource.key()
                )))
            }
        };
        let total = obj.get("total").and_then(Value::as_u64).unwrap_or(rows.len() as u64);

        Ok(Self {
            resource,
            rows,
            total,
            page,
            per_page,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.total, self.page, self.per_page)
    }
}

/// Page arithmetic for listing navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(total_items: u64, current: u32, per_page: u32) -> Self {
        let per_page = u64::from(per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        Self {
            current: current.max(1),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    /// Navigation is only shown with more than one page.
    pub fn is_paged(&self) -> bool {
        self.total_pages > 1
    }

    pub fn prev(&self) -> Option<u32> {
        (self.current > 1).then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.current < self.total_pages).then(|| self.current + 1)
    }

    /// Up to two page numbers on each side of the current one.
    pub fn window(&self) -> std::ops::RangeInclusive<u32> {
        let start = self.current.saturating_sub(2).max(1);
        let end = self.total_pages.min(self.current.saturating_add(2));
        start..=end
    }
}

/// Body of `POST /admin/admin/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: AdminRole,
}

/// Body of `POST /admin/admin/<id>/update`. A `None` password keeps the
/// current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUpdate {
    pub email: Option<String>,
    pub role: Option<AdminRole>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    Superadmin,
}

/// `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub total_conversations: u64,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub recent_users: Vec<Row>,
}

/// Things the admin panel can delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    User(String),
    Conversation(String),
    Message(i64),
    Admin(i64),
}

impl DeleteTarget {
    pub fn path(&self) -> String {
        match self {
            DeleteTarget::User(email) => {
                format!("admin/user/{}/delete", urlencoding::encode(email))
            }
            DeleteTarget::Conversation(id) => {
                format!("admin/conversation/{}/delete", urlencoding::encode(id))
            }
            DeleteTarget::Message(id) => format!("admin/message/{id}/delete"),
            DeleteTarget::Admin(id) => format!("admin/admin/{id}/delete"),
        }
    }
}
