use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// What needs doing. Trimmed, never empty.
    pub description: String,
    pub completed: bool,
    /// Identifier of the user who owns the task.
    #[sqlx(rename = "owner_id")]
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `owner`.
    /// The owner always comes from the authenticated caller, never from the request body.
    pub fn new(input: CreateTaskRequest, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: input.description,
            completed: input.completed,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload of `POST /tasks`. Unknown keys (including `owner`) are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTaskRequest {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

/// Payload of `PATCH /tasks/{id}`. Any key other than these two rejects the request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.map(|d| d.trim().to_string()),
            ..self
        }
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Raw query string of `GET /tasks`.
///
/// Everything is kept as text so malformed values degrade to "no filter" instead of
/// failing the request; [`TaskQuery::parse`] turns it into a [`TaskListQuery`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// `true` selects completed tasks, any other non-empty value open ones.
    pub completed: Option<String>,
    /// `<field>_<asc|desc>`, e.g. `createdAt_desc`.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl TaskQuery {
    pub fn parse(&self) -> TaskListQuery {
        TaskListQuery {
            completed: self
                .completed
                .as_deref()
                .filter(|value| !value.is_empty())
                .map(|value| value == "true"),
            sort: self.sort_by.as_deref().and_then(TaskSort::parse),
            limit: self.limit.as_deref().and_then(parse_count),
            skip: self.skip.as_deref().and_then(parse_count),
        }
    }
}

/// Parses a leading integer the way JavaScript's `parseInt` does ("10abc" is 10).
/// Zero, negative or unparseable input yields `None`.
fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .ok()
        .map(|n| sign * n)
        .filter(|n| *n > 0)
}

/// Validated listing options, applied after the ownership filter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskListQuery {
    pub completed: Option<bool>,
    pub sort: Option<TaskSort>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

impl TaskSort {
    /// Parses `field_direction`. Unknown fields yield `None`; any direction other than
    /// `desc` sorts ascending.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('_');
        let field = TaskSortField::parse(parts.next()?)?;
        let direction = match parts.next() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Some(Self { field, direction })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl TaskSortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "description" => Some(Self::Description),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Column name in the `tasks` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Description => "description",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
