use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc { pub error: String, pub detail: Option<String> }

/// Body for creating or renaming a category or priority.
#[derive(ToSchema)]
pub struct NameInputDoc { pub name: String }

#[derive(ToSchema)]
pub struct TaskFormDoc {
    pub title: String,
    pub description: String,
    /// Defaults to the first configured status.
    pub status: Option<String>,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM` in the server time zone.
    pub deadline: String,
    pub priority_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct SubtaskFormDoc { pub task_id: i32, pub title: String, pub status: Option<String> }

#[derive(ToSchema)]
pub struct NoteFormDoc { pub task_id: i32, pub content: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::statuses,
        crate::routes::dashboard::summary,
        crate::routes::categories::list,
        crate::routes::categories::create,
        crate::routes::categories::get,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::priorities::list,
        crate::routes::priorities::create,
        crate::routes::priorities::get,
        crate::routes::priorities::update,
        crate::routes::priorities::delete,
        crate::routes::tasks::list,
        crate::routes::tasks::create,
        crate::routes::tasks::get,
        crate::routes::tasks::update,
        crate::routes::tasks::delete,
        crate::routes::subtasks::list,
        crate::routes::subtasks::create,
        crate::routes::subtasks::get,
        crate::routes::subtasks::update,
        crate::routes::subtasks::delete,
        crate::routes::notes::list,
        crate::routes::notes::create,
        crate::routes::notes::get,
        crate::routes::notes::update,
        crate::routes::notes::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBodyDoc,
            NameInputDoc,
            TaskFormDoc,
            SubtaskFormDoc,
            NoteFormDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "dashboard"),
        (name = "categories"),
        (name = "priorities"),
        (name = "tasks"),
        (name = "subtasks"),
        (name = "notes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/api/dashboard", "/api/tasks", "/api/tasks/{id}", "/api/notes/{id}", "/api/statuses"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
