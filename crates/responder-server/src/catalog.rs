//! Sample author catalogue.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/authors` | Paginated author listing (`page`, `with`, `only`) |
//! | GET | `/authors/{id}` | One author (`with`, `only`) |
//!
//! Listings are enveloped under `authors` and single authors under `author`.
//! Both keys use the author transformer registered by
//! [`register_transformers`].

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use responder::extractors::RequestScope;
use responder::pagination::PaginatorFactory;
use responder::transform::JsonTransformer;
use responder::{JsonResponse, ResponderProvider, ResponderResult, ResponderState};
use serde_json::{Value, json};
use tracing::debug;

const PER_PAGE: usize = 2;

/// Registers the catalogue's transformers by resource key.
pub fn register_transformers(provider: &mut ResponderProvider) {
    provider
        .transformer("author", || Box::new(author_transformer()))
        .transformer("authors", || Box::new(author_transformer()));
}

/// Builds the catalogue router.
pub fn routes(state: ResponderState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/authors", get(list_authors))
        .route("/authors/{id}", get(show_author))
        .with_state(state)
}

async fn health(State(state): State<ResponderState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "runtime": state.variant().as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_authors(scope: RequestScope) -> ResponderResult<JsonResponse> {
    let authors = authors();
    let page = scope
        .resolve::<dyn PaginatorFactory>()?
        .meta("/authors", authors.len(), PER_PAGE);
    debug!(page = page.current, total = page.total, "Listing authors");

    let items: Vec<Value> = authors
        .into_iter()
        .skip(page.offset())
        .take(page.per_page)
        .collect();

    scope
        .responder()?
        .success(Value::Array(items))
        .resource_key("authors")
        .meta("pagination", page.to_json())
        .respond(StatusCode::OK)
}

async fn show_author(scope: RequestScope, Path(id): Path<u64>) -> ResponderResult<JsonResponse> {
    let responder = scope.responder()?;

    match authors().into_iter().find(|author| author["id"] == id) {
        Some(author) => responder
            .success(author)
            .resource_key("author")
            .respond(StatusCode::OK),
        None => responder
            .error("author_not_found", None)
            .data(json!({ "id": id }))
            .respond(StatusCode::NOT_FOUND),
    }
}

fn author_transformer() -> JsonTransformer {
    JsonTransformer::new().with_nested(
        "books",
        JsonTransformer::new().with_relations(["publisher"]),
    )
}

fn authors() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Ada Lovelace",
            "born": 1815,
            "books": [
                {
                    "id": 10,
                    "title": "Notes on the Analytical Engine",
                    "publisher": {"name": "Taylor"}
                }
            ]
        }),
        json!({
            "id": 2,
            "name": "Mary Shelley",
            "born": 1797,
            "books": [
                {"id": 20, "title": "Frankenstein", "publisher": {"name": "Lackington"}},
                {"id": 21, "title": "The Last Man", "publisher": {"name": "Colburn"}}
            ]
        }),
        json!({
            "id": 3,
            "name": "Charles Babbage",
            "born": 1791,
            "books": []
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use responder::{AppHost, ResponderConfig};
    use std::collections::BTreeMap;

    fn server() -> TestServer {
        let mut host = AppHost::micro("config");
        let mut messages = BTreeMap::new();
        messages.insert(
            "author_not_found".to_string(),
            "The requested author does not exist.".to_string(),
        );
        let state = ResponderState::bootstrap_with(&mut host, register_transformers)
            .unwrap()
            .with_config(ResponderConfig {
                error_messages: messages,
                ..Default::default()
            });
        TestServer::new(routes(state)).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn test_health() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["runtime"], "micro");
    }

    #[tokio::test]
    async fn test_list_authors_paginates() {
        let response = server().get("/authors").add_query_param("page", "2").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body["authors"],
            json!([{"id": 3, "name": "Charles Babbage", "born": 1791}])
        );
        assert_eq!(body["pagination"]["current_page"], 2);
        assert_eq!(body["pagination"]["links"]["previous"], "/authors?page=1");
        assert_eq!(body["status"], 200);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_show_author_with_books() {
        let response = server()
            .get("/authors/2")
            .add_query_param("with", "books")
            .add_query_param("only", "name,books.title")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body["author"],
            json!({
                "name": "Mary Shelley",
                "books": [{"title": "Frankenstein"}, {"title": "The Last Man"}]
            })
        );
    }

    #[tokio::test]
    async fn test_author_relations_dropped_unless_requested() {
        let response = server().get("/authors/1").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body["author"],
            json!({"id": 1, "name": "Ada Lovelace", "born": 1815})
        );
    }

    #[tokio::test]
    async fn test_missing_author() {
        let response = server().get("/authors/99").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "author_not_found");
        assert_eq!(
            body["error"]["message"],
            "The requested author does not exist."
        );
        assert_eq!(body["error"]["id"], 99);
        assert_eq!(body["success"], false);
    }
}
