use std::sync::Arc;

use chrono::{DateTime, Utc};
use ntex::http::{Method, StatusCode};
use ntex::util::Bytes;
use ntex::web;
use ntex::web::HttpRequest;
use serde_json::json;
use spdlog::{error, info, warn};

use crate::publish::Publisher;
use crate::submission::{Passkey, PostSubmission, SubmissionError};

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

pub type Clock = fn() -> DateTime<Utc>;

pub struct AppState {
    pub publisher: Publisher,
    pub passkey: Passkey,
    pub clock: Clock,
}

impl AppState {
    pub fn new(publisher: Publisher, passkey: Passkey) -> Self {
        Self {
            publisher,
            passkey,
            clock: Utc::now,
        }
    }
}

fn respond(status: StatusCode, body: Option<serde_json::Value>) -> web::HttpResponse {
    let mut builder = web::HttpResponse::build(status);
    for (name, value) in CORS_HEADERS {
        builder.header(name, value);
    }
    match body {
        Some(body) => builder.content_type("application/json").body(body.to_string()),
        None => builder.finish(),
    }
}

fn server_error(err: &dyn std::error::Error) -> web::HttpResponse {
    respond(StatusCode::INTERNAL_SERVER_ERROR, Some(json!({
        "message": "Internal server error",
        "error": err.to_string(),
    })))
}

/// Accepts `OPTIONS` preflights and `POST`ed submissions; anything else is a 405.
pub async fn publish_blog(req: HttpRequest, body: Bytes, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    if req.method() == Method::OPTIONS {
        return respond(StatusCode::OK, None);
    }
    if req.method() != Method::POST {
        return respond(StatusCode::METHOD_NOT_ALLOWED, Some(json!({ "message": "Method not allowed" })));
    }

    let submission = match PostSubmission::from_json(&body).and_then(|s| s.validate(&state.passkey)) {
        Ok(submission) => submission,
        Err(SubmissionError::InvalidPasskey) => {
            warn!("Rejected submission with an invalid passkey");
            return respond(StatusCode::UNAUTHORIZED, Some(json!({ "message": "Invalid passkey" })));
        }
        Err(SubmissionError::MissingFields) => {
            return respond(StatusCode::BAD_REQUEST, Some(json!({ "message": "Missing required fields" })));
        }
        Err(SubmissionError::InvalidTheme(theme)) => {
            warn!("Rejected submission for theme {:?}", theme);
            return respond(StatusCode::BAD_REQUEST, Some(json!({ "message": "Invalid theme" })));
        }
        Err(e) => {
            error!("Error publishing blog: {}", e);
            return server_error(&e);
        }
    };

    let now = (state.clock)();
    match state.publisher.publish(&submission, now).await {
        Ok(published) => {
            info!("Blog \"{}\" available at {}", submission.title, published.url);
            respond(StatusCode::OK, Some(json!({
                "message": "Blog published successfully",
                "blogUrl": published.url,
            })))
        }
        Err(e) => {
            error!("Error publishing blog: {}", e);
            server_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ntex::http::HeaderMap;
    use ntex::web::{test, App};
    use serde_json::Value;

    use crate::publish::SiteTarget;
    use crate::store::memory::MemoryStore;
    use crate::test_data::THEME_PAGE;

    use super::*;

    const PASSKEY: &str = "let-me-in";

    fn jan_5() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 5, 10, 30, 0).unwrap()
    }

    fn app_state(store: &Arc<MemoryStore>) -> Arc<AppState> {
        let site = SiteTarget { owner: "octo".to_string(), pages_domain: "github.io".to_string() };
        Arc::new(AppState {
            publisher: Publisher::new(store.clone(), site),
            passkey: Passkey::new(PASSKEY),
            clock: jan_5,
        })
    }

    async fn call(store: &Arc<MemoryStore>, req: test::TestRequest) -> (StatusCode, HeaderMap) {
        let app = test::init_service(
            App::new()
                .state(app_state(store))
                .service(web::resource("/publish").to(publish_blog))
        ).await;
        let resp = test::call_service(&app, req.uri("/publish").to_request()).await;
        (resp.status(), resp.headers().clone())
    }

    async fn post(store: &Arc<MemoryStore>, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .state(app_state(store))
                .service(web::resource("/publish").to(publish_blog))
        ).await;
        let req = test::TestRequest::post().uri("/publish").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(header(resp.headers(), "Access-Control-Allow-Origin"), "*");
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
        headers.get(name).unwrap().to_str().unwrap()
    }

    fn hello(passkey: &str) -> Value {
        json!({ "title": "Hello", "theme": "tech", "content": "<p>hi</p>", "passkey": passkey })
    }

    #[ntex::test]
    async fn test_publish_success() {
        let store = Arc::new(MemoryStore::new().with_file("tech.html", THEME_PAGE));
        let (status, body) = post(&store, hello(PASSKEY)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Blog published successfully");
        assert_eq!(body["blogUrl"], "https://octo.github.io/blogs/tech/2025-01-05.html");

        let post = store.content("blogs/tech/2025-01-05.html").unwrap();
        assert!(post.contains("<h1>Hello</h1>"));
        assert!(post.contains("<p>hi</p>"));
        let page = store.content("tech.html").unwrap();
        assert!(page.contains("<h2>Recent Blogs</h2>"));
        assert!(page.contains(r#"<li><a href="blogs/tech/2025-01-05.html">Jan 5: Hello</a></li>"#));
    }

    #[ntex::test]
    async fn test_existing_post_gets_suffix() {
        let store = Arc::new(MemoryStore::new()
            .with_file("tech.html", THEME_PAGE)
            .with_file("blogs/tech/2025-01-05.html", "<p>first</p>"));
        let (status, body) = post(&store, hello(PASSKEY)).await;

        let expected = format!("blogs/tech/2025-01-05-{}.html", jan_5().timestamp_millis());
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blogUrl"], format!("https://octo.github.io/{}", expected));
        assert_eq!(store.content("blogs/tech/2025-01-05.html").unwrap(), "<p>first</p>");
        assert!(store.content(&expected).is_some());
    }

    #[ntex::test]
    async fn test_wrong_passkey() {
        let store = Arc::new(MemoryStore::new().with_file("tech.html", THEME_PAGE));
        let (status, body) = post(&store, hello("guess")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid passkey");
        assert!(store.writes().is_empty());
    }

    #[ntex::test]
    async fn test_missing_fields() {
        let store = Arc::new(MemoryStore::new().with_file("tech.html", THEME_PAGE));
        for field in ["title", "theme", "content"] {
            let mut body = hello(PASSKEY);
            body[field] = json!("");
            let (status, resp) = post(&store, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(resp["message"], "Missing required fields");

            let mut body = hello(PASSKEY);
            body.as_object_mut().unwrap().remove(field);
            let (status, _) = post(&store, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        assert!(store.writes().is_empty());
    }

    #[ntex::test]
    async fn test_theme_outside_blogs_rejected() {
        let store = Arc::new(MemoryStore::new().with_file("tech.html", THEME_PAGE));
        for theme in ["..", ".", "tech/../..", "a\\b"] {
            let mut body = hello(PASSKEY);
            body["theme"] = json!(theme);
            let (status, resp) = post(&store, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", theme);
            assert_eq!(resp["message"], "Invalid theme");
        }
        assert!(store.writes().is_empty());
    }

    #[ntex::test]
    async fn test_index_conflict_still_succeeds() {
        let store = Arc::new(MemoryStore::new().with_file("tech.html", THEME_PAGE));
        store.conflict_on_put("tech.html");
        let (status, body) = post(&store, hello(PASSKEY)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blogUrl"], "https://octo.github.io/blogs/tech/2025-01-05.html");
        assert!(body.get("error").is_none());
        assert_eq!(store.content("tech.html").unwrap(), THEME_PAGE);
    }

    #[ntex::test]
    async fn test_store_failure_is_server_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_fetch("blogs/tech/2025-01-05.html");
        let (status, body) = post(&store, hello(PASSKEY)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body["error"].as_str().unwrap().contains("Bad gateway"));
        assert!(store.writes().is_empty());
    }

    #[ntex::test]
    async fn test_malformed_body_is_server_error() {
        let store = Arc::new(MemoryStore::new());
        let req = test::TestRequest::post()
            .header("Content-Type", "application/json")
            .set_payload("{not json");
        let (status, _) = call(&store, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.writes().is_empty());
    }

    #[ntex::test]
    async fn test_preflight() {
        let store = Arc::new(MemoryStore::new());
        let (status, headers) = call(&store, test::TestRequest::default().method(Method::OPTIONS)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), "*");
        assert_eq!(header(&headers, "Access-Control-Allow-Methods"), "POST, OPTIONS");
        assert_eq!(header(&headers, "Access-Control-Allow-Headers"), "Content-Type");
    }

    #[ntex::test]
    async fn test_method_not_allowed() {
        let store = Arc::new(MemoryStore::new());
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let (status, headers) = call(&store, test::TestRequest::default().method(method)).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(header(&headers, "Access-Control-Allow-Origin"), "*");
        }
        assert!(store.writes().is_empty());
    }
}
