use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header, request};
use pdf_extractor_service::testing::{MINIMAL_PDF, MockBackend};
use pdf_extractor_service::{AppState, build_router};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pdfx-test-boundary";
const MAX_UPLOAD: usize = 1024 * 1024;

struct TestApp {
    router: Router,
    backend: MockBackend,
    staging: TempDir,
    cookie: Option<String>,
}

impl TestApp {
    fn new(backend: MockBackend) -> Self {
        let staging = tempfile::tempdir().unwrap();
        let state = AppState::new(
            Arc::new(backend.clone()),
            staging.path().to_path_buf(),
            MAX_UPLOAD,
        );
        Self {
            router: build_router(state),
            backend,
            staging,
            cookie: None,
        }
    }

    async fn send(
        &mut self,
        builder: request::Builder,
        body: Body,
    ) -> (StatusCode, String, HeaderMap) {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap(), headers)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, String, HeaderMap) {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    async fn post(&mut self, uri: &str) -> (StatusCode, String) {
        let (status, body, _) = self
            .send(Request::builder().method("POST").uri(uri), Body::empty())
            .await;
        (status, body)
    }

    async fn upload(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> (StatusCode, String) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let builder = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        let (status, body, _) = self.send(builder, Body::from(body)).await;
        (status, body)
    }

    async fn submit_intent(&mut self, form: &str) -> (StatusCode, String) {
        let builder = Request::builder()
            .method("POST")
            .uri("/intent")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        let (status, body, _) = self.send(builder, Body::from(form.to_string())).await;
        (status, body)
    }

    fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}

const INVOICE_FORM: &str =
    "goal=List+all+invoice+totals&entities=Invoice+Number%2C+Total&style=Table&notes=";

const INVOICE_TABLE: &str =
    "| Invoice Number | Total |\n|---|---|\n| INV-001 | $120.00 |\n| INV-002 | $80.50 |";

#[tokio::test]
async fn first_visit_asks_for_a_pdf_and_sets_a_session_cookie() {
    let mut app = TestApp::new(MockBackend::replying("unused"));

    let (status, body, headers) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::SET_COOKIE).is_some());
    assert!(body.contains(r#"action="/upload""#));
    assert!(body.contains("👆 Please upload a PDF file to get started"));
    assert!(!body.contains(r#"action="/intent""#));
    assert!(!body.contains(r#"action="/extract""#));
    assert!(app.backend.uploads().is_empty());
}

#[tokio::test]
async fn invoice_table_extraction_end_to_end() {
    let mut app = TestApp::new(MockBackend::replying(INVOICE_TABLE));

    let (status, body) = app.upload("invoices.pdf", "application/pdf", MINIMAL_PDF).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("📄 File uploaded: invoices.pdf"));
    assert!(body.contains(r#"action="/intent""#));

    let (_, body) = app.submit_intent(INVOICE_FORM).await;
    assert!(body.contains("Current Settings"));
    assert!(body.contains(r#"action="/extract""#));
    assert!(!body.contains(r#"action="/intent""#));
    assert!(app.backend.generate_requests().is_empty());

    let (status, body) = app.post("/extract").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("✅ Extraction complete!"));
    assert!(body.contains("<table>"));
    assert!(body.contains("INV-002"));

    let uploads = app.backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].mime_type, "application/pdf");
    assert!(uploads[0].existed_during_upload);
    assert_eq!(uploads[0].bytes, MINIMAL_PDF);
    assert_eq!(app.staged_files(), 0);

    let (status, body, headers) = app.get("/export").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INVOICE_TABLE);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/markdown; charset=utf-8"
    );
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"extracted_"));
    assert!(disposition.ends_with(".md\""));
}

#[tokio::test]
async fn json_style_falls_back_to_literal_on_invalid_json() {
    let mut app = TestApp::new(MockBackend::replying("{\"total\": 12,"));

    app.upload("report.pdf", "application/pdf", MINIMAL_PDF).await;
    app.submit_intent("goal=Totals&entities=&style=JSON&notes=").await;
    let (_, body) = app.post("/extract").await;

    assert!(body.contains(r#"<code class="language-json">"#));
    assert!(body.contains("{\"total\": 12,"));

    let (_, exported, _) = app.get("/export").await;
    assert_eq!(exported, "{\"total\": 12,");
}

#[tokio::test]
async fn generation_failure_is_shown_and_staging_is_cleaned() {
    let mut app = TestApp::new(MockBackend::failing_generation("quota exceeded"));

    app.upload("invoices.pdf", "application/pdf", MINIMAL_PDF).await;
    app.submit_intent(INVOICE_FORM).await;
    let (status, body) = app.post("/extract").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error processing PDF"));
    assert!(body.contains("quota exceeded"));
    assert!(!body.contains("✅ Extraction complete!"));
    assert_eq!(app.staged_files(), 0);

    let (status, _, _) = app.get("/export").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_goal_is_rejected_and_form_is_shown_again() {
    let mut app = TestApp::new(MockBackend::replying("unused"));

    app.upload("invoices.pdf", "application/pdf", MINIMAL_PDF).await;
    let (_, body) = app
        .submit_intent("goal=+++&entities=Total&style=Table&notes=")
        .await;

    assert!(body.contains("Please describe what information you need before proceeding."));
    assert!(body.contains(r#"action="/intent""#));
    assert!(!body.contains(r#"action="/extract""#));

    let (_, body) = app.post("/extract").await;
    assert!(!body.contains("✅ Extraction complete!"));
    assert!(app.backend.generate_requests().is_empty());
}

#[tokio::test]
async fn reset_returns_to_the_intent_form() {
    let mut app = TestApp::new(MockBackend::replying("- item"));

    app.upload("invoices.pdf", "application/pdf", MINIMAL_PDF).await;
    app.submit_intent(INVOICE_FORM).await;
    app.post("/extract").await;

    let (_, body) = app.post("/reset").await;

    assert!(body.contains(r#"action="/intent""#));
    assert!(!body.contains("Current Settings"));
    assert!(body.contains("📄 File uploaded: invoices.pdf"));
}

#[tokio::test]
async fn non_pdf_upload_is_rejected() {
    let mut app = TestApp::new(MockBackend::replying("unused"));

    let (status, body) = app.upload("notes.txt", "text/plain", b"hello").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Only PDF files are supported"));
    assert!(body.contains("👆 Please upload a PDF file to get started"));
}

#[tokio::test]
async fn export_without_result_is_not_found() {
    let mut app = TestApp::new(MockBackend::replying("unused"));

    let (status, _, _) = app.get("/export").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let mut app = TestApp::new(MockBackend::replying("unused"));

    let (status, body, headers) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get("x-correlation-id").is_some());
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}
