//! Router-level integration tests: multipart upload, status polling,
//! result/download retrieval, validation rejections and rate limiting,
//! all driven through `tower::ServiceExt::oneshot` without a socket.

use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use atscan::config::{Config, Environment};
use atscan::routes::build_router;
use atscan::state::AppState;

const BOUNDARY: &str = "X-ATSCAN-TEST-BOUNDARY";

const STRONG_RESUME: &[&str] = &[
    "Jane Doe",
    "jane.doe@example.com | +1 415 555 0100 | linkedin.com/in/janedoe",
    "Summary",
    "DevOps engineer focused on reliable delivery pipelines.",
    "Skills",
    "Kubernetes, Docker, Terraform, AWS, Python, PostgreSQL",
    "Experience",
    "- Built CI/CD pipelines serving 40 product teams",
    "- Reduced deploy time by 70 percent across the platform",
    "- Automated Kubernetes cluster upgrades for 12 environments",
    "- Implemented Terraform modules reused by 8 teams",
    "- Led incident response improving uptime to 99.95 percent",
    "- Optimized AWS spend, cutting costs by 30 percent",
    "Education",
    "B.S. Computer Science",
];

const DEVOPS_JD: &str = "We are hiring a DevOps engineer with AWS, Terraform, \
    Kubernetes and Docker experience. You will own CI/CD pipelines and \
    PostgreSQL operations end to end in a production environment.";

fn test_config(env: Environment) -> Config {
    Config {
        port: 0,
        env,
        rate_limit_per_day: 5,
        semantic_threshold: 0.62,
        job_ttl_minutes: 60,
        fallback_keywords: None,
        rust_log: "info".to_string(),
    }
}

fn test_app(env: Environment) -> Router {
    let state = AppState::build(test_config(env), None).expect("state should build");
    build_router(state)
}

/// Minimal in-memory .docx: one `word/document.xml` part with the given
/// paragraphs. Paragraph text must be XML-safe.
fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::FileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        let mut xml = String::from("<w:document><w:body>");
        for p in paragraphs {
            xml.push_str("<w:p><w:r><w:t>");
            xml.push_str(p);
            xml.push_str("</w:t></w:r></w:p>");
        }
        xml.push_str("</w:body></w:document>");
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}

fn multipart_body(filename: &str, file: &[u8], job_description: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(b"\r\n");
    if let Some(jd) = job_description {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"job_description\"\r\n\r\n{jd}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST /api/analyze with a fake client address. The router is normally
/// served with connect-info; oneshot tests supply it as an extension.
fn analyze_request(body: Vec<u8>, ip: [u8; 4]) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 41000))));
    req
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn submit(app: &Router, body: Vec<u8>, ip: [u8; 4]) -> Uuid {
    let response = app.clone().oneshot(analyze_request(body, ip)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    json["job_id"].as_str().unwrap().parse().unwrap()
}

/// Polls status until the job reaches a terminal state.
async fn wait_for_terminal(app: &Router, job_id: Uuid) -> Value {
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/status/{job_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let state = json["state"].as_str().unwrap().to_string();
        if state == "done" || state == "error" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = test_app(Environment::Dev)
        .oneshot(get_request("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn test_banner_identifies_service() {
    let response = test_app(Environment::Dev)
        .oneshot(get_request("/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["service"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_job_id_is_404_everywhere() {
    let app = test_app(Environment::Dev);
    let id = Uuid::new_v4();

    for uri in [
        format!("/api/status/{id}"),
        format!("/api/result/{id}"),
        format!("/api/download/{id}"),
    ] {
        let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_unsupported_extension_rejected_synchronously() {
    let app = test_app(Environment::Dev);
    let body = multipart_body("resume.txt", b"plain text resume", None);

    let response = app.oneshot(analyze_request(body, [127, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn test_oversize_upload_rejected_synchronously() {
    let app = test_app(Environment::Dev);
    let oversized = vec![b'a'; atscan::extract::MAX_FILE_BYTES + 1];
    let body = multipart_body("resume.pdf", &oversized, None);

    let response = app.oneshot(analyze_request(body, [127, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn test_missing_resume_field_rejected() {
    let app = test_app(Environment::Dev);
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; \
         name=\"job_description\"\r\n\r\nsome text\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes();

    let response = app.oneshot(analyze_request(body, [127, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sixth_upload_from_same_ip_is_rate_limited() {
    let app = test_app(Environment::Production);
    let docx = build_docx(STRONG_RESUME);

    for _ in 0..5 {
        let body = multipart_body("resume.docx", &docx, None);
        let response = app
            .clone()
            .oneshot(analyze_request(body, [10, 0, 0, 7]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = multipart_body("resume.docx", &docx, None);
    let response = app
        .clone()
        .oneshot(analyze_request(body, [10, 0, 0, 7]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "RATE_LIMITED");

    // another client is unaffected
    let body = multipart_body("resume.docx", &docx, None);
    let response = app
        .clone()
        .oneshot(analyze_request(body, [10, 0, 0, 8]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_upload_reaches_error_state() {
    let app = test_app(Environment::Dev);
    let body = multipart_body("resume.pdf", b"this is not a pdf at all", None);
    let job_id = submit(&app, body, [127, 0, 0, 1]).await;

    let status = wait_for_terminal(&app, job_id).await;
    assert_eq!(status["state"], "error");
    assert_eq!(status["progress"], 100);
    assert!(status["error"].as_str().is_some());

    // no result or report for a failed job
    for uri in [
        format!("/api/result/{job_id}"),
        format!("/api/download/{job_id}"),
    ] {
        let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_analysis_flow_docx_with_job_description() {
    let app = test_app(Environment::Dev);
    let body = multipart_body("resume.docx", &build_docx(STRONG_RESUME), Some(DEVOPS_JD));
    let job_id = submit(&app, body, [127, 0, 0, 1]).await;

    let status = wait_for_terminal(&app, job_id).await;
    assert_eq!(status["state"], "done");
    assert_eq!(status["progress"], 100);
    assert!(status["error"].is_null());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/result/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;

    // total = sum of sub-scores, all within caps
    let breakdown = &result["scores"]["breakdown"];
    let keywords = breakdown["keywords"].as_f64().unwrap();
    let formatting = breakdown["formatting"].as_f64().unwrap();
    let content = breakdown["content"].as_f64().unwrap();
    let total = result["scores"]["total"].as_f64().unwrap();
    assert!((total - (keywords + formatting + content)).abs() < 1e-6);
    assert!((0.0..=100.0).contains(&total));
    assert!(keywords <= 45.0 && formatting <= 25.0 && content <= 30.0);

    // present/missing partition the extracted keyword set
    let kw = &result["keyword_analysis"];
    let present: Vec<&str> = kw["present"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let missing: Vec<&str> = kw["missing"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let jd_keywords: Vec<&str> = kw["jd_keywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(present.iter().all(|k| !missing.contains(k)));
    assert_eq!(present.len() + missing.len(), jd_keywords.len());
    for k in ["kubernetes", "terraform", "docker", "aws"] {
        assert!(present.contains(&k), "{k} should be present: {present:?}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_download_after_completion() {
    let app = test_app(Environment::Dev);
    let body = multipart_body("resume.docx", &build_docx(STRONG_RESUME), Some(DEVOPS_JD));
    let job_id = submit(&app, body, [127, 0, 0, 1]).await;
    wait_for_terminal(&app, job_id).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/download/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("ATS Compatibility Report"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unrelated_resume_misses_all_jd_keywords() {
    let resume = [
        "John Smith",
        "john.smith@example.com | +1 206 555 0101",
        "Summary",
        "Pastry chef specialising in laminated doughs and viennoiserie.",
        "Skills",
        "Croissant lamination, sourdough starters, menu planning",
        "Experience",
        "- Led a bakery team of 9 through two seasonal menu launches",
        "Education",
        "Culinary Institute Diploma",
    ];
    let jd = "Platform role requiring Kubernetes, Terraform and Docker skills \
              across our AWS cloud estate, supporting production workloads daily.";

    let app = test_app(Environment::Dev);
    let body = multipart_body("resume.docx", &build_docx(&resume), Some(jd));
    let job_id = submit(&app, body, [127, 0, 0, 1]).await;
    wait_for_terminal(&app, job_id).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/result/{job_id}")))
        .await
        .unwrap();
    let result = json_body(response).await;

    let kw = &result["keyword_analysis"];
    assert!(kw["present"].as_array().unwrap().is_empty());
    assert_eq!(
        kw["missing"].as_array().unwrap().len(),
        kw["jd_keywords"].as_array().unwrap().len()
    );
    assert_eq!(kw["coverage"], 0.0);

    let suggestions = result["suggestions"]["items"].as_array().unwrap();
    assert!(suggestions
        .iter()
        .any(|s| s["type"] == "keywords" && s["title"].as_str().unwrap().contains("keywords")));
}
