#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use actix_web::{http::header, test, web};
use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::{json, Value};

use taskmate::notify::{Email, MailError, Mailer};
use taskmate::state::AppState;
use taskmate::store::MemoryStore;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "taskmate-test-boundary";

/// Keeps every email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Fresh in-memory state for one test.
pub fn test_state() -> (web::Data<AppState>, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(Arc::new(MemoryStore::new()), mailer.clone(), JWT_SECRET);
    (web::Data::new(state), mailer)
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn signup_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;

    if status != actix_web::http::StatusCode::CREATED {
        return Err(format!(
            "Failed to sign up. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&bytes)
        ));
    }
    let body: Value = serde_json::from_slice(&bytes)
        .map_err(|e| format!("Failed to parse signup response: {}", e))?;

    Ok(TestUser {
        id: body["user"]["id"].as_str().unwrap_or_default().to_string(),
        token: body["token"].as_str().unwrap_or_default().to_string(),
    })
}

/// A one-field multipart body.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = BOUNDARY,
        field = field,
        filename = filename,
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    )
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = ImageBuffer::from_pixel(width, height, Rgb([20u8, 120, 220]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// Lets spawned notification tasks run.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}
