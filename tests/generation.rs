use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use sglang_media::{
    demo::{run_video_demo, DemoOptions, DemoOutcome},
    ClientConfig, GenerationRequest, HttpReply, ImageGenerationRequest, MediaError, Result,
    SglangClient, Transport, VideoParams,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01";

/// Serves canned replies per path and records every request body.
#[derive(Default)]
struct FakeServer {
    routes: HashMap<String, HttpReply>,
    unreachable: bool,
    posted: Mutex<Vec<(String, Value, Duration)>>,
}

impl FakeServer {
    fn route(mut self, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .insert(path.to_string(), HttpReply::new(status, body));
        self
    }

    fn reply(&self, path: &str) -> Result<HttpReply> {
        if self.unreachable {
            return Err(MediaError::Unreachable("connection refused".into()));
        }
        Ok(self
            .routes
            .get(path)
            .cloned()
            .unwrap_or_else(|| HttpReply::new(404, "not found")))
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn get(&self, path: &str, _timeout: Duration) -> Result<HttpReply> {
        self.reply(path)
    }

    async fn post_json(&self, path: &str, body: &Value, timeout: Duration) -> Result<HttpReply> {
        self.posted
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone(), timeout));
        self.reply(path)
    }
}

fn client(server: Arc<FakeServer>) -> SglangClient {
    SglangClient::with_transport(ClientConfig::default(), server)
}

#[tokio::test]
async fn image_generation_writes_decoded_png() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("test_output.png");
    let server = Arc::new(FakeServer::default().route(
        "/v1/images/generations",
        200,
        json!({"data": [{"b64_json": STANDARD.encode(PNG_BYTES)}]}).to_string(),
    ));

    let request = ImageGenerationRequest::new("p").with_model("m");
    let path = client(server.clone())
        .image()
        .text_to_image(&request, &output)
        .await
        .unwrap();

    assert_eq!(path, output);
    assert_eq!(std::fs::read(&output).unwrap(), PNG_BYTES);

    let posted = server.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, "/v1/images/generations");
    assert_eq!(
        posted[0].1,
        json!({"model":"m","prompt":"p","size":"1024x1024","n":1,"response_format":"b64_json"})
    );
    assert_eq!(posted[0].2, Duration::from_secs(600));
}

#[tokio::test]
async fn video_data_url_is_stripped_before_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output_t2v.mp4");
    let server = Arc::new(FakeServer::default().route(
        "/v1/video/generations",
        200,
        r#"{"data":[{"video":"data:video/mp4;base64,AAAA"}]}"#,
    ));

    client(server)
        .video()
        .text_to_video("a cat", &VideoParams::default(), &output)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), vec![0u8, 0, 0]);
}

#[tokio::test]
async fn existing_output_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("clip.mp4");
    std::fs::write(&output, b"stale contents that are longer").unwrap();
    let server = Arc::new(FakeServer::default().route(
        "/v1/video/generations",
        200,
        json!({"data": [{"video": STANDARD.encode(b"fresh")}]}).to_string(),
    ));

    let request = GenerationRequest::new("Wan2.2-T2V").with_prompt("x");
    client(server).video().generate(&request, &output).await.unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), b"fresh");
}

#[tokio::test]
async fn http_error_surfaces_status_and_body_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");
    let server = Arc::new(FakeServer::default().route(
        "/v1/images/generations",
        500,
        "CUDA out of memory",
    ));

    let err = client(server)
        .image()
        .text_to_image(&ImageGenerationRequest::new("p"), &output)
        .await
        .unwrap_err();

    match err {
        MediaError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "CUDA out of memory");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn missing_media_field_is_a_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");
    let server = Arc::new(FakeServer::default().route(
        "/v1/video/generations",
        200,
        r#"{"data":[{"url":"https://example.invalid/video.mp4"}]}"#,
    ));

    let err = client(server)
        .video()
        .text_to_video("x", &VideoParams::default(), &output)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::UnexpectedResponse(_)));
    assert!(!output.exists());
}

#[tokio::test]
async fn image_to_video_sends_png_data_url() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("input.png");
    std::fs::write(&image, PNG_BYTES).unwrap();
    let output = dir.path().join("output_i2v.mp4");
    let server = Arc::new(FakeServer::default().route(
        "/v1/video/generations",
        200,
        json!({"data": [{"video": STANDARD.encode(b"mp4")}]}).to_string(),
    ));

    client(server.clone())
        .video()
        .image_to_video(&image, "", &VideoParams::default(), &output)
        .await
        .unwrap();

    let posted = server.posted.lock().unwrap();
    let body = &posted[0].1;
    assert_eq!(body["model"], "Wan2.2-I2V");
    assert_eq!(
        body["image"],
        format!("data:image/png;base64,{}", STANDARD.encode(PNG_BYTES))
    );
    assert_eq!(body["prompt"], "");
    assert!(body.get("size").is_none());
    assert_eq!(std::fs::read(&output).unwrap(), b"mp4");
}

#[tokio::test]
async fn demo_stops_when_server_is_down() {
    let server = Arc::new(FakeServer {
        unreachable: true,
        ..Default::default()
    });

    let outcome = run_video_demo(&client(server.clone()), &DemoOptions::default()).await;

    assert_eq!(outcome, DemoOutcome::ServerUnavailable);
    assert!(server.posted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn demo_catches_generation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(
        FakeServer::default()
            .route("/health", 200, "")
            .route("/v1/models", 200, r#"{"data":[{"id":"Wan2.2-T2V"}]}"#)
            .route("/v1/video/generations", 503, "model still loading"),
    );
    let options = DemoOptions {
        output_path: dir.path().join("cat_walking.mp4"),
        ..Default::default()
    };

    let outcome = run_video_demo(&client(server), &options).await;

    assert_eq!(
        outcome,
        DemoOutcome::Completed {
            generated: vec![],
            failures: 1
        }
    );
    assert!(!options.output_path.exists());
}

#[tokio::test]
async fn demo_runs_text_and_image_generation() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cat.jpg");
    std::fs::write(&image, b"jpeg").unwrap();
    let server = Arc::new(
        FakeServer::default()
            .route("/health", 200, "")
            .route("/v1/models", 200, r#"{"data":[]}"#)
            .route(
                "/v1/video/generations",
                200,
                json!({"data": [{"video": STANDARD.encode(b"clip")}]}).to_string(),
            ),
    );
    let options = DemoOptions {
        output_path: dir.path().join("cat_walking.mp4"),
        i2v_image: Some(image),
        i2v_output_path: dir.path().join("output_i2v.mp4"),
        ..Default::default()
    };

    let outcome = run_video_demo(&client(server.clone()), &options).await;

    assert_eq!(
        outcome,
        DemoOutcome::Completed {
            generated: vec![options.output_path.clone(), options.i2v_output_path.clone()],
            failures: 0
        }
    );
    let posted = server.posted.lock().unwrap();
    assert_eq!(posted[0].1["prompt"], sglang_media::demo::DEFAULT_VIDEO_PROMPT);
    assert!(posted[1].1["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}
