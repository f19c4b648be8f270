/// End-to-end tests for GoogleVisionClient against a mock Vision endpoint
use cloud_vision::schema::Likelihood;
use cloud_vision::{
    ClientConfig, FeatureRequest, FeatureType, GoogleVisionClient, LandmarkType, Rect,
    VisionError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";
const ANNOTATE_PATH: &str = "/v1/images:annotate";
/// PNG signature followed by a few bytes, enough to stand in for an image
const IMG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01];
/// base64 of `IMG`
const IMG_BASE64: &str = "iVBORw0KGgoAAQ==";

const FACE_RESPONSE: &str = include_str!("fixtures/face_response.json");
const FULL_RESPONSE: &str = include_str!("fixtures/full_response.json");

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn setup_client(server: &MockServer, features: Vec<FeatureRequest>) -> GoogleVisionClient {
    let config = ClientConfig::new(API_KEY)
        .with_endpoint_base(format!("{}{}?key=", server.uri(), ANNOTATE_PATH))
        .with_features(features);
    GoogleVisionClient::new(config).expect("should build client")
}

fn annotate_mock(template: ResponseTemplate) -> Mock {
    Mock::given(method("POST"))
        .and(path(ANNOTATE_PATH))
        .and(query_param("key", API_KEY))
        .and(header("content-type", "application/json"))
        .respond_with(template)
}

fn json_body(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json")
}

async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|r| serde_json::from_slice(&r.body).expect("request body is JSON"))
        .collect()
}

// ==================== Request / response flow ====================

#[tokio::test]
async fn test_face_detection_end_to_end() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );

    let response = assert_ok!(client.analyze(IMG).await);

    assert_eq!(response.face_annotations.len(), 1);
    assert_eq!(
        response.face_rects(),
        vec![Rect {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 40.0
        }]
    );

    let bodies = received_bodies(&server).await;
    assert_eq!(
        bodies,
        vec![json!({
            "requests": [{
                "image": {"content": IMG_BASE64},
                "features": [{"type": "FACE_DETECTION", "maxResults": 10}]
            }]
        })]
    );
}

#[tokio::test]
async fn test_face_annotation_fields_decoded() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE)).mount(&server).await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );
    let response = assert_ok!(client.analyze(IMG).await);
    let face = &response.face_annotations[0];

    let head = face.bounding_poly.as_ref().and_then(|p| p.to_rect()).unwrap();
    assert_eq!((head.x, head.y, head.width, head.height), (2.0, 1.0, 66.0, 61.0));
    assert!(approx(face.roll_angle, 1.5));
    assert!(approx(face.pan_angle, -3.25));
    assert!(approx(face.tilt_angle, 0.5));
    assert!(approx(face.detection_confidence, 0.98));
    assert!(approx(face.landmarking_confidence, 0.71));
    assert_eq!(face.joy_likelihood, Likelihood::VeryLikely);
    assert_eq!(face.sorrow_likelihood, Likelihood::VeryUnlikely);
    assert_eq!(face.surprise_likelihood, Likelihood::Unlikely);
    assert_eq!(face.blurred_likelihood, Likelihood::Possible);

    assert_eq!(face.landmarks.len(), 3);
    let nose = face.landmark(&LandmarkType::NoseTip).unwrap();
    let v = nose.position.to_vector();
    assert!(approx(v.x, 35.0) && approx(v.y, 33.2) && approx(v.z, -9.4));
}

#[tokio::test]
async fn test_all_annotation_kinds_decoded() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FULL_RESPONSE)).mount(&server).await;

    let features: Vec<FeatureRequest> = FeatureType::ALL
        .into_iter()
        .map(|f| FeatureRequest::new(f, 5))
        .collect();
    let client = setup_client(&server, features);
    let response = assert_ok!(client.analyze(IMG).await);

    // Every feature went out, in order
    let bodies = received_bodies(&server).await;
    let sent: Vec<&str> = bodies[0]["requests"][0]["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        sent,
        FeatureType::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>()
    );

    // Faces, with an unrecognized likelihood
    let face = &response.face_annotations[0];
    assert_eq!(face.joy_likelihood, Likelihood::Likely);
    assert_eq!(
        face.headwear_likelihood,
        Likelihood::Unrecognized("SOMETIMES".to_string())
    );
    assert_eq!(face.landmarks[0].landmark_type, LandmarkType::ChinGnathion);
    assert_eq!(
        response.face_rects(),
        vec![Rect {
            x: 120.0,
            y: 80.0,
            width: 100.0,
            height: 120.0
        }]
    );

    // Landmarks and logos
    let landmark = &response.landmark_annotations[0];
    assert_eq!(landmark.description, "Eiffel Tower");
    let lat_lng = landmark.locations[0].lat_lng.unwrap();
    assert!((lat_lng.latitude - 48.858461).abs() < 1e-9);
    assert_eq!(
        landmark.bounding_poly.as_ref().and_then(|p| p.to_rect()),
        Some(Rect {
            x: 1.0,
            y: 0.0,
            width: 89.0,
            height: 300.0
        })
    );
    assert_eq!(response.logo_annotations[0].description, "Google");

    // Labels
    let labels: Vec<&str> = response
        .label_annotations
        .iter()
        .map(|l| l.description.as_str())
        .collect();
    assert_eq!(labels, vec!["Person", "Face"]);
    assert_eq!(response.label_annotations[0].mid, "/m/01g317");
    assert!(approx(response.label_annotations[1].topicality, 0.91));

    // Text
    assert_eq!(response.text_annotations[0].locale, "en");
    let full_text = response.full_text_annotation.as_ref().unwrap();
    assert_eq!(full_text.text, "HELLO\nWORLD\n");
    assert_eq!(full_text.pages[0].width, 640);
    assert_eq!(full_text.pages[0].blocks[0].block_type, "TEXT");

    // Objects use normalized vertices
    let object = &response.localized_object_annotations[0];
    assert_eq!(object.name, "Person");
    assert_eq!(object.language_code, "en");
    let poly = object.bounding_poly.as_ref().unwrap();
    assert!(poly.vertices.is_empty());
    let rect = poly.normalized_rect().unwrap();
    assert!(approx(rect.width, 0.5) && approx(rect.height, 0.7));

    // Safe search
    let safe_search = response.safe_search_annotation.as_ref().unwrap();
    assert_eq!(safe_search.adult, Likelihood::VeryUnlikely);
    assert_eq!(safe_search.spoof, Likelihood::Unlikely);
    assert_eq!(safe_search.medical, Likelihood::Possible);
    assert_eq!(safe_search.violence, Likelihood::VeryUnlikely);
    assert_eq!(safe_search.racy, Likelihood::Likely);

    // Image properties
    let colors = &response
        .image_properties_annotation
        .as_ref()
        .unwrap()
        .dominant_colors
        .as_ref()
        .unwrap()
        .colors;
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0].color.red, 201.0);
    assert_eq!(colors[0].color.alpha, None);
    assert_eq!(colors[1].color.alpha, Some(1.0));
    assert!(approx(colors[1].pixel_fraction, 0.35));

    // Crop hints
    let hint = &response.crop_hints_annotation.as_ref().unwrap().crop_hints[0];
    assert!(approx(hint.confidence, 0.8));
    assert!(approx(hint.importance_fraction, 1.01));
    assert_eq!(
        hint.bounding_poly.as_ref().and_then(|p| p.to_rect()),
        Some(Rect {
            x: 30.0,
            y: 0.0,
            width: 580.0,
            height: 479.0
        })
    );

    // Web detection arrives as an object, exposed as a list of one
    assert_eq!(response.web_detection.len(), 1);
    let web = &response.web_detection[0];
    assert_eq!(web.web_entities[0].entity_id, "/m/01g317");
    assert_eq!(web.full_matching_images[0].url, "https://example.com/full.png");
    assert_eq!(web.partial_matching_images.len(), 1);
    assert_eq!(web.visually_similar_images.len(), 1);
    assert_eq!(web.pages_with_matching_images[0].page_title, "Example page");
    assert_eq!(web.best_guess_labels[0].label, "portrait");

    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_missing_annotation_keys_are_absent() {
    let server = MockServer::start().await;
    annotate_mock(json_body(r#"{"responses":[{"labelAnnotations":[]}]}"#))
        .mount(&server)
        .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );
    let response = assert_ok!(client.analyze(IMG).await);

    assert!(response.face_annotations.is_empty());
    assert!(response.face_rects().is_empty());
    assert!(response.crop_hints_annotation.is_none());
    assert!(response.safe_search_annotation.is_none());
    assert!(response.web_detection.is_empty());
}

#[tokio::test]
async fn test_annotate_batch_preserves_order() {
    let server = MockServer::start().await;
    annotate_mock(json_body(
        r#"{"responses":[
            {"labelAnnotations":[{"description":"first"}]},
            {"labelAnnotations":[{"description":"second"}]}
        ]}"#,
    ))
    .mount(&server)
    .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::LabelDetection, 1)],
    );
    let other: &[u8] = b"second image";
    let result = assert_ok!(client.annotate(&[IMG, other]).await);

    let labels: Vec<&str> = result
        .responses
        .iter()
        .map(|r| r.label_annotations[0].description.as_str())
        .collect();
    assert_eq!(labels, vec!["first", "second"]);

    let bodies = received_bodies(&server).await;
    let requests = bodies[0]["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["image"]["content"], IMG_BASE64);
    assert_eq!(requests[1]["image"]["content"], "c2Vjb25kIGltYWdl");
}

#[tokio::test]
async fn test_annotate_response_count_mismatch() {
    let server = MockServer::start().await;
    annotate_mock(json_body(r#"{"responses":[{}]}"#))
        .mount(&server)
        .await;

    let client = setup_client(&server, vec![]);
    let err = assert_err!(client.annotate(&[IMG, IMG]).await);
    assert!(err.is_decode());
}

// ==================== Feature snapshots ====================

#[tokio::test]
async fn test_feature_list_captured_when_called() {
    let server = MockServer::start().await;
    annotate_mock(json_body(r#"{"responses":[{}]}"#))
        .mount(&server)
        .await;

    let face = FeatureRequest::new(FeatureType::FaceDetection, 10);
    let client = setup_client(&server, vec![face]);

    // Not polled yet; mutations after this point must not leak into it
    let pending = client.analyze(IMG);
    client.add_feature(FeatureRequest::new(FeatureType::LabelDetection, 3));
    assert!(client.remove_feature(&face));

    assert_ok!(pending.await);
    assert_ok!(client.analyze(IMG).await);

    let bodies = received_bodies(&server).await;
    assert_eq!(
        bodies[0]["requests"][0]["features"],
        json!([{"type": "FACE_DETECTION", "maxResults": 10}])
    );
    assert_eq!(
        bodies[1]["requests"][0]["features"],
        json!([{"type": "LABEL_DETECTION", "maxResults": 3}])
    );
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE).set_delay(Duration::from_millis(50)))
        .expect(2)
        .mount(&server)
        .await;

    let client = Arc::new(setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    ));

    let first = tokio::spawn(client.analyze(IMG));
    let second = tokio::spawn(client.analyze(b"another"));

    let first = assert_ok!(first.await.unwrap());
    let second = assert_ok!(second.await.unwrap());
    assert_eq!(first.face_rects(), second.face_rects());

    let mut contents: Vec<String> = received_bodies(&server)
        .await
        .iter()
        .map(|b| b["requests"][0]["image"]["content"].as_str().unwrap().to_string())
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["YW5vdGhlcg==".to_string(), IMG_BASE64.to_string()]);
}

// ==================== Failures ====================

#[tokio::test]
async fn test_http_403_is_network_error() {
    let server = MockServer::start().await;
    annotate_mock(ResponseTemplate::new(403).set_body_raw(
        r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
        "application/json",
    ))
    .mount(&server)
    .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );
    let err = assert_err!(client.analyze(IMG).await);

    assert!(err.is_network());
    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    annotate_mock(ResponseTemplate::new(200).set_body_string("<html>Service Unavailable</html>"))
        .mount(&server)
        .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );
    let err = assert_err!(client.analyze(IMG).await);

    match err {
        VisionError::Decode { body, .. } => {
            assert_eq!(body, "<html>Service Unavailable</html>")
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_envelope_shape_is_decode_error() {
    let server = MockServer::start().await;
    annotate_mock(json_body(r#"{"responses":{"faceAnnotations":[]}}"#))
        .mount(&server)
        .await;

    let client = setup_client(&server, vec![]);
    let err = assert_err!(client.analyze(IMG).await);
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_empty_responses_is_decode_error() {
    let server = MockServer::start().await;
    annotate_mock(json_body(r#"{"responses":[]}"#))
        .mount(&server)
        .await;

    let client = setup_client(&server, vec![]);
    let err = assert_err!(client.analyze(IMG).await);
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_per_image_error_is_api_error() {
    let server = MockServer::start().await;
    annotate_mock(json_body(
        r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#,
    ))
    .mount(&server)
    .await;

    let client = setup_client(&server, vec![]);
    let err = assert_err!(client.analyze(IMG).await);
    assert!(matches!(err, VisionError::Api { code: 3, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop a listener so nothing accepts on the port
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = ClientConfig::new(API_KEY)
        .with_endpoint_base(format!("http://{}{}?key=", addr, ANNOTATE_PATH));
    let client = GoogleVisionClient::new(config).unwrap();

    let err = assert_err!(client.analyze(IMG).await);
    assert!(err.is_network());
    assert_eq!(err.status(), None);
    // The API key never appears in errors
    assert!(!format!("{err:?}").contains(API_KEY));
}

// ==================== Timeouts and cancellation ====================

#[tokio::test]
async fn test_explicit_timeout() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );
    let err = assert_err!(
        client
            .analyze_with_timeout(IMG, Duration::from_millis(100))
            .await
    );

    assert!(err.is_timeout());
    assert!(matches!(err, VisionError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_configured_default_timeout() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ClientConfig::new(API_KEY)
        .with_endpoint_base(format!("{}{}?key=", server.uri(), ANNOTATE_PATH))
        .with_timeout(Duration::from_millis(100));
    let client = GoogleVisionClient::new(config).unwrap();

    let err = assert_err!(client.analyze(IMG).await);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_spawn_analyze_invokes_callback() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE)).mount(&server).await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );

    let (tx, rx) = tokio::sync::oneshot::channel();
    let handle = client.spawn_analyze(IMG, move |result| {
        let _ = tx.send(result.map(|r| r.face_rects()));
    });

    let rects = assert_ok!(rx.await.expect("callback invoked"));
    assert_eq!(rects.len(), 1);
    handle.wait().await;
}

#[tokio::test]
async fn test_cancelled_analysis_never_completes() {
    let server = MockServer::start().await;
    annotate_mock(json_body(FACE_RESPONSE).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = setup_client(
        &server,
        vec![FeatureRequest::new(FeatureType::FaceDetection, 10)],
    );

    let invoked = Arc::new(AtomicBool::new(false));
    let flag = invoked.clone();
    let handle = client.spawn_analyze(IMG, move |_result| {
        flag.store(true, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    handle.cancel();
    assert!(handle.is_cancelled());

    // Outlive the mock's delay; the callback must stay silent
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(handle.is_finished());
    handle.wait().await;
    assert!(!invoked.load(Ordering::SeqCst));
}
