//! HTTP tests for the OTP routes
//!
//! The app is wired with the in-memory repositories, a fixed clock and a
//! static code generator, so every response is deterministic.

use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Span;

use otp_api::{create_app, AppState};
use otp_core::domain::entities::{OtpRecord, UserKey};
use otp_core::errors::DomainResult;
use otp_core::repositories::{MockIdentityRepository, MockOtpLedgerRepository, OtpLedgerRepository};
use otp_core::services::{FixedClock, OtpService, OtpServiceConfig, StaticOtpGenerator};
use otp_shared::config::ServerConfig;

const USER_ID: &str = "3f0c1b8e-8a57-4a53-9d43-0c3f7e1d2a6b";
const CODE: &str = "04817";

type TestState = AppState<MockIdentityRepository, MockOtpLedgerRepository, StaticOtpGenerator>;

struct Fixture {
    clock: Arc<FixedClock>,
    identities: Arc<MockIdentityRepository>,
    ledger: Arc<MockOtpLedgerRepository>,
    state: web::Data<TestState>,
}

async fn fixture_with(generator: StaticOtpGenerator) -> Fixture {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    let identities = Arc::new(MockIdentityRepository::new());
    identities.insert(USER_ID, UserKey::new(1)).await;
    let ledger = Arc::new(MockOtpLedgerRepository::new(clock.clone()));

    let service = OtpService::new(
        identities.clone(),
        ledger.clone(),
        Arc::new(generator),
        OtpServiceConfig::default(),
        Span::none(),
    );
    let state = web::Data::new(AppState::new(Arc::new(service), &ServerConfig::default()));

    Fixture {
        clock,
        identities,
        ledger,
        state,
    }
}

async fn fixture() -> Fixture {
    fixture_with(StaticOtpGenerator::new(CODE)).await
}

fn request_body() -> Value {
    json!({ "user_id": USER_ID })
}

fn validate_body(otp: &str) -> Value {
    json!({ "user_id": USER_ID, "otp": otp, "request_id": "client-req-1" })
}

#[actix_rt::test]
async fn test_ping_and_health() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!("pong"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "otp-ledger-api");
}

#[actix_rt::test]
async fn test_request_otp_returns_code() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "user_id": USER_ID, "otp": CODE }));
    assert_eq!(fixture.ledger.records().await.len(), 1);
}

#[actix_rt::test]
async fn test_second_request_conflicts_while_active() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let first = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

    fixture.clock.advance(Duration::minutes(1));
    let second = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, second).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "otp_already_active");
    assert_eq!(fixture.ledger.records().await.len(), 1);
}

#[actix_rt::test]
async fn test_unknown_user_is_not_found() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(json!({ "user_id": "00000000-0000-4000-8000-000000000000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "identity_not_found");
}

#[actix_rt::test]
async fn test_malformed_user_id_is_bad_request() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(json!({ "user_id": "not-a-uuid" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
    assert!(fixture.ledger.records().await.is_empty());
}

#[actix_rt::test]
async fn test_non_hyphenated_user_id_is_bad_request() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(json!({ "user_id": format!("{{{}}}", USER_ID) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_rt::test]
async fn test_malformed_json_is_bad_request() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"user_id\":")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_rt::test]
async fn test_validate_consumes_code_once() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/otp/validate")
        .set_json(validate_body(CODE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], USER_ID);
    assert_eq!(body["message"], "OTP validated successfully.");

    let req = test::TestRequest::post()
        .uri("/otp/validate")
        .set_json(validate_body(CODE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_otp");
}

#[actix_rt::test]
async fn test_validate_wrong_code_is_invalid() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/otp/validate")
        .set_json(validate_body("99999"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_otp");
}

#[actix_rt::test]
async fn test_validate_after_expiry_is_expired() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    fixture.clock.advance(Duration::minutes(6));
    let req = test::TestRequest::post()
        .uri("/otp/validate")
        .set_json(validate_body(CODE))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "otp_expired");
}

#[actix_rt::test]
async fn test_generation_failure_is_unavailable() {
    let fixture = fixture_with(StaticOtpGenerator::failing()).await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "otp_generation_failed");
    assert!(fixture.ledger.records().await.is_empty());
}

#[actix_rt::test]
async fn test_store_failure_is_internal_error() {
    let fixture = fixture().await;
    fixture.ledger.set_should_fail(true);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal_error");
}

#[actix_rt::test]
async fn test_identity_store_failure_is_internal_error() {
    let fixture = fixture().await;
    fixture.identities.set_should_fail(true);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/validate")
        .set_json(validate_body(CODE))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn test_request_id_is_echoed() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .insert_header(("x-request-id", "req-abc-123"))
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-abc-123");
    let records = fixture.ledger.records().await;
    assert_eq!(records[0].request_id, "req-abc-123");
}

#[actix_rt::test]
async fn test_request_id_is_generated_when_missing() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(json!({ "user_id": "00000000-0000-4000-8000-000000000000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert!(uuid::Uuid::parse_str(&header).is_ok());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["request_id"], header);
}

#[actix_rt::test]
async fn test_unknown_route_is_not_found() {
    let fixture = fixture().await;
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

// Ledger that outlives the request deadline before delegating
struct SlowLedger {
    inner: MockOtpLedgerRepository,
    delay: std::time::Duration,
}

#[async_trait]
impl OtpLedgerRepository for SlowLedger {
    async fn issue_or_reject(
        &self,
        user_key: UserKey,
        code: &str,
        request_id: &str,
    ) -> DomainResult<OtpRecord> {
        tokio::time::sleep(self.delay).await;
        self.inner.issue_or_reject(user_key, code, request_id).await
    }

    async fn consume(&self, user_key: UserKey, code: &str) -> DomainResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.consume(user_key, code).await
    }
}

#[actix_rt::test]
async fn test_elapsed_deadline_is_internal_error() {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    let identities = Arc::new(MockIdentityRepository::new());
    identities.insert(USER_ID, UserKey::new(1)).await;
    let ledger = Arc::new(SlowLedger {
        inner: MockOtpLedgerRepository::new(clock),
        delay: std::time::Duration::from_secs(3),
    });

    let service = OtpService::new(
        identities,
        ledger.clone(),
        Arc::new(StaticOtpGenerator::new(CODE)),
        OtpServiceConfig::default(),
        Span::none(),
    );
    let server = ServerConfig {
        request_timeout: 1,
        ..ServerConfig::default()
    };
    let state = web::Data::new(AppState::new(Arc::new(service), &server));
    let app = test::init_service(create_app(state)).await;

    let started = std::time::Instant::now();
    let req = test::TestRequest::post()
        .uri("/otp/request")
        .set_json(request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(started.elapsed() < std::time::Duration::from_secs(3));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal_error");
    assert!(ledger.inner.records().await.is_empty());
}
