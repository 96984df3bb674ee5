//! Firebase token verifier tests against a local JWKS endpoint.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use serial_test::serial;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobboard_api::{AuthUser, FirebaseConfig, JwksCache, TokenVerifier, VerifyError};

const PROJECT_ID: &str = "jobs-demo";

/// Public half of `fixtures/signing_key.pem`.
const MODULUS: &str = "rI_q_BcwDkRrbanmb_L6qCZspkz479-2Dt1ZcPQQsygTONS6ZihggfgHqcR-aLRuLMGh7_ZjoP2-Vy2nv1iXpJElooHIthDmacZxpT0S94n7xPZm5CZY1UnywAtcAnvkwwAH7fu-GIEkoYLdxraGybKwOqKG2argWBd4A2x_GHE-Wke43l-AHfAMkUV47qyO1-5mxmWTVvgvR0dGDCBBAz6zG_gFIq50Henh8EBjdpdLr2xGEJ5HPAwFyt80zE_4uA-a7cSJzGnVknK8BI1scntlp4TalMnBPOrOcKqWOAms5iTpx8Jkjwnfa4ybzU2t5i2VSjfKZ0O63Arf0tDP9w";

const SIGNING_KEY_PEM: &[u8] = include_bytes!("fixtures/signing_key.pem");

fn jwks() -> Value {
    json!({
        "keys": [
            { "kid": "key-1", "kty": "RSA", "alg": "RS256", "use": "sig", "n": MODULUS, "e": "AQAB" },
            { "kid": "ec-key", "kty": "EC", "crv": "P-256", "x": "abc", "y": "def" }
        ]
    })
}

/// Key set published before `key-1` was rotated in.
fn jwks_without_signing_key() -> Value {
    json!({
        "keys": [
            { "kid": "ec-key", "kty": "EC", "crv": "P-256", "x": "abc", "y": "def" }
        ]
    })
}

fn config(server: &MockServer) -> FirebaseConfig {
    FirebaseConfig {
        project_id: PROJECT_ID.to_string(),
        jwks_url: format!("{}/jwks", server.uri()),
        cache_ttl: Duration::from_secs(3600),
        min_refresh_interval: Duration::from_secs(60),
    }
}

fn valid_claims() -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": "uid-1",
        "email": "ann@x.io",
        "name": "Ann",
        "iss": format!("https://securetoken.google.com/{}", PROJECT_ID),
        "aud": PROJECT_ID,
        "iat": now,
        "exp": now + 600,
    })
}

/// RS256 token signed with the fixture key under `key-1`.
fn signed_token(claims: &Value) -> String {
    let header = Header {
        kid: Some("key-1".to_string()),
        ..Header::new(Algorithm::RS256)
    };
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Token with the given header whose signature is not valid for any key.
fn unsigned_token(header: Value) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": "uid-1",
        "email": "ann@x.io",
        "iss": format!("https://securetoken.google.com/{}", PROJECT_ID),
        "aud": PROJECT_ID,
        "iat": now,
        "exp": now + 600,
    });
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"not-a-signature"),
    )
}

async fn jwks_server(expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks()))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_unknown_key_refresh_is_rate_limited() {
    // The startup fetch just happened, so an unknown kid does not refetch
    let server = jwks_server(1).await;
    let cache = JwksCache::new(config(&server)).await.unwrap();

    let token = unsigned_token(json!({ "alg": "RS256", "typ": "JWT", "kid": "rotated-key" }));
    let err = cache.verify(&token).await.unwrap_err();
    assert!(matches!(err, VerifyError::UnknownKey(ref kid) if kid == "rotated-key"));
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let server = jwks_server(1).await;
    let cache = JwksCache::new(config(&server)).await.unwrap();

    let token = unsigned_token(json!({ "alg": "RS256", "typ": "JWT", "kid": "key-1" }));
    let err = cache.verify(&token).await.unwrap_err();
    assert!(matches!(err, VerifyError::Rejected(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_tokens() {
    let server = jwks_server(1).await;
    let cache = JwksCache::new(config(&server)).await.unwrap();

    let err = cache.verify("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, VerifyError::Malformed(_)));

    // Symmetric algorithms are never accepted
    let token = unsigned_token(json!({ "alg": "HS256", "typ": "JWT", "kid": "key-1" }));
    let err = cache.verify(&token).await.unwrap_err();
    assert!(matches!(err, VerifyError::Malformed(_)));

    let token = unsigned_token(json!({ "alg": "RS256", "typ": "JWT" }));
    let err = cache.verify(&token).await.unwrap_err();
    assert!(matches!(err, VerifyError::Malformed(_)));
}

#[tokio::test]
async fn test_signed_token_yields_user() {
    let server = jwks_server(1).await;
    let cache = JwksCache::new(config(&server)).await.unwrap();

    let user = cache.verify(&signed_token(&valid_claims())).await.unwrap();
    assert_eq!(
        user,
        AuthUser {
            uid: "uid-1".to_string(),
            email: Some("ann@x.io".to_string()),
            name: Some("Ann".to_string()),
        }
    );
}

#[tokio::test]
async fn test_signed_token_claim_checks() {
    let server = jwks_server(1).await;
    let cache = JwksCache::new(config(&server)).await.unwrap();
    let now = chrono::Utc::now().timestamp();

    let mut wrong_audience = valid_claims();
    wrong_audience["aud"] = json!("other-project");

    let mut wrong_issuer = valid_claims();
    wrong_issuer["iss"] = json!("https://securetoken.google.com/other-project");

    let mut expired = valid_claims();
    expired["iat"] = json!(now - 7200);
    expired["exp"] = json!(now - 3600);

    let mut no_subject = valid_claims();
    no_subject["sub"] = json!("");

    for (case, claims) in [
        ("audience", wrong_audience),
        ("issuer", wrong_issuer),
        ("expired", expired),
        ("subject", no_subject),
    ] {
        let err = cache.verify(&signed_token(&claims)).await.unwrap_err();
        assert!(matches!(err, VerifyError::Rejected(_)), "{case}: got {:?}", err);
    }
}

#[tokio::test]
async fn test_unknown_key_refetched_after_min_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_without_signing_key()))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.min_refresh_interval = Duration::from_secs(1);
    let cache = JwksCache::new(config).await.unwrap();
    let token = signed_token(&valid_claims());

    // Keys were just fetched, so the rotated key is not looked up yet
    let err = cache.verify(&token).await.unwrap_err();
    assert!(matches!(err, VerifyError::UnknownKey(ref kid) if kid == "key-1"));

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let user = cache.verify(&token).await.unwrap();
    assert_eq!(user.uid, "uid-1");
}

#[tokio::test]
async fn test_startup_fails_when_jwks_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = JwksCache::new(config(&server)).await;
    assert!(matches!(result, Err(VerifyError::KeyFetch(_))));
}

fn clear_firebase_env() {
    for key in ["FIREBASE_PROJECT_ID", "FIREBASE_SERVICE_KEY", "FIREBASE_JWKS_URL"] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_firebase_config_from_env() {
    clear_firebase_env();
    assert!(matches!(FirebaseConfig::from_env(), Err(VerifyError::Config(_))));

    let service_key = base64::engine::general_purpose::STANDARD
        .encode(r#"{"type":"service_account","project_id":"from-key"}"#);
    std::env::set_var("FIREBASE_SERVICE_KEY", service_key);
    let config = FirebaseConfig::from_env().unwrap();
    assert_eq!(config.project_id, "from-key");
    assert!(config.jwks_url.starts_with("https://www.googleapis.com/"));

    std::env::set_var("FIREBASE_PROJECT_ID", "explicit");
    std::env::set_var("FIREBASE_JWKS_URL", "http://localhost:9099/jwks");
    let config = FirebaseConfig::from_env().unwrap();
    assert_eq!(config.project_id, "explicit");
    assert_eq!(config.jwks_url, "http://localhost:9099/jwks");

    clear_firebase_env();
}
