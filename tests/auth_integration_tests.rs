use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use product_gate::{
    AppError, AppResult, AuthorizationService, InMemoryRepository, InMemoryRoleRepository,
    ProductService, RequestGate, TokenCodec,
    auth::{Bearer, Claims},
    gate::{Admission, Operation, Requirement},
    models::{Role, SubjectId},
    repository::RoleRepository,
};

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn create_token(user_id: i64) -> String {
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &Claims { user_id }, &key).unwrap()
}

fn codec() -> TokenCodec {
    TokenCodec::new(TEST_JWT_SECRET)
}

fn roles() -> InMemoryRoleRepository {
    InMemoryRoleRepository::new(HashMap::from([
        (SubjectId(1), vec![Role::new("USER")]),
        (SubjectId(3), vec![Role::new("ADMIN"), Role::new("USER")]),
    ]))
}

fn create_gate() -> RequestGate {
    RequestGate::new(
        Arc::new(codec()),
        AuthorizationService::new(Arc::new(roles())),
        ProductService::new(Arc::new(InMemoryRepository::new())),
    )
}

fn bearer(token: &str) -> Bearer {
    Bearer(Some(token.to_string()))
}

/// Role source whose backing store is unreachable.
struct UnavailableRoles;

#[async_trait]
impl RoleRepository for UnavailableRoles {
    async fn roles_for(&self, _subject: SubjectId) -> AppResult<Vec<Role>> {
        Err(AppError::Storage("connection refused".to_string()))
    }
}

// --- Token Codec ---

#[test]
fn test_decode_valid_token_is_deterministic() {
    let codec = codec();
    let token = create_token(42);

    let first = codec.decode(&token);
    let second = codec.decode(&token);

    assert_eq!(first, Ok(SubjectId(42)));
    assert_eq!(first, second);
}

#[test]
fn test_decode_rejects_empty_and_garbage() {
    let codec = codec();

    assert_eq!(codec.decode(""), Err(AppError::InvalidToken));
    assert_eq!(codec.decode("   "), Err(AppError::InvalidToken));
    assert_eq!(codec.decode("not-a-token"), Err(AppError::InvalidToken));
    assert_eq!(codec.decode("a.b.c"), Err(AppError::InvalidToken));
}

#[test]
fn test_decode_rejects_tampered_payload() {
    let codec = codec();
    let genuine = create_token(1);
    let other = create_token(2);

    // Payload of subject 2 under the signature of subject 1.
    let genuine_parts: Vec<&str> = genuine.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", genuine_parts[0], other_parts[1], genuine_parts[2]);

    assert_eq!(codec.decode(&forged), Err(AppError::InvalidToken));
}

#[test]
fn test_decode_rejects_foreign_secret() {
    let key = EncodingKey::from_secret(b"some-other-secret");
    let token = encode(&Header::default(), &Claims { user_id: 1 }, &key).unwrap();

    assert_eq!(codec().decode(&token), Err(AppError::InvalidToken));
}

#[test]
fn test_decode_rejects_other_algorithm() {
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let token = encode(&Header::new(Algorithm::HS512), &Claims { user_id: 1 }, &key).unwrap();

    assert_eq!(codec().decode(&token), Err(AppError::InvalidToken));
}

#[test]
fn test_decode_rejects_token_without_subject_claim() {
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let token = encode(&Header::default(), &serde_json::json!({ "sub": "1" }), &key).unwrap();

    assert_eq!(codec().decode(&token), Err(AppError::InvalidToken));
}

// --- Authorization Service ---

#[tokio::test]
async fn test_roles_for_subject_without_grants_is_empty() {
    let authz = AuthorizationService::new(Arc::new(roles()));

    assert!(authz.roles_for(SubjectId(99)).await.is_empty());
    assert!(!authz.has_role(SubjectId(99), "USER").await);
}

#[tokio::test]
async fn test_has_role_checks_membership() {
    let authz = AuthorizationService::new(Arc::new(roles()));

    assert_eq!(authz.roles_for(SubjectId(3)).await.len(), 2);
    assert!(authz.has_role(SubjectId(3), "ADMIN").await);
    assert!(authz.has_role(SubjectId(1), "USER").await);
    assert!(!authz.has_role(SubjectId(1), "ADMIN").await);
}

#[tokio::test]
async fn test_role_lookup_failure_means_no_roles() {
    let authz = AuthorizationService::new(Arc::new(UnavailableRoles));

    assert!(authz.roles_for(SubjectId(1)).await.is_empty());
    assert!(!authz.has_role(SubjectId(1), "USER").await);
}

// --- Request Gate ---

#[test]
fn test_policy_table() {
    assert_eq!(Operation::List.requirement(), Requirement::Anyone);
    assert_eq!(Operation::Get.requirement(), Requirement::Anyone);
    assert_eq!(Operation::Create.requirement(), Requirement::Role("USER"));
    assert_eq!(Operation::Update.requirement(), Requirement::Authenticated);
    assert_eq!(Operation::Delete.requirement(), Requirement::Authenticated);
}

#[tokio::test]
async fn test_ungated_operations_ignore_the_token() {
    let gate = create_gate();

    for op in [Operation::List, Operation::Get] {
        assert_eq!(gate.admit(op, &Bearer(None)).await, Ok(Admission::Anonymous));
        assert_eq!(gate.admit(op, &bearer("garbage")).await, Ok(Admission::Anonymous));
    }
}

#[tokio::test]
async fn test_gated_operations_reject_missing_and_invalid_tokens() {
    let gate = create_gate();

    for op in [Operation::Create, Operation::Update, Operation::Delete] {
        assert_eq!(gate.admit(op, &Bearer(None)).await, Err(AppError::InvalidToken));
        assert_eq!(gate.admit(op, &bearer("garbage")).await, Err(AppError::InvalidToken));
    }
}

#[tokio::test]
async fn test_create_requires_user_role() {
    let gate = create_gate();

    let granted = gate.admit(Operation::Create, &bearer(&create_token(1))).await;
    assert_eq!(granted, Ok(Admission::Subject(SubjectId(1))));

    let denied = gate.admit(Operation::Create, &bearer(&create_token(2))).await;
    assert_eq!(denied, Err(AppError::Forbidden));
}

#[tokio::test]
async fn test_update_and_delete_accept_any_role() {
    let gate = create_gate();
    let token = create_token(2);

    for op in [Operation::Update, Operation::Delete] {
        assert_eq!(
            gate.admit(op, &bearer(&token)).await,
            Ok(Admission::Subject(SubjectId(2)))
        );
    }
}

#[tokio::test]
async fn test_create_is_forbidden_when_roles_are_unavailable() {
    let gate = RequestGate::new(
        Arc::new(codec()),
        AuthorizationService::new(Arc::new(UnavailableRoles)),
        ProductService::new(Arc::new(InMemoryRepository::new())),
    );
    let token = bearer(&create_token(1));

    assert_eq!(
        gate.admit(Operation::Create, &token).await,
        Err(AppError::Forbidden)
    );
    assert_eq!(
        gate.admit(Operation::Update, &token).await,
        Ok(Admission::Subject(SubjectId(1)))
    );
}

#[test]
fn test_bearer_extraction_from_headers() {
    use axum::http::{HeaderMap, HeaderValue, header};

    let mut headers = HeaderMap::new();
    assert_eq!(Bearer::from_headers(&headers).token(), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(Bearer::from_headers(&headers).token(), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
    assert_eq!(Bearer::from_headers(&headers).token(), Some("abc.def.ghi"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
    assert_eq!(Bearer::from_headers(&headers).token(), Some("abc.def.ghi"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("BEARER  abc.def.ghi "));
    assert_eq!(Bearer::from_headers(&headers).token(), Some("abc.def.ghi"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearerabc.def.ghi"));
    assert_eq!(Bearer::from_headers(&headers).token(), None);
}
