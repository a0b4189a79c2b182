use langcenter::config::jwt::JwtConfig;
use langcenter::utils::jwt::{create_access_token, verify_token};
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
        blacklist_retention: 604800,
    }
}

#[test]
fn test_create_access_token_success() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let result = create_access_token(user_id, "test@example.com", Some("student"), &jwt_config);

    assert!(result.is_ok());
    let token = result.unwrap();
    assert!(!token.is_empty());
}

#[test]
fn test_verify_token_success() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();
    let email = "test@example.com";

    let token = create_access_token(user_id, email, Some("teacher"), &jwt_config).unwrap();
    let result = verify_token(&token, &jwt_config);

    assert!(result.is_ok());
    let claims = result.unwrap();
    assert_eq!(claims.email, email);
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role.as_deref(), Some("teacher"));
}

#[test]
fn test_verify_token_wrong_secret_fails() {
    let jwt_config = get_test_jwt_config();
    let other_config = JwtConfig {
        secret: "a_completely_different_secret".to_string(),
        ..get_test_jwt_config()
    };

    let token =
        create_access_token(Uuid::new_v4(), "test@example.com", None, &jwt_config).unwrap();

    assert!(verify_token(&token, &other_config).is_err());
}

#[test]
fn test_verify_garbage_token_fails() {
    let jwt_config = get_test_jwt_config();

    assert!(verify_token("not-a-jwt", &jwt_config).is_err());
}

#[test]
fn test_roleless_user_gets_no_role_claim() {
    let jwt_config = get_test_jwt_config();

    let token =
        create_access_token(Uuid::new_v4(), "test@example.com", None, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert!(claims.role.is_none());
}

#[test]
fn test_each_token_gets_unique_jti() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let first = create_access_token(user_id, "test@example.com", None, &jwt_config).unwrap();
    let second = create_access_token(user_id, "test@example.com", None, &jwt_config).unwrap();

    let first_claims = verify_token(&first, &jwt_config).unwrap();
    let second_claims = verify_token(&second, &jwt_config).unwrap();

    assert_ne!(first_claims.jti, second_claims.jti);
}

#[test]
fn test_expiry_reflects_config() {
    let jwt_config = get_test_jwt_config();

    let token =
        create_access_token(Uuid::new_v4(), "test@example.com", None, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.exp - claims.iat, 3600);
}
