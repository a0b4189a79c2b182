use axum::http::Method;
use langcenter::middleware::permission::PermissionMap;
use langcenter::permissions;

const READ_WRITE_MAP: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_ASSIGNMENTS),
    (Method::POST, permissions::MANAGE_ASSIGNMENTS),
    (Method::PUT, permissions::MANAGE_ASSIGNMENTS),
    (Method::DELETE, permissions::MANAGE_ASSIGNMENTS),
]);

#[test]
fn test_mapped_method_resolves_permission() {
    assert_eq!(
        READ_WRITE_MAP.required(&Method::GET),
        Some(permissions::VIEW_ASSIGNMENTS)
    );
    assert_eq!(
        READ_WRITE_MAP.required(&Method::DELETE),
        Some(permissions::MANAGE_ASSIGNMENTS)
    );
}

#[test]
fn test_unmapped_method_requires_no_permission() {
    // PATCH is not in the table, so the gate only requires authentication.
    assert_eq!(READ_WRITE_MAP.required(&Method::PATCH), None);
    assert_eq!(READ_WRITE_MAP.required(&Method::OPTIONS), None);
}

#[test]
fn test_read_and_write_methods_can_require_different_codes() {
    let map = PermissionMap(&[
        (Method::GET, permissions::VIEW_EXAMS),
        (Method::PATCH, permissions::MANAGE_EXAMS),
    ]);

    assert_ne!(map.required(&Method::GET), map.required(&Method::PATCH));
}

#[test]
fn test_empty_map_never_requires_permission() {
    let map = PermissionMap(&[]);

    assert_eq!(map.required(&Method::GET), None);
    assert_eq!(map.required(&Method::POST), None);
}
