use std::time::Duration;

use langcenter::utils::token_blacklist::TokenBlacklist;

#[test]
fn test_revoke_and_check() {
    let blacklist = TokenBlacklist::new(Duration::from_secs(3600));

    assert!(!blacklist.is_revoked("token-1"));
    blacklist.revoke("token-1");
    assert!(blacklist.is_revoked("token-1"));
}

#[test]
fn test_unknown_jti_is_not_revoked() {
    let blacklist = TokenBlacklist::new(Duration::from_secs(3600));
    blacklist.revoke("known");

    assert!(!blacklist.is_revoked("unknown"));
}

#[test]
fn test_entry_lapses_after_retention() {
    let blacklist = TokenBlacklist::new(Duration::ZERO);
    blacklist.revoke("short-lived");

    assert!(!blacklist.is_revoked("short-lived"));
}

#[test]
fn test_clones_share_the_store() {
    let blacklist = TokenBlacklist::new(Duration::from_secs(3600));
    let clone = blacklist.clone();

    blacklist.revoke("shared");

    assert!(clone.is_revoked("shared"));
}
