use std::time::Duration;

use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::utils::token_blacklist::TokenBlacklist;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub token_blacklist: TokenBlacklist,
}

pub async fn init_app_state() -> AppState {
    let jwt_config = JwtConfig::from_env();
    let token_blacklist =
        TokenBlacklist::new(Duration::from_secs(jwt_config.blacklist_retention.max(0) as u64));

    AppState {
        db: init_db_pool().await,
        jwt_config,
        cors_config: CorsConfig::from_env(),
        token_blacklist,
    }
}
