//! 身份提供方 - 基础设施层
//!
//! 只负责"当前是谁"，题库操作需要的 `Principal` 由调用方显式传入。

use std::sync::Mutex;

use tracing::info;

use crate::config::Config;
use crate::error::{AppResult, AuthError};
use crate::models::Principal;

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// 当前登录用户，未登录为 `None`
    fn current_principal(&self) -> Option<Principal>;

    async fn sign_in(&self) -> AppResult<Principal>;

    async fn sign_out(&self) -> AppResult<()>;
}

/// 本地身份：用户信息来自配置
#[derive(Debug)]
pub struct LocalIdentity {
    configured: Option<Principal>,
    current: Mutex<Option<Principal>>,
}

impl LocalIdentity {
    pub fn new(configured: Option<Principal>) -> Self {
        Self {
            configured,
            current: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let configured = config.local_user_id.as_ref().map(|id| {
            Principal::new(
                id.clone(),
                config.local_user_name.clone(),
                config.local_user_email.clone(),
            )
        });
        Self::new(configured)
    }

    fn set_current(&self, principal: Option<Principal>) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = principal;
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_principal(&self) -> Option<Principal> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn sign_in(&self) -> AppResult<Principal> {
        let principal = self
            .configured
            .clone()
            .ok_or_else(|| AuthError::SignInRejected {
                reason: "未配置本地用户 (LOCAL_USER_ID)".to_string(),
            })?;

        info!("✓ 已登录: {}", principal);
        self.set_current(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.set_current(None);
        info!("已退出登录");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn sign_in_and_out() {
        let identity = LocalIdentity::new(Some(Principal::new("u1", "Asha", "asha@example.com")));
        assert!(identity.current_principal().is_none());

        let principal = identity.sign_in().await.unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(identity.current_principal(), Some(principal));

        identity.sign_out().await.unwrap();
        assert!(identity.current_principal().is_none());
    }

    #[tokio::test]
    async fn sign_in_without_configured_user_is_rejected() {
        let identity = LocalIdentity::from_config(&Config::default());
        let err = identity.sign_in().await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::SignInRejected { .. })));
    }
}
