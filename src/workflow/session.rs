//! 登录会话
//!
//! 把"当前是谁"变成显式传递的 `Principal`，题库操作不读取任何全局状态

use tracing::debug;

use crate::error::{AppResult, AuthError};
use crate::infrastructure::IdentityProvider;
use crate::models::Principal;

pub struct Session<I> {
    identity: I,
}

impl<I: IdentityProvider> Session<I> {
    pub fn new(identity: I) -> Self {
        Self { identity }
    }

    /// 当前登录用户，未登录时报错
    pub fn principal(&self) -> AppResult<Principal> {
        self.identity
            .current_principal()
            .ok_or_else(|| AuthError::NotSignedIn.into())
    }

    /// 已登录则直接返回，否则向身份提供方登录
    pub async fn ensure_signed_in(&self) -> AppResult<Principal> {
        if let Some(principal) = self.identity.current_principal() {
            debug!("复用已登录用户 {}", principal.id);
            return Ok(principal);
        }
        self.identity.sign_in().await
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.identity.sign_out().await
    }
}
