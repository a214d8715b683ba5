use anyhow::Result;
use async_trait::async_trait;

/// Where bearer credentials and the stable user id come from. The core never
/// authenticates by itself; the surrounding shell plugs in its auth flow (or
/// a test double) here. Either method failing, or yielding an empty string,
/// blocks invocation before any network I/O.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
    async fn user_id(&self) -> Result<String>;
}

/// Fixed credentials, for tests and one-off tooling.
pub struct StaticIdentity {
    token: String,
    user_id: String,
}

impl StaticIdentity {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn user_id(&self) -> Result<String> {
        Ok(self.user_id.clone())
    }
}
