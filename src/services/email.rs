use async_trait::async_trait;

use crate::error::Result;

/// Outbound mail used by registration and code resend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()>;
}

/// Writes verification mail to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        tracing::info!(
            to = %email,
            code = %code,
            "Verification email: use this code to verify your veterinary clinic account"
        );
        Ok(())
    }
}
