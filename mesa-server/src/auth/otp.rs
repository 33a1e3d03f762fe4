//! One-time code delivery

use async_trait::async_trait;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Delivers one-time codes to users (e-mail, SMS, ...)
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_code(&self, restaurant_slug: &str, email: &str, code: &str)
    -> Result<(), BoxError>;
}

/// Default sender: writes the code to the `otp` log target
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send_code(
        &self,
        restaurant_slug: &str,
        email: &str,
        code: &str,
    ) -> Result<(), BoxError> {
        tracing::info!(
            target: "otp",
            restaurant = %restaurant_slug,
            email = %email,
            code = %code,
            "One-time code issued"
        );
        Ok(())
    }
}
