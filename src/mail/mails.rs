use super::sendmail::send_email;
use crate::config::Config;

pub async fn send_otp_email(
    config: &Config,
    to_email: &str,
    otp: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Verification OTP";
    let body = format!("Your OTP is: {}", otp);

    send_email(config, to_email, subject, &body).await
}
