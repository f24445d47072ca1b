/// HTML bodies for the transactional mails. Kept as plain format strings,
/// there is no templating engine worth carrying for two mails.

pub fn verification_email(verification_link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Verify your email</h2>
  <p>Thanks for signing up. Click the button below to verify your email address.</p>
  <p><a href="{link}" style="display: inline-block; padding: 10px 20px; background: #2563eb; color: #fff; text-decoration: none; border-radius: 4px;">Verify Email</a></p>
  <p>Or copy this link into your browser:</p>
  <p>{link}</p>
  <p>The link expires in 24 hours. If you didn't create an account, you can ignore this mail.</p>
</div>"#,
        link = verification_link
    )
}

pub fn password_reset_email(reset_link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Reset your password</h2>
  <p>We received a request to reset your password. Click the button below to choose a new one.</p>
  <p><a href="{link}" style="display: inline-block; padding: 10px 20px; background: #2563eb; color: #fff; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
  <p>Or copy this link into your browser:</p>
  <p>{link}</p>
  <p>The link expires in 1 hour. If you didn't request a reset, you can ignore this mail.</p>
</div>"#,
        link = reset_link
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_embed_the_link() {
        let html = verification_email("https://example.org/verify?token=abc");
        assert!(html.contains("https://example.org/verify?token=abc"));
        let html = password_reset_email("https://example.org/reset?token=abc");
        assert!(html.contains("https://example.org/reset?token=abc"));
    }
}
