use std::sync::Arc;
use chrono::{Duration, Utc};
use log::info;
use crate::auth::model::{LoginResponse, LoginUser, RegisterPayload, StatusMessage, TokenPair};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{random_token, token_digest};
use crate::core::AppState;
use crate::email::templates;
use crate::errors::AppError;
use crate::users::model::{NewUser, UserRole, UserStatus};

const VERIFICATION_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;
const REFRESH_TOKEN_BYTES: usize = 64;

pub struct AuthService;

impl AuthService {

    /// Registers a new account and mails the verification link. Registering
    /// an email that exists but was never verified overwrites that account's
    /// data and re-sends the link; a verified account is a conflict.
    pub async fn register(state: Arc<AppState>, payload: RegisterPayload) -> Result<StatusMessage, AppError> {
        let password_hash = hash_password(&payload.password)?;

        let user = match state.user_repository.find_by_email(&payload.email).await? {
            Some(existing) => {
                if existing.email_verified {
                    return Err(AppError::Conflict("Email already exists and is verified.".to_string()));
                }
                state.user_repository
                    .overwrite_registration(existing.meta.id, &payload.name, &password_hash, &payload.phone)
                    .await?
            }
            None => {
                let new_user = NewUser {
                    name: payload.name,
                    email: payload.email,
                    password_hash,
                    role: UserRole::User,
                    status: UserStatus::Pending,
                    email_verified: false,
                    phone: payload.phone,
                };
                state.user_repository.insert_user(&new_user).await?
            }
        };

        let token = random_token(32);
        let expires = Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS);
        state.user_repository.store_one_time_token(user.meta.id, &token_digest(&token), expires).await?;

        let link = format!("{}/auth/verify-email?token={}", state.env.http.app_url, token);
        state.mailer.send(&user.email, "Verify Your Email", templates::verification_email(&link)).await?;

        info!("Registered user {} (pending verification).", user.meta.id);
        Ok(StatusMessage::new("User registered successfully, please check your email for verification."))
    }

    pub async fn login(state: Arc<AppState>, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = state.user_repository.find_by_email(email).await?.ok_or_else(|| {
            AppError::Unauthorized("Invalid credentials.".to_string())
        })?;

        if !user.email_verified {
            return Err(AppError::Unauthorized("Please verify your email first.".to_string()));
        }
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials.".to_string()));
        }

        let access_token = state.tokens.issue(user.meta.id, &user.email, user.role)?;
        // A single refresh value is active per user, issuing replaces the old one.
        let refresh_token = random_token(REFRESH_TOKEN_BYTES);
        state.user_repository.update_refresh_token(user.meta.id, &refresh_token).await?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: LoginUser {
                id: user.meta.id,
                email: user.email,
                name: user.name,
                role: user.role,
            },
        })
    }

    pub async fn refresh_token(state: Arc<AppState>, old_refresh_token: &str) -> Result<TokenPair, AppError> {
        let user = state.user_repository.find_by_refresh_token(old_refresh_token).await?.ok_or_else(|| {
            AppError::Unauthorized("Invalid refresh token.".to_string())
        })?;

        let access_token = state.tokens.issue(user.meta.id, &user.email, user.role)?;
        let refresh_token = random_token(REFRESH_TOKEN_BYTES);
        state.user_repository.update_refresh_token(user.meta.id, &refresh_token).await?;

        Ok(TokenPair { access_token, refresh_token })
    }

    pub async fn verify_email(state: Arc<AppState>, token: &str) -> Result<StatusMessage, AppError> {
        let user = state.user_repository.find_by_token_digest(&token_digest(token)).await?.ok_or_else(|| {
            AppError::ValidationError("Invalid or expired verification token.".to_string())
        })?;

        state.user_repository.mark_email_verified(user.meta.id).await?;
        info!("User {} verified their email.", user.meta.id);
        Ok(StatusMessage::new("Email verified successfully."))
    }

    pub async fn forgot_password(state: Arc<AppState>, email: &str) -> Result<StatusMessage, AppError> {
        let user = state.user_repository.find_by_email(email).await?.ok_or_else(|| {
            AppError::NotFound("User not found.".to_string())
        })?;

        let token = random_token(32);
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);
        state.user_repository.store_one_time_token(user.meta.id, &token_digest(&token), expires).await?;

        let link = format!("{}/auth/reset-password?token={}", state.env.http.app_url, token);
        state.mailer.send(&user.email, "Reset Your Password", templates::password_reset_email(&link)).await?;

        Ok(StatusMessage::new("Password reset email sent."))
    }

    pub async fn reset_password(state: Arc<AppState>, token: &str, new_password: &str) -> Result<StatusMessage, AppError> {
        let user = state.user_repository.find_by_token_digest(&token_digest(token)).await?.ok_or_else(|| {
            AppError::ValidationError("Invalid or expired reset token.".to_string())
        })?;

        let password_hash = hash_password(new_password)?;
        state.user_repository.update_password(user.meta.id, &password_hash).await?;
        info!("User {} reset their password.", user.meta.id);
        Ok(StatusMessage::new("Password reset successfully."))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use crate::core::test_support::test_state;
    use crate::email::Mailer;

    /// Captures the last mail instead of sending it, so tests can follow the
    /// embedded link like a user would.
    #[derive(Default)]
    struct RecordingMailer {
        last_html: Mutex<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, _to: &str, _subject: &str, html: String) -> Result<(), AppError> {
            *self.last_html.lock().unwrap() = html;
            Ok(())
        }
    }

    impl RecordingMailer {
        fn last_token(&self) -> String {
            let html = self.last_html.lock().unwrap();
            let start = html.find("token=").expect("no token link in mail") + "token=".len();
            html[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect()
        }
    }

    async fn state_with_mailbox() -> (Arc<AppState>, Arc<RecordingMailer>) {
        let mut state = test_state().await;
        let mailer = Arc::new(RecordingMailer::default());
        Arc::get_mut(&mut state).unwrap().mailer = mailer.clone();
        (state, mailer)
    }

    fn register_payload(email: &str) -> RegisterPayload {
        RegisterPayload {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn login_requires_a_verified_email() {
        let (state, mailbox) = state_with_mailbox().await;

        AuthService::register(state.clone(), register_payload("alice@example.org")).await.unwrap();
        let early = AuthService::login(state.clone(), "alice@example.org", "correct horse").await;
        assert!(matches!(early, Err(AppError::Unauthorized(_))));

        AuthService::verify_email(state.clone(), &mailbox.last_token()).await.unwrap();
        let login = AuthService::login(state.clone(), "alice@example.org", "correct horse").await.unwrap();
        assert_eq!(login.user.email, "alice@example.org");
        assert!(!login.access_token.is_empty());

        let wrong = AuthService::login(state, "alice@example.org", "wrong password").await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn verification_tokens_are_single_use() {
        let (state, mailbox) = state_with_mailbox().await;

        AuthService::register(state.clone(), register_payload("alice@example.org")).await.unwrap();
        let token = mailbox.last_token();
        AuthService::verify_email(state.clone(), &token).await.unwrap();

        let replay = AuthService::verify_email(state, &token).await;
        assert!(matches!(replay, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn reregistering_unverified_overwrites_verified_conflicts() {
        let (state, mailbox) = state_with_mailbox().await;

        AuthService::register(state.clone(), register_payload("alice@example.org")).await.unwrap();
        // never verified, so the second registration wins
        let mut second = register_payload("alice@example.org");
        second.password = "another password".to_string();
        AuthService::register(state.clone(), second).await.unwrap();

        AuthService::verify_email(state.clone(), &mailbox.last_token()).await.unwrap();
        AuthService::login(state.clone(), "alice@example.org", "another password").await.unwrap();

        let conflict = AuthService::register(state, register_payload("alice@example.org")).await;
        assert!(matches!(conflict, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn refresh_rotates_the_token() {
        let (state, mailbox) = state_with_mailbox().await;

        AuthService::register(state.clone(), register_payload("alice@example.org")).await.unwrap();
        AuthService::verify_email(state.clone(), &mailbox.last_token()).await.unwrap();
        let login = AuthService::login(state.clone(), "alice@example.org", "correct horse").await.unwrap();

        let pair = AuthService::refresh_token(state.clone(), &login.refresh_token).await.unwrap();
        assert_ne!(pair.refresh_token, login.refresh_token);

        // the old value is dead after rotation
        let stale = AuthService::refresh_token(state, &login.refresh_token).await;
        assert!(matches!(stale, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let (state, mailbox) = state_with_mailbox().await;

        AuthService::register(state.clone(), register_payload("alice@example.org")).await.unwrap();
        AuthService::verify_email(state.clone(), &mailbox.last_token()).await.unwrap();

        let unknown = AuthService::forgot_password(state.clone(), "nobody@example.org").await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        AuthService::forgot_password(state.clone(), "alice@example.org").await.unwrap();
        AuthService::reset_password(state.clone(), &mailbox.last_token(), "a new password").await.unwrap();

        AuthService::login(state.clone(), "alice@example.org", "a new password").await.unwrap();
        let old = AuthService::login(state, "alice@example.org", "correct horse").await;
        assert!(matches!(old, Err(AppError::Unauthorized(_))));
    }
}
