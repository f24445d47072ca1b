use std::sync::Arc;
use log::info;
use crate::auth::password::hash_password;
use crate::core::AppState;
use crate::core::pagination::{Page, PageParams};
use crate::errors::AppError;
use crate::users::model::{CreateUserRequest, NewUser, UpdateUserRequest, UserDto, UserRole, UserStatus};

pub struct UserService;

impl UserService {

    /// Admin-created accounts skip the verification flow and start active.
    pub async fn create_user(state: Arc<AppState>, payload: CreateUserRequest) -> Result<UserDto, AppError> {
        if state.user_repository.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::ValidationError("Email already exists.".to_string()));
        }

        let new_user = NewUser {
            name: payload.name,
            email: payload.email,
            password_hash: hash_password(&payload.password)?,
            role: payload.role.unwrap_or(UserRole::User),
            status: UserStatus::Active,
            email_verified: true,
            phone: payload.phone,
        };
        let user = state.user_repository.insert_user(&new_user).await?;
        info!("Created user {} via the admin directory.", user.meta.id);
        Ok(user.to_dto())
    }

    pub async fn find_all(state: Arc<AppState>, params: PageParams) -> Result<Page<UserDto>, AppError> {
        let (users, total) = tokio::try_join!( //executing 2 queries async
            state.user_repository.select_user_page(params.limit(), params.offset()),
            state.user_repository.count_users()
        )?;
        let items = users.iter().map(|user| user.to_dto()).collect();
        Ok(Page::new(items, total, &params))
    }

    pub async fn find_one(state: Arc<AppState>, id: i64) -> Result<UserDto, AppError> {
        let user = state.user_repository.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User with id {} not found.", id))
        })?;
        Ok(user.to_dto())
    }

    pub async fn update(state: Arc<AppState>, id: i64, patch: UpdateUserRequest) -> Result<UserDto, AppError> {
        let mut user = state.user_repository.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User with id {} not found.", id))
        })?;

        if let Some(email) = &patch.email {
            if *email != user.email && state.user_repository.find_by_email(email).await?.is_some() {
                return Err(AppError::ValidationError("Email already in use.".to_string()));
            }
            user.email = email.clone();
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(status) = patch.status {
            user.status = status;
        }
        if patch.phone.is_some() {
            user.phone = patch.phone;
        }
        if patch.profile_picture.is_some() {
            user.profile_picture = patch.profile_picture;
        }
        if patch.latitude.is_some() {
            user.latitude = patch.latitude;
        }
        if patch.longitude.is_some() {
            user.longitude = patch.longitude;
        }
        if patch.address.is_some() {
            user.address = patch.address;
        }
        if patch.city.is_some() {
            user.city = patch.city;
        }
        if patch.country.is_some() {
            user.country = patch.country;
        }

        let updated = state.user_repository.update_profile(&user).await?;
        Ok(updated.to_dto())
    }

    pub async fn remove(state: Arc<AppState>, id: i64) -> Result<(), AppError> {
        let deleted = state.user_repository.delete_user(id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found.", id)));
        }
        info!("Removed user {}.", id);
        Ok(())
    }

}
