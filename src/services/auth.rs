// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::{SchemaName, TenantRepository, UserRepository},
    models::auth::{Claims, CurrentUser, TenantUser},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tenant_repo: TenantRepository, jwt_secret: String) -> Self {
        Self {
            user_repo,
            tenant_repo,
            jwt_secret,
        }
    }

    /// Login: resolve o tenant pelo e-mail do negócio e o usuário pelo
    /// username DENTRO do tenant (unicidade é por tenant, não global).
    pub async fn login(
        &self,
        business_email: &str,
        username: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let tenant = self
            .tenant_repo
            .find_by_email(business_email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_for_login(tenant.id, username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // bcrypt é pesado: roda fora do event loop
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let schema = SchemaName::new(tenant.schema_name.clone())?;
        self.create_token(&user, &schema)
    }

    /// Resolve um bearer token para a identidade da requisição. O esquema no
    /// claim foi gerado pelo servidor no provisionamento; daqui em diante o
    /// núcleo confia nele para todo o roteamento.
    pub async fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;

        // Token válido mas usuário desativado no registro → rejeita
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)?;

        Ok(CurrentUser {
            id: user.id,
            tenant_id: claims.tenant_id,
            schema: claims.tenant_schema,
            role: user.role,
        })
    }

    pub fn create_token(&self, user: &TenantUser, schema: &SchemaName) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            tenant_id: user.tenant_id,
            tenant_schema: schema.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
