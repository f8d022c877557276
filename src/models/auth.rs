// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::SchemaName;

/// Papel do usuário dentro do tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Cashier,
    Storekeeper,
}

// Linha do registro compartilhado (public.tenant_users). É a fonte
// autoritativa de login; a cópia em <schema>.users é projeção derivada.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub full_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Registro de um novo tenant (negócio + usuário admin inicial)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantPayload {
    #[validate(length(min = 2, message = "O nome do negócio é obrigatório."))]
    pub business_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub phone: Option<String>,

    #[validate(length(min = 3, message = "O nome de usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 2, message = "O nome completo é obrigatório."))]
    pub full_name: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login: o username é único por tenant, não globalmente,
// então o login identifica o tenant pelo e-mail do negócio.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail do negócio é inválido."))]
    pub business_email: String,
    #[validate(length(min = 3, message = "O nome de usuário é obrigatório."))]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Identidade resolvida de uma requisição autenticada. Inserida nas
/// extensions pelo middleware de auth; todo handler de tenant lê daqui o
/// esquema a rotear.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub schema: SchemaName,
    pub role: Role,
}

// Estrutura de dados ("claims") dentro do JWT. Carrega a identidade do
// tenant resolvida no login: todo roteamento de esquema parte daqui.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,             // ID do usuário
    pub tenant_id: Uuid,       // ID do tenant
    pub tenant_schema: SchemaName, // Esquema isolado do tenant
    pub role: Role,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
