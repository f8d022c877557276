use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// A taxonomia segue as classes do domínio: não-encontrado, validação,
// autorização, assinatura e acesso a dados.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Assinatura do tenant inativa")]
    SubscriptionInactive,

    #[error("Tenant não encontrado")]
    TenantNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Compra não encontrada")]
    PurchaseNotFound,

    #[error("Despesa não encontrada")]
    ExpenseNotFound,

    #[error("Plano de assinatura não encontrado")]
    PlanNotFound,

    #[error("Pagamento não encontrado")]
    PaymentNotFound,

    #[error("Estoque insuficiente para o produto '{0}'")]
    InsufficientStock(String),

    #[error("Venda já foi anulada")]
    SaleAlreadyVoided,

    #[error("Pagamento excede o saldo devedor da compra")]
    PaymentExceedsBalance,

    #[error("Nome de usuário '{0}' já existe neste tenant")]
    UsernameAlreadyExists(String),

    #[error("Já existe um negócio registrado com o e-mail '{0}'")]
    EmailAlreadyExists(String),

    #[error("Código de barras '{0}' já cadastrado")]
    BarcodeAlreadyExists(String),

    #[error("Nome de esquema inválido: {0}")]
    InvalidSchemaName(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP correspondente à classe do erro.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InsufficientStock(_)
            | AppError::SaleAlreadyVoided
            | AppError::PaymentExceedsBalance => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::Forbidden(_) => StatusCode::FORBIDDEN,

            AppError::SubscriptionInactive => StatusCode::PAYMENT_REQUIRED,

            AppError::TenantNotFound
            | AppError::UserNotFound
            | AppError::ProductNotFound
            | AppError::CustomerNotFound
            | AppError::SupplierNotFound
            | AppError::SaleNotFound
            | AppError::PurchaseNotFound
            | AppError::ExpenseNotFound
            | AppError::PlanNotFound
            | AppError::PaymentNotFound => StatusCode::NOT_FOUND,

            AppError::UsernameAlreadyExists(_)
            | AppError::EmailAlreadyExists(_)
            | AppError::BarcodeAlreadyExists(_) => StatusCode::CONFLICT,

            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Erros de validação retornam todos os detalhes por campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status_code();

        // Erros internos logam o detalhe e escondem a causa do cliente.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro interno do servidor: {}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nao_encontrado_vira_404() {
        assert_eq!(AppError::ProductNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SaleNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn erros_de_dominio_viram_400() {
        assert_eq!(
            AppError::InsufficientStock("Leite".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PaymentExceedsBalance.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::SaleAlreadyVoided.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn autorizacao_e_assinatura() {
        assert_eq!(
            AppError::Forbidden("só admin".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::SubscriptionInactive.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn conflitos_de_unicidade_viram_409() {
        assert_eq!(
            AppError::UsernameAlreadyExists("maria".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BarcodeAlreadyExists("789".into()).status_code(),
            StatusCode::CONFLICT
        );
    }
}
