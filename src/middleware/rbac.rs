// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::{CurrentUser, Role}};

/// 1. O trait que define uma política de papel
pub trait RolePolicy: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn describe() -> &'static str;
}

/// 2. O extrator (guardião): `_guard: RequireRole<CanVoidSales>` na
/// assinatura do handler nega a requisição antes de qualquer chamada a
/// repositório.
pub struct RequireRole<P>(pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or(AppError::InvalidToken)?;

        if !P::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "Esta ação exige: {}",
                P::describe()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS POLÍTICAS
// ---

/// Anular vendas: só admin e gerente.
pub struct CanVoidSales;
impl RolePolicy for CanVoidSales {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Manager)
    }
    fn describe() -> &'static str {
        "admin ou gerente"
    }
}

/// Catálogo e compras: admin, gerente e estoquista.
pub struct CanManageStock;
impl RolePolicy for CanManageStock {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Manager | Role::Storekeeper)
    }
    fn describe() -> &'static str {
        "admin, gerente ou estoquista"
    }
}

/// Registrar vendas: qualquer papel operacional menos o estoquista.
pub struct CanRecordSales;
impl RolePolicy for CanRecordSales {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Manager | Role::Cashier)
    }
    fn describe() -> &'static str {
        "admin, gerente ou caixa"
    }
}

/// Despesas e relatórios financeiros: admin e gerente.
pub struct CanManageFinance;
impl RolePolicy for CanManageFinance {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Manager)
    }
    fn describe() -> &'static str {
        "admin ou gerente"
    }
}

/// Configurações do tenant e gestão de usuários: só admin.
pub struct CanManageSettings;
impl RolePolicy for CanManageSettings {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin)
    }
    fn describe() -> &'static str {
        "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_so_para_admin_e_gerente() {
        assert!(CanVoidSales::allows(Role::Admin));
        assert!(CanVoidSales::allows(Role::Manager));
        assert!(!CanVoidSales::allows(Role::Cashier));
        assert!(!CanVoidSales::allows(Role::Storekeeper));
    }

    #[test]
    fn estoquista_mexe_no_estoque_mas_nao_vende() {
        assert!(CanManageStock::allows(Role::Storekeeper));
        assert!(!CanRecordSales::allows(Role::Storekeeper));
    }

    #[test]
    fn caixa_vende_mas_nao_gerencia() {
        assert!(CanRecordSales::allows(Role::Cashier));
        assert!(!CanManageStock::allows(Role::Cashier));
        assert!(!CanManageSettings::allows(Role::Cashier));
    }

    #[test]
    fn configuracoes_sao_exclusivas_do_admin() {
        assert!(CanManageSettings::allows(Role::Admin));
        assert!(!CanManageSettings::allows(Role::Manager));
    }
}
