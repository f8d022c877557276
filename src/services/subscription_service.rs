// src/services/subscription_service.rs

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenantDb, TenantRepository},
    models::sales::PaymentMethod,
    models::tenancy::{Payment, PaymentStatus, SubscriptionStatus, Tenant},
};

const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Cobrança de assinatura no esquema compartilhado. O protocolo do gateway
/// (STK push etc.) vive fora daqui; este serviço só persiste pagamentos e
/// promove o tenant quando um pagamento é confirmado.
#[derive(Clone)]
pub struct SubscriptionService {
    db: TenantDb,
    tenant_repo: TenantRepository,
}

impl SubscriptionService {
    pub fn new(db: TenantDb, tenant_repo: TenantRepository) -> Self {
        Self { db, tenant_repo }
    }

    /// Gate de escrita do middleware: ativo sempre pode; trial só dentro do
    /// prazo; suspenso/cancelado nunca.
    pub async fn ensure_writable(&self, tenant_id: Uuid) -> Result<(), AppError> {
        let tenant = self
            .tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        match tenant.subscription_status {
            SubscriptionStatus::Active => Ok(()),
            SubscriptionStatus::Trial => {
                let in_trial = tenant
                    .trial_ends_at
                    .map(|ends| ends >= Utc::now())
                    .unwrap_or(false);
                if in_trial {
                    Ok(())
                } else {
                    Err(AppError::SubscriptionInactive)
                }
            }
            SubscriptionStatus::Suspended | SubscriptionStatus::Cancelled => {
                Err(AppError::SubscriptionInactive)
            }
        }
    }

    /// Registra a intenção de pagamento (status pending). O valor vem do
    /// plano, não do chamador.
    pub async fn record_payment(
        &self,
        tenant_id: Uuid,
        plan_id: Uuid,
        method: PaymentMethod,
        reference: Option<&str>,
    ) -> Result<Payment, AppError> {
        let plan = self
            .tenant_repo
            .find_plan(plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        self.tenant_repo
            .insert_payment(
                self.db.shared(),
                tenant_id,
                plan_id,
                plan.monthly_price,
                method,
                reference,
            )
            .await
    }

    /// Resultado vindo do gateway. Confirmação promove o tenant (plano +
    /// status ativo) e registra o período no histórico, numa transação no
    /// esquema compartilhado.
    pub async fn confirm_payment(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        success: bool,
    ) -> Result<Payment, AppError> {
        let mut tx = self.db.begin_shared().await?;

        let status = if success {
            PaymentStatus::Confirmed
        } else {
            PaymentStatus::Failed
        };
        let payment = self
            .tenant_repo
            .set_payment_status(&mut *tx, payment_id, status)
            .await?
            .ok_or(AppError::PaymentNotFound)?;

        // Pagamento de outro tenant: o drop da transação desfaz o update
        if payment.tenant_id != tenant_id {
            return Err(AppError::Forbidden(
                "Pagamento de outro tenant.".to_string(),
            ));
        }

        if success {
            self.tenant_repo
                .set_subscription(
                    &mut *tx,
                    payment.tenant_id,
                    payment.plan_id,
                    SubscriptionStatus::Active,
                )
                .await?;

            let starts = Utc::now();
            self.tenant_repo
                .insert_history(
                    &mut *tx,
                    payment.tenant_id,
                    payment.plan_id,
                    Some(payment.id),
                    starts,
                    starts + Duration::days(SUBSCRIPTION_PERIOD_DAYS),
                )
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            "Pagamento {} {}",
            payment.id,
            if success { "confirmado" } else { "falhou" }
        );
        Ok(payment)
    }

    pub async fn tenant_status(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)
    }
}
