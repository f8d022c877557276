// src/services/purchase_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::numbering::generate_document_no,
    db::{ProductRepository, PurchaseRepository, SchemaName, SupplierRepository, TenantDb},
    db::purchase_repo::NewPurchase,
    models::purchasing::{Purchase, PurchaseWithItems},
    models::sales::PaymentMethod,
};

const INVOICE_PREFIX: &str = "INV";

pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

pub struct CreatePurchaseInput {
    pub supplier_id: Uuid,
    pub items: Vec<PurchaseLineInput>,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Subtotal e IVA de uma linha de compra. Diferente da venda, a compra
/// aplica a fórmula inclusa de 16% em TODA linha, sem olhar o vat_type do
/// produto (comportamento herdado do sistema de origem; ver DESIGN.md).
fn compute_purchase_line(quantity: Decimal, unit_cost: Decimal) -> (Decimal, Decimal) {
    let subtotal = (quantity * unit_cost).round_dp(2);
    let vat = (subtotal * Decimal::from(16) / Decimal::from(116)).round_dp(2);
    (subtotal, vat)
}

#[derive(Clone)]
pub struct PurchaseService {
    db: TenantDb,
    purchase_repo: PurchaseRepository,
    product_repo: ProductRepository,
    supplier_repo: SupplierRepository,
}

impl PurchaseService {
    pub fn new(
        db: TenantDb,
        purchase_repo: PurchaseRepository,
        product_repo: ProductRepository,
        supplier_repo: SupplierRepository,
    ) -> Self {
        Self {
            db,
            purchase_repo,
            product_repo,
            supplier_repo,
        }
    }

    /// Registra uma compra: cabeçalho + linhas + entrada de estoque +
    /// custo sobrescrito + razão do fornecedor, em UMA transação.
    pub async fn create_purchase(
        &self,
        schema: &SchemaName,
        created_by: Uuid,
        input: CreatePurchaseInput,
    ) -> Result<PurchaseWithItems, AppError> {
        let pool = self.db.pool(schema).await;

        // Checagens de existência antes da transação (classe 404)
        self.supplier_repo
            .find_by_id(&pool, input.supplier_id)
            .await?
            .ok_or(AppError::SupplierNotFound)?;
        for line in &input.items {
            self.product_repo
                .find_by_id(&pool, line.product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;
        }

        let mut subtotal = Decimal::ZERO;
        let mut vat_amount = Decimal::ZERO;
        let mut lines = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let (line_subtotal, line_vat) = compute_purchase_line(line.quantity, line.unit_cost);
            subtotal += line_subtotal;
            vat_amount += line_vat;
            lines.push((line, line_subtotal, line_vat));
        }

        // Preço de compra também é IVA-incluso: o total é a soma das linhas
        let total_cost = subtotal;
        if input.amount_paid > total_cost {
            return Err(AppError::PaymentExceedsBalance);
        }
        let balance = total_cost - input.amount_paid;

        let invoice_no = generate_document_no(INVOICE_PREFIX);

        let mut tx = self.db.begin(schema).await?;

        let purchase = self
            .purchase_repo
            .insert_purchase(
                &mut *tx,
                NewPurchase {
                    invoice_no: &invoice_no,
                    supplier_id: input.supplier_id,
                    created_by,
                    subtotal,
                    vat_amount,
                    total_cost,
                    amount_paid: input.amount_paid,
                    balance,
                    payment_method: input.payment_method,
                    notes: input.notes.as_deref(),
                },
            )
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (line, line_subtotal, line_vat) in lines {
            let item = self
                .purchase_repo
                .insert_item(
                    &mut *tx,
                    purchase.id,
                    line.product_id,
                    line.quantity,
                    line.unit_cost,
                    line_subtotal,
                    line_vat,
                )
                .await?;

            // Entrada de estoque + custo da última compra vence
            self.product_repo
                .restock(&mut *tx, line.product_id, line.quantity, line.unit_cost)
                .await?;
            items.push(item);
        }

        // Parte não paga vira dívida no razão do fornecedor
        if balance > Decimal::ZERO {
            self.supplier_repo
                .adjust_balance(&mut *tx, input.supplier_id, balance)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("Compra {} registrada ({} itens)", purchase.invoice_no, items.len());

        Ok(PurchaseWithItems { purchase, items })
    }

    /// Pagamento de uma compra em aberto. Recarrega a compra com lock de
    /// linha, rejeita pagamento acima do saldo e atualiza compra +
    /// fornecedor na mesma transação.
    pub async fn make_payment(
        &self,
        schema: &SchemaName,
        purchase_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Purchase, AppError> {
        let mut tx = self.db.begin(schema).await?;

        let purchase = self
            .purchase_repo
            .find_for_update(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

        if amount > purchase.balance {
            return Err(AppError::PaymentExceedsBalance);
        }

        let new_paid = purchase.amount_paid + amount;
        let new_balance = purchase.balance - amount;

        let updated = self
            .purchase_repo
            .apply_payment(&mut *tx, purchase_id, new_paid, new_balance)
            .await?;

        self.supplier_repo
            .adjust_balance(&mut *tx, purchase.supplier_id, -amount)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Pagamento de {} via {:?} na compra {}",
            amount,
            method,
            updated.invoice_no
        );
        Ok(updated)
    }

    pub async fn get_purchase(
        &self,
        schema: &SchemaName,
        purchase_id: Uuid,
    ) -> Result<PurchaseWithItems, AppError> {
        let pool = self.db.pool(schema).await;
        let purchase = self
            .purchase_repo
            .find_by_id(&pool, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;
        let items = self.purchase_repo.items_for_purchase(&pool, purchase_id).await?;
        Ok(PurchaseWithItems { purchase, items })
    }

    pub async fn list_purchases(
        &self,
        schema: &SchemaName,
        from: Option<chrono::DateTime<chrono::Utc>>,
        to: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Vec<Purchase>, AppError> {
        let pool = self.db.pool(schema).await;
        self.purchase_repo.list(&pool, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn linha_de_compra_sempre_extrai_iva() {
        // 100 unidades a 50.00 → subtotal 5000.00, IVA 5000*16/116 = 689.66
        let (subtotal, vat) = compute_purchase_line(dec("100"), dec("50.00"));
        assert_eq!(subtotal, dec("5000.00"));
        assert_eq!(vat, dec("689.66"));
    }

    #[test]
    fn saldo_devedor_e_total_menos_pago() {
        let (subtotal, _) = compute_purchase_line(dec("10"), dec("116.00"));
        let total = subtotal;
        let paid = dec("500.00");
        assert_eq!(total - paid, dec("660.00"));
    }
}
