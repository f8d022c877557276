// src/services/sale_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::numbering::generate_document_no,
    db::{CustomerRepository, ProductRepository, SaleRepository, SchemaName, TenantDb},
    db::sale_repo::NewSale,
    models::inventory::{Product, VatType},
    models::sales::{PaymentMethod, Sale, SaleWithItems},
};

const RECEIPT_PREFIX: &str = "RCP";

pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    /// Preço praticado no caixa; se ausente, usa o selling_price do produto.
    pub unit_price: Option<Decimal>,
}

pub struct CreateSaleInput {
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleLineInput>,
    pub payment_method: PaymentMethod,
    pub amount_paid: Decimal,
    pub discount: Decimal,
    pub mpesa_code: Option<String>,
    pub notes: Option<String>,
}

/// IVA embutido no preço: a fatia de imposto de um valor cheio é
/// `valor * 16 / 116`.
fn vat_portion(amount: Decimal) -> Decimal {
    (amount * Decimal::from(16) / Decimal::from(116)).round_dp(2)
}

/// Subtotal e IVA de uma linha. Linhas não-"vatable" carregam IVA zero.
fn compute_line(quantity: Decimal, unit_price: Decimal, vat_type: VatType) -> (Decimal, Decimal) {
    let subtotal = (quantity * unit_price).round_dp(2);
    let vat = match vat_type {
        VatType::Vatable => vat_portion(subtotal),
        VatType::Exempt | VatType::ZeroRated => Decimal::ZERO,
    };
    (subtotal, vat)
}

/// Pontos de fidelidade: 1 ponto a cada 100 unidades monetárias.
fn loyalty_points(total: Decimal) -> i64 {
    (total / Decimal::from(100)).floor().to_i64().unwrap_or(0)
}

/// Credita os pontos de uma venda já confirmada. Best-effort: a falha é
/// registrada no log e nunca propagada, porque a venda já foi persistida.
async fn credit_loyalty(
    customer_repo: &CustomerRepository,
    pool: &sqlx::PgPool,
    customer_id: Uuid,
    total: Decimal,
) {
    let points = loyalty_points(total);
    if points == 0 {
        return;
    }
    if let Err(e) = customer_repo.add_loyalty_points(pool, customer_id, points).await {
        tracing::warn!(
            "Crédito de {} pontos para o cliente {} falhou (venda já registrada): {}",
            points,
            customer_id,
            e
        );
    }
}

#[derive(Clone)]
pub struct SaleService {
    db: TenantDb,
    sale_repo: SaleRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
}

impl SaleService {
    pub fn new(
        db: TenantDb,
        sale_repo: SaleRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
    ) -> Self {
        Self {
            db,
            sale_repo,
            product_repo,
            customer_repo,
        }
    }

    /// Cria uma venda completa: cabeçalho + linhas + baixa de estoque, tudo
    /// em UMA transação no esquema do tenant.
    ///
    /// A existência das entidades referenciadas é checada ANTES de abrir a
    /// transação (classe 404). A suficiência de estoque é verificada DENTRO
    /// da transação, pela própria baixa condicional: duas vendas
    /// concorrentes do mesmo produto não conseguem deixar o saldo negativo.
    pub async fn create_sale(
        &self,
        schema: &SchemaName,
        cashier_id: Uuid,
        input: CreateSaleInput,
    ) -> Result<SaleWithItems, AppError> {
        let pool = self.db.pool(schema).await;

        // 1. Resolve os produtos referenciados (fora da transação)
        let mut products: Vec<Product> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = self
                .product_repo
                .find_by_id(&pool, line.product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;
            products.push(product);
        }

        if let Some(customer_id) = input.customer_id {
            self.customer_repo
                .find_by_id(&pool, customer_id)
                .await?
                .ok_or(AppError::CustomerNotFound)?;
        }

        // 2. Calcula linhas e totais (preço com IVA incluso)
        let mut lines = Vec::with_capacity(input.items.len());
        let mut subtotal = Decimal::ZERO;
        let mut vat_amount = Decimal::ZERO;
        for (line, product) in input.items.iter().zip(&products) {
            let unit_price = line.unit_price.unwrap_or(product.selling_price);
            let (line_subtotal, line_vat) = compute_line(line.quantity, unit_price, product.vat_type);
            subtotal += line_subtotal;
            vat_amount += line_vat;
            lines.push((line.product_id, line.quantity, unit_price, line_subtotal, line_vat));
        }

        // Desconto é aplicado no nível da venda, depois do cálculo do IVA
        let total_amount = subtotal - input.discount;
        let change_amount = (input.amount_paid - total_amount).max(Decimal::ZERO);

        let receipt_no = generate_document_no(RECEIPT_PREFIX);

        // 3. Transação: venda + linhas + baixa atômica de estoque
        let mut tx = self.db.begin(schema).await?;

        let sale = self
            .sale_repo
            .insert_sale(
                &mut *tx,
                NewSale {
                    receipt_no: &receipt_no,
                    cashier_id,
                    customer_id: input.customer_id,
                    subtotal,
                    vat_amount,
                    discount: input.discount,
                    total_amount,
                    payment_method: input.payment_method,
                    amount_paid: input.amount_paid,
                    change_amount,
                    mpesa_code: input.mpesa_code.as_deref(),
                    notes: input.notes.as_deref(),
                },
            )
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for ((product_id, quantity, unit_price, line_subtotal, line_vat), product) in
            lines.into_iter().zip(&products)
        {
            let item = self
                .sale_repo
                .insert_item(&mut *tx, sale.id, product_id, quantity, unit_price, line_subtotal, line_vat)
                .await?;

            let deducted = self
                .product_repo
                .deduct_stock(&mut *tx, product_id, quantity)
                .await?;
            if !deducted {
                // O drop da transação faz o ROLLBACK de tudo
                return Err(AppError::InsufficientStock(product.name.clone()));
            }
            items.push(item);
        }

        tx.commit().await?;
        tracing::info!("Venda {} registrada ({} itens)", sale.receipt_no, items.len());

        // 4. Fidelidade: creditada APÓS o commit, fora da transação.
        // A venda já está confirmada; uma falha aqui não pode virar erro
        // para o caixa, só fica no log.
        if let Some(customer_id) = input.customer_id {
            credit_loyalty(&self.customer_repo, &pool, customer_id, sale.total_amount).await;
        }

        Ok(SaleWithItems { sale, items })
    }

    /// Anula uma venda: devolve o estoque de cada linha e marca o status
    /// como "voided", anexando a trilha de auditoria em notes. Transição
    /// terminal: uma venda anulada nunca volta.
    pub async fn void_sale(
        &self,
        schema: &SchemaName,
        sale_id: Uuid,
        reason: &str,
        voided_by: Uuid,
    ) -> Result<Sale, AppError> {
        let mut tx = self.db.begin(schema).await?;

        let sale = self
            .sale_repo
            .find_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;

        if sale.status == crate::models::sales::SaleStatus::Voided {
            return Err(AppError::SaleAlreadyVoided);
        }

        let items = self.sale_repo.items_for_sale(&mut *tx, sale_id).await?;
        for item in &items {
            self.product_repo
                .restore_stock(&mut *tx, item.product_id, item.quantity)
                .await?;
        }

        let audit_note = format!(
            "[ANULADA em {} por {}] motivo: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            voided_by,
            reason
        );
        let voided = self.sale_repo.mark_voided(&mut *tx, sale_id, &audit_note).await?;

        tx.commit().await?;
        tracing::info!("Venda {} anulada por {}", voided.receipt_no, voided_by);
        Ok(voided)
    }

    pub async fn get_sale(
        &self,
        schema: &SchemaName,
        sale_id: Uuid,
    ) -> Result<SaleWithItems, AppError> {
        let pool = self.db.pool(schema).await;
        let sale = self
            .sale_repo
            .find_by_id(&pool, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let items = self.sale_repo.items_for_sale(&pool, sale_id).await?;
        Ok(SaleWithItems { sale, items })
    }

    pub async fn list_sales(
        &self,
        schema: &SchemaName,
        from: Option<chrono::DateTime<Utc>>,
        to: Option<chrono::DateTime<Utc>>,
    ) -> Result<Vec<Sale>, AppError> {
        let pool = self.db.pool(schema).await;
        self.sale_repo.list(&pool, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    // Cenário de referência: produto a 116.00 com IVA incluso, quantidade 2.
    #[test]
    fn linha_vatable_extrai_iva_incluso() {
        let (subtotal, vat) = compute_line(dec("2"), dec("116.00"), VatType::Vatable);
        assert_eq!(subtotal, dec("232.00"));
        assert_eq!(vat, dec("32.00"));
    }

    #[test]
    fn linha_isenta_tem_iva_zero() {
        let (subtotal, vat) = compute_line(dec("3"), dec("50.00"), VatType::Exempt);
        assert_eq!(subtotal, dec("150.00"));
        assert_eq!(vat, Decimal::ZERO);

        let (_, vat) = compute_line(dec("1"), dec("80.00"), VatType::ZeroRated);
        assert_eq!(vat, Decimal::ZERO);
    }

    #[test]
    fn iva_arredonda_para_duas_casas() {
        // 100.00 * 16/116 = 13.7931... → 13.79
        assert_eq!(vat_portion(dec("100.00")), dec("13.79"));
    }

    #[test]
    fn quantidade_fracionaria_arredonda_o_subtotal() {
        // 1.5 kg a 33.33 → 49.995 → 50.00
        let (subtotal, _) = compute_line(dec("1.5"), dec("33.33"), VatType::Vatable);
        assert_eq!(subtotal, dec("50.00"));
    }

    #[test]
    fn fidelidade_e_um_ponto_por_cem() {
        assert_eq!(loyalty_points(dec("232.00")), 2);
        assert_eq!(loyalty_points(dec("99.99")), 0);
        assert_eq!(loyalty_points(dec("100.00")), 1);
        assert_eq!(loyalty_points(dec("1050.75")), 10);
    }

    // A venda já foi confirmada quando os pontos são creditados; o crédito
    // nunca pode transformar uma venda persistida em erro para o caixa.
    #[tokio::test]
    async fn credito_de_fidelidade_nao_propaga_falha() {
        use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

        // Pool lazy já fechado: o crédito falha sem tocar a rede.
        let pool = PgPoolOptions::new()
            .connect_lazy_with(PgConnectOptions::new().host("localhost").database("pos_test"));
        pool.close().await;

        credit_loyalty(&CustomerRepository, &pool, Uuid::new_v4(), dec("500.00")).await;
    }
}
