// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Product, VatType},
};

// As queries usam nomes de tabela sem qualificação: o roteamento para o
// esquema do tenant já aconteceu na conexão (search_path do pool).
#[derive(Clone)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        barcode: &str,
        name: &str,
        category: Option<&str>,
        cost_price: Decimal,
        selling_price: Decimal,
        stock_quantity: Decimal,
        reorder_level: Decimal,
        vat_type: VatType,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (barcode, name, category, cost_price, selling_price,
                 stock_quantity, reorder_level, vat_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(barcode)
        .bind(name)
        .bind(category)
        .bind(cost_price)
        .bind(selling_price)
        .bind(stock_quantity)
        .bind(reorder_level)
        .bind(vat_type)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::BarcodeAlreadyExists(barcode.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn find_by_barcode<'e, E>(
        &self,
        executor: E,
        barcode: &str,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE barcode = $1")
            .bind(barcode)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    /// Atualização parcial. Cada campo opcional usa COALESCE, então a lista
    /// de colunas é fixa no SQL: nada de montar SET dinâmico com chaves
    /// vindas do chamador.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        category: Option<&str>,
        selling_price: Option<Decimal>,
        reorder_level: Option<Decimal>,
        vat_type: Option<VatType>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name          = COALESCE($2, name),
                category      = COALESCE($3, category),
                selling_price = COALESCE($4, selling_price),
                reorder_level = COALESCE($5, reorder_level),
                vat_type      = COALESCE($6, vat_type),
                updated_at    = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(selling_price)
        .bind(reorder_level)
        .bind(vat_type)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Baixa de estoque condicional e atômica: o WHERE exige saldo
    /// suficiente, e o retorno diz se a linha foi afetada. Chamado DENTRO da
    /// transação de venda; estoque nunca fica negativo, mesmo com vendas
    /// concorrentes do mesmo produto.
    pub async fn deduct_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: Decimal,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2, updated_at = now()
            WHERE id = $1 AND stock_quantity >= $2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Entrada de compra: soma a quantidade e sobrescreve o custo com o da
    /// última compra (sem média ponderada).
    pub async fn restock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2,
                cost_price     = $3,
                updated_at     = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(unit_cost)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Devolve estoque de uma venda anulada (não mexe no custo).
    pub async fn restore_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE products SET stock_quantity = stock_quantity + $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Produtos ativos no limiar de reposição, do mais crítico para o menos.
    pub async fn list_low_stock<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active AND stock_quantity <= reorder_level
            ORDER BY stock_quantity ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(products)
    }
}
