//src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::{auth::auth_guard, subscription::subscription_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Migrações do esquema compartilhado (public). Os esquemas de tenant não
    // passam por aqui: o DDL deles roda no provisionamento de cada tenant.
    sqlx::migrate!()
        .run(app_state.registry.public_pool())
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do esquema compartilhado executadas!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas do tenant autenticado que NÃO passam pelo gate de assinatura:
    // o dono precisa conseguir pagar mesmo com a conta suspensa.
    let account_routes = Router::new()
        .route("/settings", get(handlers::tenancy::get_settings)
               .patch(handlers::tenancy::update_settings))
        .route("/subscription", get(handlers::tenancy::subscription_status)
               .post(handlers::tenancy::subscribe))
        .route("/subscription/payments/{id}/confirm",
               post(handlers::tenancy::confirm_payment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas operacionais do tenant: auth + gate de assinatura nas escritas.
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/", post(handlers::tenancy::create_staff)
               .get(handlers::tenancy::list_staff))
        .route("/{id}", axum::routing::delete(handlers::tenancy::deactivate_staff));

    let product_routes = Router::new()
        .route("/", post(handlers::inventory::create_product)
               .get(handlers::inventory::list_products))
        .route("/low-stock", get(handlers::inventory::low_stock))
        .route("/barcode/{barcode}", get(handlers::inventory::get_by_barcode))
        .route("/{id}", get(handlers::inventory::get_product)
               .patch(handlers::inventory::update_product)
               .delete(handlers::inventory::deactivate_product));

    let sale_routes = Router::new()
        .route("/", post(handlers::sales::create_sale)
               .get(handlers::sales::list_sales))
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{id}/void", post(handlers::sales::void_sale));

    let purchase_routes = Router::new()
        .route("/", post(handlers::purchases::create_purchase)
               .get(handlers::purchases::list_purchases))
        .route("/{id}", get(handlers::purchases::get_purchase))
        .route("/{id}/payments", post(handlers::purchases::pay_purchase));

    let customer_routes = Router::new()
        .route("/", post(handlers::crm::create_customer)
               .get(handlers::crm::list_customers))
        .route("/{id}", get(handlers::crm::get_customer)
               .patch(handlers::crm::update_customer));

    let supplier_routes = Router::new()
        .route("/", post(handlers::finance::create_supplier)
               .get(handlers::finance::list_suppliers))
        .route("/{id}", get(handlers::finance::get_supplier)
               .patch(handlers::finance::update_supplier)
               .delete(handlers::finance::deactivate_supplier));

    let expense_routes = Router::new()
        .route("/", post(handlers::finance::create_expense)
               .get(handlers::finance::list_expenses))
        .route("/{id}", axum::routing::delete(handlers::finance::delete_expense));

    // Ordem das camadas: o auth_guard é a camada EXTERNA (roda primeiro e
    // insere o CurrentUser); o subscription_guard lê esse CurrentUser.
    let tenant_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/products", product_routes)
        .nest("/sales", sale_routes)
        .nest("/purchases", purchase_routes)
        .nest("/customers", customer_routes)
        .nest("/suppliers", supplier_routes)
        .nest("/expenses", expense_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            subscription_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/account", account_routes)
        .nest("/api", tenant_routes)
        .with_state(app_state.clone());

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Erro no servidor Axum");

    // Drena todos os pools (público + tenants) antes de sair
    app_state.registry.shutdown().await;
    tracing::info!("Pools de conexão drenados. Até logo!");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Falha ao instalar o handler de Ctrl+C");
    tracing::info!("Sinal de desligamento recebido...");
}
