// src/main.rs
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use petshop_pos::notify::EmailNotifier;
use petshop_pos::{api, docs, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // JWT_SECRET is read by the auth module; fail early if it is missing.
    env::var("JWT_SECRET").expect("JWT_SECRET required");

    let resend_api_key = env::var("RESEND_API_KEY").ok();

    let state = web::Data::new(AppState {
        pool,
        notifier: Arc::new(EmailNotifier::new(resend_api_key)),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .service(api::auth::login)
            .service(
                web::scope("/api")
                    .wrap(api::auth::JwtMiddleware)
                    .service(api::products::list_products)
                    .service(api::products::list_categories)
                    .service(api::products::create_product)
                    .service(api::products::update_product)
                    .service(api::products::delete_product)
                    .service(api::customers::list_customers)
                    .service(api::customers::customers_for_select)
                    .service(api::customers::create_customer)
                    .service(api::customers::update_customer)
                    .service(api::customers::delete_customer)
                    .service(api::customers::create_pet)
                    .service(api::customers::update_pet)
                    .service(api::customers::delete_pet)
                    .service(api::orders::create_pos_order)
                    .service(api::orders::list_orders)
                    .service(api::orders::get_order)
                    .service(api::orders::create_order)
                    .service(api::orders::update_order)
                    .service(api::orders::update_order_status)
                    .service(api::orders::delete_order)
                    .service(api::dashboard::dashboard_stats)
                    .service(api::dashboard::dashboard_charts)
                    .service(api::settings::get_settings)
                    .service(api::settings::update_settings)
                    .service(api::users::list_users)
                    .service(api::users::create_user)
                    .service(api::users::delete_user)
                    .service(api::suppliers::list_suppliers)
                    .service(api::suppliers::create_supplier)
                    .service(api::suppliers::update_supplier)
                    .service(api::suppliers::delete_supplier),
            )
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
