use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::login,
        crate::api::products::list_products,
        crate::api::products::create_product,
        crate::api::orders::create_pos_order,
        crate::api::dashboard::dashboard_stats,
        crate::api::settings::get_settings
    ),
    components(
        schemas(
            crate::api::auth::LoginRequest,
            crate::api::auth::AuthResponse,
            crate::api::products::ProductInput,
            crate::models::Product,
            crate::checkout::CartItem,
            crate::checkout::CreateOrderPayload
        )
    ),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Order entry and POS checkout"),
        (name = "dashboard", description = "Store aggregates"),
        (name = "settings", description = "Store settings")
    )
)]
pub struct ApiDoc;
