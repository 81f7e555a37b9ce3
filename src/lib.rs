pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{error, middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{CartService, ChatService, OrderService};
use errors::AppError;
use infrastructure::{
    DieselCartRepository, DieselMessageRepository, DieselOrderRepository, DieselUserDirectory,
};

pub use config::Settings;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type AppCartService = CartService<DieselUserDirectory, DieselCartRepository>;
pub type AppOrderService = OrderService<DieselUserDirectory, DieselOrderRepository>;
pub type AppChatService =
    ChatService<DieselUserDirectory, DieselOrderRepository, DieselMessageRepository>;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("database pool unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("failed to run database migrations: {0}")]
    Migrations(String),
}

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), SetupError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| SetupError::Migrations(e.to_string()))?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::add_line_item,
        handlers::cart::update_line_item,
        handlers::cart::remove_line_item,
        handlers::cart::view_open_cart,
        handlers::orders::confirm_order,
        handlers::orders::my_orders,
        handlers::orders::store_orders,
        handlers::orders::my_deliveries,
        handlers::orders::available_orders,
        handlers::orders::update_status,
        handlers::orders::assign_courier,
        handlers::orders::claim_order,
        handlers::orders::mark_delivered,
        handlers::orders::mark_picked_up,
        handlers::chat::list_messages,
        handlers::chat::send_message,
        handlers::chat::list_conversations,
    ),
    components(schemas(
        handlers::ContactResponse,
        handlers::LineItemResponse,
        handlers::cart::QuantityRequest,
        handlers::cart::CartResponse,
        handlers::cart::RemovedLineResponse,
        handlers::orders::ConfirmOrderRequest,
        handlers::orders::CheckoutLineRequest,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::AssignCourierRequest,
        handlers::orders::OrderResponse,
        handlers::chat::SendMessageRequest,
        handlers::chat::MessageResponse,
        handlers::chat::SentMessageResponse,
        handlers::chat::MessagesResponse,
        handlers::chat::ConversationResponse,
    )),
    tags(
        (name = "cart", description = "Open cart of the calling customer"),
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "chat", description = "Order-scoped messages"),
    )
)]
pub struct ApiDoc;

fn bad_request(message: String) -> error::Error {
    AppError::BadRequest(message).into()
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let carts = web::Data::new(CartService::new(
        DieselUserDirectory::new(pool.clone()),
        DieselCartRepository::new(pool.clone()),
    ));
    let orders = web::Data::new(OrderService::new(
        DieselUserDirectory::new(pool.clone()),
        DieselOrderRepository::new(pool.clone()),
    ));
    let chat = web::Data::new(ChatService::new(
        DieselUserDirectory::new(pool.clone()),
        DieselOrderRepository::new(pool.clone()),
        DieselMessageRepository::new(pool),
    ));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(carts.clone())
            .app_data(orders.clone())
            .app_data(chat.clone())
            .app_data(
                web::JsonConfig::default().error_handler(|e, _| bad_request(e.to_string())),
            )
            .app_data(
                web::PathConfig::default().error_handler(|e, _| bad_request(e.to_string())),
            )
            .wrap(Logger::default())
            .service(
                // Literal segments first: `/{product}` would swallow them.
                web::scope("/cart")
                    .route("/crear-pedido", web::post().to(handlers::orders::confirm_order))
                    .route("/view", web::get().to(handlers::cart::view_open_cart))
                    .route("/mis-pedidos", web::get().to(handlers::orders::my_orders))
                    .route("/pedidos-tienda", web::get().to(handlers::orders::store_orders))
                    .route("/mis-entregas", web::get().to(handlers::orders::my_deliveries))
                    .route(
                        "/pedidos-disponibles",
                        web::get().to(handlers::orders::available_orders),
                    )
                    .route("/{cart}/estado", web::put().to(handlers::orders::update_status))
                    .route(
                        "/{cart}/asignar-domiciliario",
                        web::put().to(handlers::orders::assign_courier),
                    )
                    .route("/{cart}/tomar-pedido", web::put().to(handlers::orders::claim_order))
                    .route(
                        "/{cart}/marcar-entregado",
                        web::put().to(handlers::orders::mark_delivered),
                    )
                    .route(
                        "/{cart}/marcar-recogido",
                        web::put().to(handlers::orders::mark_picked_up),
                    )
                    .route(
                        "/{cart}/products/{product}",
                        web::put().to(handlers::cart::update_line_item),
                    )
                    .route(
                        "/{cart}/products/{product}",
                        web::delete().to(handlers::cart::remove_line_item),
                    )
                    .route("/{product}", web::post().to(handlers::cart::add_line_item)),
            )
            .service(
                web::scope("/chat")
                    .route("/{order}", web::get().to(handlers::chat::list_messages))
                    .route("/{order}/enviar", web::post().to(handlers::chat::send_message)),
            )
            .route(
                "/conversaciones",
                web::get().to(handlers::chat::list_conversations),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
