use dotenvy::dotenv;
use langcenter::cli;
use langcenter::logging::init_tracing;
use langcenter::router::init_router;
use langcenter::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // Check if this is a CLI command
    if args.len() > 1 && args[1] == "setup-auth" {
        handle_setup_auth(args).await;
        return;
    }

    // Normal server startup
    init_tracing();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}

async fn handle_setup_auth(args: Vec<String>) {
    if args.len() != 4 {
        eprintln!("Usage: {} setup-auth <admin_email> <admin_password>", args[0]);
        std::process::exit(1);
    }

    let admin_email = &args[2];
    let admin_password = &args[3];

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    match cli::setup_auth(&pool, admin_email, admin_password).await {
        Ok(_) => {
            println!("✅ Authorization catalog seeded successfully!");
            println!("   Admin email: {}", admin_email);
        }
        Err(e) => {
            eprintln!("❌ Error seeding authorization catalog: {}", e);
            std::process::exit(1);
        }
    }
}
