use clap::Parser;
use dirshare::{build_router, net::discover_addresses, AppState, Args, ServerConfig};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let root_dir = match fs::canonicalize(&args.root_dir).await {
        Ok(path) if path.is_dir() => path,
        Ok(path) => {
            error!("Root path '{}' is not a directory. Exiting.", path.display());
            eprintln!("Error: Root path '{}' is not a directory.", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(
                "Failed to resolve root directory '{}': {}. Exiting.",
                args.root_dir.display(),
                e
            );
            eprintln!(
                "Error: Failed to resolve root directory '{}': {}",
                args.root_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let ip_addresses = discover_addresses();
    info!("Serving files from: {}", root_dir.display());

    let state = AppState::new(
        ServerConfig::new(args.port.to_string(), root_dir, ip_addresses.clone()),
        args.max_upload,
    );
    let app = build_router(state);

    let bind_addr = SocketAddr::new(args.host, args.port);
    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_addr, e);
            eprintln!("Error: Failed to bind to address {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    println!("Server starting on http://localhost:{}", args.port);
    for ip in &ip_addresses {
        println!("Accessible at http://{}:{}", ip, args.port);
    }

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
