//! Portfolio CMS - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = portfolio_cms::run().await {
        eprintln!("FATAL: {}", e);
        std::process::exit(1);
    }
}
