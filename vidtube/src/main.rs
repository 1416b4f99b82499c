#[tokio::main]
async fn main() {
    if let Err(e) = vidtube::runner::run().await {
        tracing::error!("Fatal: {}", e);
        eprintln!("vidtube failed: {}", e);
        std::process::exit(1);
    }
}
