#[tokio::main]
async fn main() {
    if let Err(err) = branch_mcp::mcp::server::run_stdio().await {
        eprintln!("branch-mcp: {}", err);
        std::process::exit(1);
    }
}
