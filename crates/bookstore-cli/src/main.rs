use std::process;

#[tokio::main]
async fn main() {
    let code = bookstore_cli::run().await;
    process::exit(code);
}
