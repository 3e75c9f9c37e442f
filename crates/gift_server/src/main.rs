#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_gift_server::init().await
}
