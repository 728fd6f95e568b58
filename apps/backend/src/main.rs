#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flashdeck_backend::run().await
}
