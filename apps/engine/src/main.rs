#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lesson_engine::run().await
}
