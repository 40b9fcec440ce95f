#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eventdesk::tui::run().await
}
