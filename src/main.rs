use anyhow::Context;
use gateway_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load gateway settings")?;
    ipa_gateway::run(settings).await
}
