use lemouniq_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (state, router) = lemouniq_api::setup::initialize_app(config.clone()).await?;

    lemouniq_api::setup::server::start_server(&config, router, state.shutdown.clone()).await?;

    Ok(())
}
