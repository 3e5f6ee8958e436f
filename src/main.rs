use parlour::config::AppConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let handle = parlour::initialize(AppConfig::from_env())?;
    handle.run()?;
    Ok(())
}
