use anyhow::Result;
use cloak::settings;
use cloak::simulation::Simulation;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = settings::load_config()?;
    let mut simulation = Simulation::new(settings)?;

    simulation.solve()?;
    simulation.writeup()
}
