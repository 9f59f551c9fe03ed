mod config;

use std::time::Instant;

use anyhow::Context;
use life_common::{Simulation, Update};
use tracing::{debug, info};

use crate::config::RunnerConfig;

// one logical thread: the clock, the grid and ctrl-c all share it
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("life_runner=info,life_common=info"))?;
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter),
    )?;

    let matches = config::app().get_matches();
    let config = RunnerConfig::from_matches(&matches)?;
    debug!("{:?}", config);

    let mut simulation = Simulation::new(config.simulation);
    if let Some(path) = &config.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        simulation
            .import_json(&text)
            .with_context(|| format!("could not load {}", path.display()))?;
    }
    print!("{}", simulation.grid());

    if config.generations != Some(0) {
        simulation.start(Instant::now());
    }

    tokio::select! {
        _ = run(&mut simulation, config.generations) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }
    simulation.pause();
    info!("finished after {} generations", simulation.generation().0);

    if let Some(path) = &config.output {
        tokio::fs::write(path, simulation.grid().to_json()?)
            .await
            .with_context(|| format!("could not write {}", path.display()))?;
        info!("wrote final grid to {}", path.display());
    }

    Ok(())
}

/// Sleeps until each tick is due and prints the new generation, until the
/// simulation goes idle or the generation limit is reached.
async fn run(simulation: &mut Simulation, generations: Option<u32>) {
    while let Some(deadline) = simulation.next_deadline() {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

        if let Update::Advanced {
            generation,
            population,
            cycle,
        } = simulation.update(Instant::now())
        {
            println!(
                "generation {} ({} alive{})",
                generation.0,
                population,
                if cycle { ", repeating" } else { "" }
            );
            print!("{}", simulation.grid());

            if generations.map_or(false, |limit| generation.0 >= limit) {
                simulation.pause();
            }
        }
    }
}
