use anyhow::{Context, Result};
use renderer::WinitWindowSystem;
use sinoscope::{Sinoscope, SinoscopeConfig};
use tracing_subscriber::EnvFilter;
use viewer::{Generator, Viewer};

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("1", "serial implementation"),
    ("2", "CPU-parallel implementation"),
    ("3", "GPU implementation"),
    ("space", "toggle rendering"),
    ("+ / -", "increase / decrease order"),
    ("q", "quit"),
];

pub fn run() -> Result<()> {
    let config = SinoscopeConfig::default();
    tracing::debug!(?config, "building generator");
    let mut generator = Sinoscope::new(config).context("failed to create sinoscope generator")?;

    let mut viewer =
        Viewer::initialize(&mut generator).context("failed to initialise the viewer")?;
    print_key_bindings();

    let mut system = WinitWindowSystem::new().context("failed to start the window system")?;
    viewer
        .open(&mut system)
        .context("viewer exited with an error")?;
    viewer.shutdown();
    drop(system);

    tracing::info!(
        variant = %generator.variant(),
        order = generator.order(),
        "sinoview finished"
    );
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_key_bindings() {
    println!("Key bindings:");
    for (key, action) in KEY_BINDINGS {
        println!("  {key:<6} {action}");
    }
}
