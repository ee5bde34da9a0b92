mod animation;
mod app;
mod camera;
mod clock;
mod color;
mod config;
mod controls;
mod error;
mod geometry;
mod graphics;
mod math;
mod renderer;
mod scene;
mod state;
mod terminal;
mod vertex;

use clap::Parser;
use log::*;

/// Main function
fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();

    pretty_env_logger::formatted_builder()
        .format_timestamp(None)
        .filter_level(args.log_level())
        .init();

    info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    app::run(&args)
}
