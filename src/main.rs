use std::env::args;

use anyhow::{anyhow, Context};
use log::info;

use chromalife::{
    config::{Config, USAGE},
    Session, Sim, View,
};

pub fn main() -> anyhow::Result<()> {
    let config = Config::from_args(args().skip(1)).context(USAGE)?;
    simple_logger::init_with_level(config.log_level)
        .map_err(|error| anyhow!("cannot set up logging: {error}"))?;
    info!(
        "starting chromalife v{} on a {}x{} grid",
        env!("CARGO_PKG_VERSION"),
        config.rows,
        config.cols
    );

    let session = Session::new(&config)?;
    let simulation = Sim::spawn(session, config.timing);
    let view = View::spawn(simulation.handle(), &config);

    view.join()?;
    simulation.join()?;
    Ok(())
}
