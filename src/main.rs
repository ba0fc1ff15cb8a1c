use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use skyview::app::SkyviewApp;
use skyview::config::{Cli, Config};
use skyview::error::SkyviewError;
use skyview::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = Config::from(cli);
    tracing::info!(
        assets = %config.asset_root.display(),
        model = %config.model_file().display(),
        width = config.width,
        height = config.height,
        "starting skyview"
    );

    let event_loop = EventLoop::new().map_err(SkyviewError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SkyviewApp::new(config);
    event_loop.run_app(&mut app).map_err(SkyviewError::from)?;

    if let Some(err) = app.take_error() {
        return Err(SkyviewError::from(err).into());
    }
    Ok(())
}
