mod app;
mod config;
mod display;
mod framebuffer;
// Only the real HAT uses these
#[cfg_attr(
    not(all(
        target_os = "linux",
        any(target_arch = "arm", target_arch = "aarch64")
    )),
    allow(dead_code)
)]
mod hardware;
#[cfg_attr(
    not(all(
        target_os = "linux",
        any(target_arch = "arm", target_arch = "aarch64")
    )),
    path = "mock_hat.rs"
)]
mod hat;
mod led;
mod settings;
mod weather;

use crate::{app::App, config::Config, hat::DisplayHat};
use anyhow::Context;
use log::{info, LevelFilter};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("hatmini_weather", LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Display HAT Mini weather display");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::Relaxed))
        .context("Error setting exit handler")?;

    let config = Config::load()?;
    let hat = DisplayHat::new(&config)?;
    let mut app = App::new(&config, hat)?;

    while running.load(Ordering::Relaxed) {
        app.tick()?;
        thread::sleep(App::INTERVAL);
    }

    info!("Bye!");
    Ok(())
}
