use knight_engine::{LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Knight Engine 2D Startup ===");

    let config = LoopConfig {
        window_title: "Knight Engine 2D - Sprite Demo".to_string(),
        window_width: gameplay::WINDOW_WIDTH,
        window_height: gameplay::WINDOW_HEIGHT,
        ..LoopConfig::default()
    };

    AppWiring {
        config,
        scene: gameplay::build_scene(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
