use std::path::PathBuf;

use clap::Parser;
use dungen_config::AppConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod demo;
mod errors;

/// 地牢布局几何核心的命令行演示。
#[derive(Debug, Parser)]
#[command(name = "dungen", version)]
struct Cli {
    /// 配置文件路径，缺省时按 `DUNGEN_CONFIG` 与 `./config/default.toml` 查找
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖配置中的房间数量
    #[arg(long)]
    rooms: Option<u32>,
    /// 跳过网格对齐
    #[arg(long)]
    no_snap: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = load_configuration(cli.config);
    init_logging(&config);
    info!("启动 dungen 演示");

    if let Some(rooms) = cli.rooms {
        config.demo.room_count = rooms;
    }
    if cli.no_snap {
        config.demo.snap_to_grid = false;
    }

    if let Err(err) = demo::run(&config.demo) {
        error!(error = %err, "构建演示布局失败");
        std::process::exit(1);
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    loaded.unwrap_or_else(|err| {
        let path = err.path().map(|p| p.display().to_string());
        warn!(path = ?path, error = %err, "加载配置失败，使用内建默认值");
        AppConfig::default()
    })
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    // 重复初始化时保留已有的订阅者
    let _ = fmt().with_env_filter(filter).try_init();
}
