//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；否则普通模式为 info，详细模式为 debug。
/// 日志写到标准错误，标准输出只留给解析结果。
pub fn init(verbose: bool) {
    let default_level = if verbose { "exercise_bulk=debug" } else { "exercise_bulk=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
