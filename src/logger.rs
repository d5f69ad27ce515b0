//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志（默认 `info` 级别，可通过 `RUST_LOG` 覆盖）
pub fn init() {
    init_with_verbose(false);
}

/// 初始化全局日志，`verbose` 为 true 时默认级别为 `debug`
///
/// 重复调用是安全的（测试中多次初始化时只有第一次生效）
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},html5ever=warn,chromiumoxide=warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
