use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志（默认 info 级别，可通过 `RUST_LOG` 覆盖）
///
/// 重复调用是安全的，只有第一次生效。
pub fn init() {
    init_with_verbosity(false);
}

/// 按配置中的 `verbose_logging` 初始化日志
pub fn init_from_config(config: &Config) {
    init_with_verbosity(config.verbose_logging);
}

/// `verbose` 为 true 时默认级别为 debug
pub fn init_with_verbosity(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}
