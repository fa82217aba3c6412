//! ログ初期化
//!
//! `RUST_LOG` が設定されていればそれを優先する。

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose {
        "psd_web_extract=debug,psd_web=debug"
    } else {
        "psd_web_extract=warn,psd_web=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
