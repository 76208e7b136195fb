use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,chatrelay_core_sdk=debug,tower_http=info";

/**
 * \brief 初始化 tracing 日志，输出到 stderr；`RUST_LOG` 优先于默认过滤规则。
 * \param json 是否输出 JSON 行格式
 *
 * 重复调用不会报错，已存在的全局 subscriber 会被保留。
 */
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    let layer = if json {
        layer.json().flatten_event(true).boxed()
    } else {
        layer.boxed()
    };
    if let Err(err) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("telemetry init skipped: {}", err);
    }
}
