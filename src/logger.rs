use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别，未设置时使用 `default_level`。
/// 日志写入 stderr，避免与 stdout 上的运行报告交错。
///
/// 示例:
/// - RUST_LOG=debug ruflow run api.collection.json
/// - RUST_LOG=ruflow::runner=trace ruflow workflow run login.workflow.json
pub fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
