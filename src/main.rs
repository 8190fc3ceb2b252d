use sheet_extractor::{api, inference, AppConfig};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 上传目录
    tokio::fs::create_dir_all(&config.upload.dir).await?;
    info!("Upload directory: {}", config.upload.dir);

    // 外部分类服务 (fallback)
    let classifier = inference::build_classifier(&config.classifier, config.extraction.threshold_label());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = api::router(api::AppState::new(config, classifier));

    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /upload             - analyze spreadsheet/CSV");
    info!("  GET  /download/:id       - results as JSON");
    info!("  GET  /download/:id/csv   - results as CSV");
    info!("  GET  /report/:id         - PDF report");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
