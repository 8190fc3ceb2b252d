use thiserror::Error;

/// 文件读取错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
}

/// 外部分类服务错误; 只在 fallback 内部流转, 最终降级为零候选
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("non-success status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 报告/导出错误
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("buffer error: {0}")]
    Buffer(String),
}
