use crate::api::state::AppState;
use crate::loader;
use crate::models::{QualifyingRecord, ResultSet};
use crate::report;
use crate::service::fallback;
use axum::{
    extract::{Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::path::PathBuf;

/// 上传分析响应
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<QualifyingRecord>,
    pub download_url: String,
    pub csv_url: String,
    pub report_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP 层错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传文件并分析: 读取 -> 主流程 -> 外部兜底 -> 保存结果
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload inválido: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Upload inválido: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::BadRequest("Nenhum arquivo enviado".to_string()));
    };
    if filename.trim().is_empty() {
        return Err(ApiError::BadRequest("Nenhum arquivo selecionado".to_string()));
    }
    if !state.config.upload.is_allowed(&filename) {
        return Err(ApiError::BadRequest("Tipo de arquivo não permitido".to_string()));
    }

    tokio::fs::create_dir_all(state.store.dir())
        .await
        .map_err(|e| ApiError::Internal(format!("Falha ao criar pasta de uploads: {}", e)))?;
    let id = state.store.next_id();
    let safe_name = secure_filename(&filename);
    let path: PathBuf = state.store.dir().join(format!("{}_{}", id, safe_name));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Falha ao salvar arquivo: {}", e)))?;
    tracing::info!("Saved upload {} as {}", filename, path.display());

    let engine = state.engine.clone();
    let blocking_path = path.clone();
    let (units, primary) = tokio::task::spawn_blocking(move || {
        let units = match loader::load_units(&blocking_path) {
            Ok(units) => units,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", blocking_path.display(), e);
                Vec::new()
            }
        };
        let primary = engine.extract(&units);
        (units, primary)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Falha na análise: {}", e)))?;

    let config = state.engine.config();
    let sample = loader::sample_rows(&units, config.sample_size);
    let results: ResultSet = fallback::merge(primary, &sample, state.classifier.as_ref(), config).await;

    state.store.save(&id, &results).await;
    tracing::info!("Upload {} analyzed: {} records (id {})", filename, results.len(), id);

    let response = UploadResponse {
        success: true,
        message: format!("Arquivo {} analisado com sucesso", safe_name),
        results: results.into_records(),
        download_url: format!("/download/{}", id),
        csv_url: format!("/download/{}/csv", id),
        report_url: format!("/report/{}", id),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// 下载 JSON 结果
pub async fn download_json(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let results = find(&state, &id).await?;
    let bytes = report::to_json(results.records()).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(attachment(bytes, "application/json", &format!("resultados_{}.json", id)))
}

/// 下载 CSV 结果
pub async fn download_csv(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let results = find(&state, &id).await?;
    let bytes = report::to_csv(results.records()).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(attachment(bytes, "text/csv; charset=utf-8", &format!("resultados_{}.csv", id)))
}

/// PDF 报告
pub async fn download_report(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let results = find(&state, &id).await?;
    let report_cfg = &state.config.report;
    let title = report_cfg
        .title
        .replace("{threshold}", &state.engine.config().threshold_label());
    let placeholder = report_cfg.placeholder.clone();

    let bytes = tokio::task::spawn_blocking(move || report::render_pdf(results.records(), &title, &placeholder))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(attachment(bytes, "application/pdf", "relatorio_clientes.pdf"))
}

async fn find(state: &AppState, id: &str) -> Result<ResultSet, ApiError> {
    state
        .store
        .load(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Arquivo não encontrado".to_string()))
}

fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// 只保留 ASCII 字母数字和 . - _, 去掉前导点
fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
