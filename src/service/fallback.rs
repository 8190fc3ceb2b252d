use crate::config::ExtractionConfig;
use crate::error::ClassifierError;
use crate::models::{Candidate, ResultSet};
use async_trait::async_trait;
use serde_json::Value;

/// 外部分类服务: 输入未分类的原始行样本, 返回候选记录
#[async_trait]
pub trait ExternalClassifier: Send + Sync {
    async fn classify(&self, sample: &[Value]) -> Result<Vec<Candidate>, ClassifierError>;
}

/// 未配置时使用, 不贡献任何候选
pub struct DisabledClassifier;

#[async_trait]
impl ExternalClassifier for DisabledClassifier {
    async fn classify(&self, _sample: &[Value]) -> Result<Vec<Candidate>, ClassifierError> {
        Err(ClassifierError::NotConfigured)
    }
}

/// 主流程结果不足时合并外部候选; 外部失败只记日志, 结果集不会变少
pub async fn merge(
    mut primary: ResultSet,
    sample: &[Value],
    classifier: &dyn ExternalClassifier,
    config: &ExtractionConfig,
) -> ResultSet {
    if primary.len() >= config.fallback_trigger {
        return primary;
    }
    if sample.is_empty() {
        tracing::info!("Fallback skipped: no sample rows");
        return primary;
    }

    tracing::info!(
        "Primary pass found {} records (< {}), asking external classifier with {} sample rows",
        primary.len(),
        config.fallback_trigger,
        sample.len()
    );

    let candidates = match classifier.classify(sample).await {
        Ok(candidates) => candidates,
        Err(ClassifierError::NotConfigured) => {
            tracing::info!("External classifier not configured, fallback contributes nothing");
            return primary;
        }
        Err(e) => {
            tracing::warn!("External classifier failed, fallback contributes nothing: {}", e);
            return primary;
        }
    };

    let offered = candidates.len();
    let mut added = 0;
    for candidate in candidates {
        let record = candidate.into_record();
        if !record.has_identity() {
            continue;
        }
        if primary.push_unique(record) {
            added += 1;
        }
    }
    tracing::info!("Fallback merged {} of {} candidates", added, offered);

    primary
}

/// 把外部返回的 JSON 解析为候选列表; 不是数组时为空, 单个坏元素被跳过
pub fn parse_candidates(value: &Value) -> Vec<Candidate> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items.iter().filter_map(parse_candidate).collect()
}

fn parse_candidate(item: &Value) -> Option<Candidate> {
    let obj = item.as_object()?;
    let field = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null());

    let quantity = match field(&["quantity", "quantidade"])? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !quantity.is_finite() {
        return None;
    }

    let text = |v: &Value| -> Option<String> {
        let s = match v {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!s.is_empty()).then_some(s)
    };

    let name = field(&["name", "nome"]).and_then(text);
    let document = field(&["document", "cpf"]).and_then(text);
    if name.is_none() && document.is_none() {
        return None;
    }

    Some(Candidate {
        name,
        document,
        quantity,
    })
}
