pub mod openai;

pub use openai::OpenAiClassifier;

use crate::config::ClassifierConfig;
use crate::service::fallback::{DisabledClassifier, ExternalClassifier};
use std::sync::Arc;

/// 按配置选择外部分类服务; 没有 API key 或构建失败时退回不可用实现
pub fn build_classifier(config: &ClassifierConfig, threshold: String) -> Arc<dyn ExternalClassifier> {
    if !config.enabled {
        tracing::info!("External classifier disabled by config");
        return Arc::new(DisabledClassifier);
    }
    let Some(api_key) = config.api_key.clone() else {
        tracing::warn!("No classifier API key configured, fallback disabled");
        return Arc::new(DisabledClassifier);
    };
    match OpenAiClassifier::new(config, api_key, threshold) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            tracing::warn!("Failed to build classifier client, fallback disabled: {}", e);
            Arc::new(DisabledClassifier)
        }
    }
}
