use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::models::Candidate;
use crate::service::fallback::{parse_candidates, ExternalClassifier};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "Você é um assistente especializado em análise de dados de arquivos Excel.";

/// 通过 chat-completions 接口识别候选客户; 单次请求, 不重试
pub struct OpenAiClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiClassifier {
    pub fn new(config: &ClassifierConfig, api_key: String, threshold: String) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            threshold,
        })
    }

    fn prompt(&self, sample: &[Value]) -> String {
        let data = serde_json::to_string_pretty(sample).unwrap_or_else(|_| "[]".to_string());
        let threshold = &self.threshold;
        format!(
            r#"Analise os seguintes dados de um arquivo Excel e identifique clientes com quantidade maior que {threshold}.
Para cada cliente identificado, extraia o nome e CPF (se disponível).

Dados:
{data}

Retorne apenas os clientes com quantidade maior que {threshold} no formato JSON:
[
    {{"nome": "Nome do Cliente", "cpf": "CPF se disponível", "quantidade": valor}}
]"#
        )
    }
}

#[async_trait]
impl ExternalClassifier for OpenAiClassifier {
    async fn classify(&self, sample: &[Value]) -> Result<Vec<Candidate>, ClassifierError> {
        tracing::info!("[Classifier] Sending {} rows to model {}", sample.len(), self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": self.prompt(sample)}
                ],
                "temperature": self.temperature
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ClassifierError::Malformed(format!("response envelope: {}", e)))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::Malformed("no content in response".to_string()))?;

        let candidates = candidates_from_content(&content)?;
        tracing::info!("[Classifier] Received {} candidates", candidates.len());
        Ok(candidates)
    }
}

/// 从模型回复中取出 JSON 数组: 先找第一个 '[' 到最后一个 ']', 否则整体解析
pub fn candidates_from_content(content: &str) -> Result<Vec<Candidate>, ClassifierError> {
    let array = Regex::new(r"(?s)\[.*\]").map_err(|e| ClassifierError::Malformed(e.to_string()))?;
    let raw = array.find(content).map(|m| m.as_str()).unwrap_or(content);
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ClassifierError::Malformed(format!("candidate list: {}", e)))?;
    Ok(parse_candidates(&value))
}
