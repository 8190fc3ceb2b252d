use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub extraction: ExtractionConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: 16 * 1024 * 1024,
            allowed_extensions: vec!["xlsx".into(), "xls".into(), "csv".into()],
        }
    }
}

impl UploadConfig {
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self
                .allowed_extensions
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// 列分类关键词 (小写, 子串匹配)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
    pub quantity: Vec<String>,
    pub name: Vec<String>,
    pub document: Vec<String>,
}

impl KeywordSet {
    /// 巴西葡语导出文件 (含常见英文列名)
    pub fn portuguese() -> Self {
        Self {
            quantity: words(&["quant", "qtd", "unid"]),
            name: words(&["client", "nome", "customer", "comprador", "destinatário", "usuário"]),
            document: words(&["cpf", "documento", "doc"]),
        }
    }

    pub fn english() -> Self {
        Self {
            quantity: words(&["quant", "qty", "units", "amount"]),
            name: words(&["client", "customer", "name", "buyer", "recipient", "user"]),
            document: words(&["document", "doc", "id number", "ssn", "cpf"]),
        }
    }

    pub fn for_locale(locale: &str) -> Self {
        match locale.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Self::english(),
            _ => Self::portuguese(),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// 抽取引擎配置, 显式传入引擎
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub locale: String,
    /// 覆盖 locale 预设的关键词, 未设置的角色沿用预设
    pub quantity_keywords: Option<Vec<String>>,
    pub name_keywords: Option<Vec<String>>,
    pub document_keywords: Option<Vec<String>>,
    /// 合格阈值 (严格大于)
    pub threshold: f64,
    /// 主流程结果少于此数时调用外部分类服务
    pub fallback_trigger: usize,
    /// 每个表格单元发送的样本行数
    pub sample_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            quantity_keywords: None,
            name_keywords: None,
            document_keywords: None,
            threshold: 2.0,
            fallback_trigger: 5,
            sample_size: 50,
        }
    }
}

impl ExtractionConfig {
    /// 报告标题和提示词中的阈值文本 (2 而不是 2.0)
    pub fn threshold_label(&self) -> String {
        if self.threshold.fract() == 0.0 && self.threshold.abs() < 1e15 {
            format!("{}", self.threshold as i64)
        } else {
            self.threshold.to_string()
        }
    }

    pub fn keywords(&self) -> KeywordSet {
        let preset = KeywordSet::for_locale(&self.locale);
        let lower = |list: &Option<Vec<String>>, fallback: Vec<String>| match list {
            Some(words) => words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect::<Vec<String>>(),
            None => fallback,
        };
        KeywordSet {
            quantity: lower(&self.quantity_keywords, preset.quantity),
            name: lower(&self.name_keywords, preset.name),
            document: lower(&self.document_keywords, preset.document),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.3,
        }
    }
}

// 日志中不输出 API key
impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub placeholder: String,
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            placeholder: "N/A".to_string(),
            title: "Relatório de Clientes com Quantidade > {threshold}".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> extractor.toml (可选) -> EXTRACTOR__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: AppConfig = Config::builder()
            .add_source(File::with_name("extractor").required(false))
            .add_source(
                Environment::with_prefix("EXTRACTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_extensions")
                    .with_list_parse_key("extraction.quantity_keywords")
                    .with_list_parse_key("extraction.name_keywords")
                    .with_list_parse_key("extraction.document_keywords"),
            )
            .build()?
            .try_deserialize()?;

        if config.classifier.api_key.is_none() {
            config.classifier.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(config)
    }

    /// 从环境变量加载配置, 失败时退回默认值
    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            let mut config = Self::default();
            config.classifier.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
            config
        })
    }
}
