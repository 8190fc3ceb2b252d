use regex::Regex;

/// 行级自由文本模式: 没有姓名列/证件列时用于逐单元格识别
#[derive(Debug, Clone)]
pub struct Patterns {
    name: Regex,
    document: Regex,
    min_name_len: usize,
}

impl Patterns {
    pub fn new(name: Regex, document: Regex, min_name_len: usize) -> Self {
        Self {
            name,
            document,
            min_name_len,
        }
    }

    /// 首字母大写, 之后只有字母和空格, 长度大于 3
    pub fn looks_like_name(&self, text: &str) -> bool {
        text.chars().count() > self.min_name_len && self.name.is_match(text)
    }

    /// CPF: 11 位数字, 可写作 ddd.ddd.ddd-dd (点和横线可省略)
    pub fn looks_like_document(&self, text: &str) -> bool {
        self.document.is_match(text)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new(
            Regex::new(r"^\p{Lu}[\p{L}\s]+$").expect("name pattern is valid"),
            Regex::new(r"^[0-9]{3}\.?[0-9]{3}\.?[0-9]{3}-?[0-9]{2}$").expect("document pattern is valid"),
            3,
        )
    }
}
