use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 外部分类服务返回的候选记录所标注的来源
pub const FALLBACK_SOURCE_UNIT: &str = "external-classifier";
pub const FALLBACK_QUANTITY_COLUMN: &str = "quantity";

/// 合格记录: 至少带有姓名或证件号之一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifyingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub quantity: f64,
    pub source_unit: String,
    pub source_quantity_column: String,
    #[serde(default)]
    pub extra: IndexMap<String, String>,
}

impl QualifyingRecord {
    /// 结构相等: 姓名、证件号、数量完全一致 (不做模糊匹配)
    pub fn same_identity(&self, other: &QualifyingRecord) -> bool {
        self.name == other.name && self.document == other.document && self.quantity == other.quantity
    }

    pub fn has_identity(&self) -> bool {
        self.name.is_some() || self.document.is_some()
    }
}

/// 外部分类服务的候选记录 {name?, document?, quantity}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: Option<String>,
    pub document: Option<String>,
    pub quantity: f64,
}

impl Candidate {
    pub fn into_record(self) -> QualifyingRecord {
        QualifyingRecord {
            name: self.name,
            document: self.document,
            quantity: self.quantity,
            source_unit: FALLBACK_SOURCE_UNIT.to_string(),
            source_quantity_column: FALLBACK_QUANTITY_COLUMN.to_string(),
            extra: IndexMap::new(),
        }
    }
}

/// 有序结果集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<QualifyingRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[QualifyingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<QualifyingRecord> {
        self.records
    }

    /// 主流程追加, 不去重 (同一行在多个数量列下可以产生多条记录)
    pub fn push(&mut self, record: QualifyingRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, other: ResultSet) {
        self.records.extend(other.records);
    }

    pub fn contains_identity(&self, record: &QualifyingRecord) -> bool {
        self.records.iter().any(|r| r.same_identity(record))
    }

    /// 去重追加; 已有结构相等的记录时返回 false
    pub fn push_unique(&mut self, record: QualifyingRecord) -> bool {
        if self.contains_identity(&record) {
            return false;
        }
        self.records.push(record);
        true
    }
}

impl From<Vec<QualifyingRecord>> for ResultSet {
    fn from(records: Vec<QualifyingRecord>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, document: Option<&str>, quantity: f64) -> QualifyingRecord {
        QualifyingRecord {
            name: name.map(String::from),
            document: document.map(String::from),
            quantity,
            source_unit: "CSV".into(),
            source_quantity_column: "Qtd".into(),
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn identity_ignores_provenance() {
        let a = record(Some("Ana"), None, 3.0);
        let mut b = record(Some("Ana"), None, 3.0);
        b.source_unit = "Planilha1".into();
        b.extra.insert("Cidade".into(), "Recife".into());
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&record(Some("Ana"), None, 3.5)));
    }

    #[test]
    fn push_unique_rejects_duplicates() {
        let mut set = ResultSet::from(vec![record(Some("Ana"), Some("1"), 3.0)]);
        assert!(!set.push_unique(record(Some("Ana"), Some("1"), 3.0)));
        assert!(set.push_unique(record(Some("Ana"), None, 3.0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_camel_case_without_absent_fields() {
        let json = serde_json::to_value(record(None, Some("111.222.333-44"), 3.0)).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["document"], "111.222.333-44");
        assert_eq!(json["sourceUnit"], "CSV");
        assert_eq!(json["sourceQuantityColumn"], "Qtd");
        assert!(json["extra"].as_object().unwrap().is_empty());
    }
}
