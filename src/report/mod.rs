pub mod export;
pub mod pdf;

pub use export::{to_csv, to_json};
pub use pdf::render_pdf;

use crate::models::QualifyingRecord;

/// 报告只使用姓名、证件号、数量; 缺失字段用占位符
pub fn report_lines(records: &[QualifyingRecord], placeholder: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "Nome: {} | CPF: {} | Quantidade: {}",
                r.name.as_deref().unwrap_or(placeholder),
                r.document.as_deref().unwrap_or(placeholder),
                r.quantity
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn absent_fields_use_placeholder() {
        let records = vec![QualifyingRecord {
            name: None,
            document: Some("111.222.333-44".into()),
            quantity: 3.5,
            source_unit: "CSV".into(),
            source_quantity_column: "Qtd".into(),
            extra: IndexMap::new(),
        }];
        assert_eq!(
            report_lines(&records, "-"),
            vec!["Nome: - | CPF: 111.222.333-44 | Quantidade: 3.5"]
        );
    }
}
