use crate::config::KeywordSet;
use crate::models::{CellValue, ColumnRole, ColumnRoles, TabularUnit};

/// 列分类规则, 按顺序应用; 规则只能给尚未分类的列赋值
pub trait ColumnRule: Send + Sync {
    fn apply(&self, unit: &TabularUnit, roles: &mut ColumnRoles);
}

/// 列名包含任一关键词 (不区分大小写的子串匹配)
pub struct KeywordRule {
    role: ColumnRole,
    keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(role: ColumnRole, keywords: &[String]) -> Self {
        Self {
            role,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl ColumnRule for KeywordRule {
    fn apply(&self, unit: &TabularUnit, roles: &mut ColumnRoles) {
        for column in unit.columns() {
            let lower = column.to_lowercase();
            if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
                roles.assign(column, self.role);
            }
        }
    }
}

/// 没有关键词命中数量列时, 所有纯数值列都视为数量候选
pub struct NumericFallbackRule;

impl ColumnRule for NumericFallbackRule {
    fn apply(&self, unit: &TabularUnit, roles: &mut ColumnRoles) {
        if roles.has_role(ColumnRole::Quantity) {
            return;
        }
        for column in unit.columns() {
            if is_uniformly_numeric(unit, column) {
                roles.assign(column, ColumnRole::Quantity);
            }
        }
    }
}

fn is_uniformly_numeric(unit: &TabularUnit, column: &str) -> bool {
    let mut present = unit
        .rows()
        .iter()
        .map(|r| r.get(column))
        .filter(|c| !c.is_absent())
        .peekable();
    present.peek().is_some() && present.all(CellValue::is_number)
}

/// 列分类器: 关键词优先, 类型兜底
pub struct ColumnClassifier {
    rules: Vec<Box<dyn ColumnRule>>,
}

impl ColumnClassifier {
    pub fn with_rules(rules: Vec<Box<dyn ColumnRule>>) -> Self {
        Self { rules }
    }

    /// 默认规则顺序: 数量关键词, 证件关键词, 姓名关键词, 数值兜底
    pub fn from_keywords(keywords: &KeywordSet) -> Self {
        Self::with_rules(vec![
            Box::new(KeywordRule::new(ColumnRole::Quantity, &keywords.quantity)),
            Box::new(KeywordRule::new(ColumnRole::Document, &keywords.document)),
            Box::new(KeywordRule::new(ColumnRole::Name, &keywords.name)),
            Box::new(NumericFallbackRule),
        ])
    }

    pub fn classify(&self, unit: &TabularUnit) -> ColumnRoles {
        let mut roles = ColumnRoles::unclassified(unit.columns());
        for rule in &self.rules {
            rule.apply(unit, &mut roles);
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    fn unit(columns: &[&str], rows: Vec<Vec<CellValue>>) -> TabularUnit {
        TabularUnit::from_grid(
            "Planilha1",
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn classifier() -> ColumnClassifier {
        ColumnClassifier::from_keywords(&KeywordSet::portuguese())
    }

    #[test]
    fn keyword_matches_are_case_insensitive_substrings() {
        let u = unit(&["Nome do Cliente", "CPF", "QTD Comprada", "Cidade"], vec![]);
        let roles = classifier().classify(&u);
        assert_eq!(roles.role_of("Nome do Cliente"), ColumnRole::Name);
        assert_eq!(roles.role_of("CPF"), ColumnRole::Document);
        assert_eq!(roles.role_of("QTD Comprada"), ColumnRole::Quantity);
        assert_eq!(roles.role_of("Cidade"), ColumnRole::Unclassified);
    }

    #[test]
    fn several_columns_may_share_a_role() {
        let u = unit(&["Quantidade Jan", "Quantidade Fev", "Unidades"], vec![]);
        let roles = classifier().classify(&u);
        assert_eq!(
            roles.columns_with(ColumnRole::Quantity),
            vec!["Quantidade Jan", "Quantidade Fev", "Unidades"]
        );
    }

    #[test]
    fn a_column_holds_one_role() {
        let u = unit(&["Documento do cliente"], vec![]);
        let roles = classifier().classify(&u);
        assert_eq!(roles.role_of("Documento do cliente"), ColumnRole::Document);
        assert!(roles.columns_with(ColumnRole::Name).is_empty());
    }

    #[test]
    fn numeric_fallback_without_quantity_keyword() {
        let u = unit(
            &["col1", "col2", "col3"],
            vec![
                vec![CellValue::Text("Maria Souza".into()), CellValue::Integer(5), CellValue::Integer(1)],
                vec![CellValue::Text("Pedro".into()), CellValue::Float(1.5), CellValue::Text("x".into())],
                vec![CellValue::Absent, CellValue::Absent, CellValue::Integer(2)],
            ],
        );
        let roles = classifier().classify(&u);
        assert_eq!(roles.columns_with(ColumnRole::Quantity), vec!["col2"]);
    }

    #[test]
    fn numeric_fallback_skipped_when_keyword_matched() {
        let u = unit(
            &["Qtd", "Valor"],
            vec![vec![CellValue::Integer(3), CellValue::Float(9.9)]],
        );
        let roles = classifier().classify(&u);
        assert_eq!(roles.columns_with(ColumnRole::Quantity), vec!["Qtd"]);
    }

    #[test]
    fn numeric_fallback_ignores_columns_with_other_roles_and_empty_columns() {
        let mut row = Row::new();
        row.insert("CPF", CellValue::Integer(11122233344));
        row.insert("Total", CellValue::Integer(4));
        let u = TabularUnit::new(
            "S",
            vec!["CPF".into(), "Total".into(), "Vazia".into()],
            vec![row],
        );
        let roles = classifier().classify(&u);
        assert_eq!(roles.role_of("CPF"), ColumnRole::Document);
        assert_eq!(roles.columns_with(ColumnRole::Quantity), vec!["Total"]);
    }

    #[test]
    fn custom_rules_replace_the_default_order() {
        let c = ColumnClassifier::with_rules(vec![Box::new(KeywordRule::new(
            ColumnRole::Name,
            &["cliente".to_string()],
        ))]);
        let roles = c.classify(&unit(&["Cliente", "Qtd"], vec![]));
        assert_eq!(roles.role_of("Cliente"), ColumnRole::Name);
        assert_eq!(roles.role_of("Qtd"), ColumnRole::Unclassified);
    }
}
