use crate::config::ExtractionConfig;
use crate::loader;
use crate::models::{ColumnRole, ResultSet, TabularUnit};
use crate::service::assembler::{assemble, AssemblyPlan};
use crate::service::columns::ColumnClassifier;
use crate::service::fallback::{self, ExternalClassifier};
use crate::service::filter::filter_qualifying;
use crate::service::patterns::Patterns;
use rayon::prelude::*;
use std::path::Path;

/// 抽取引擎: 列分类 -> 行过滤 -> 记录组装 -> (外部兜底合并)
///
/// 引擎不修改输入, 配置只读; 多个表格单元可以并行处理。
pub struct ExtractionEngine {
    config: ExtractionConfig,
    columns: ColumnClassifier,
    patterns: Patterns,
}

impl ExtractionEngine {
    pub fn new(config: ExtractionConfig) -> Self {
        let columns = ColumnClassifier::from_keywords(&config.keywords());
        Self {
            config,
            columns,
            patterns: Patterns::default(),
        }
    }

    /// 替换列分类规则或行级模式 (例如其他地区的证件格式)
    pub fn with_parts(config: ExtractionConfig, columns: ColumnClassifier, patterns: Patterns) -> Self {
        Self {
            config,
            columns,
            patterns,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// 单个表格单元的主流程
    ///
    /// 每个数量列独立过滤; 同一行在多个数量列下合格时会产生多条记录。
    pub fn extract_unit(&self, unit: &TabularUnit) -> ResultSet {
        let mut results = ResultSet::new();
        if unit.is_empty() {
            tracing::info!("Unit '{}' is empty, skipping", unit.name);
            return results;
        }

        let roles = self.columns.classify(unit);
        let quantity_columns = roles.columns_with(ColumnRole::Quantity);
        let name_columns = roles.columns_with(ColumnRole::Name);
        let document_columns = roles.columns_with(ColumnRole::Document);

        tracing::debug!(
            "Unit '{}': quantity {:?}, name {:?}, document {:?}",
            unit.name,
            quantity_columns,
            name_columns,
            document_columns
        );

        for quantity_column in &quantity_columns {
            let plan = AssemblyPlan {
                quantity_column,
                name_columns: &name_columns,
                document_columns: &document_columns,
            };
            let qualifying = filter_qualifying(unit, quantity_column, self.config.threshold);
            let before = results.len();
            for row_index in qualifying.iter().copied() {
                if let Some(record) = assemble(unit, row_index, &plan, &self.patterns) {
                    results.push(record);
                }
            }
            tracing::debug!(
                "Unit '{}' column '{}': {} rows over threshold, {} records",
                unit.name,
                quantity_column,
                qualifying.len(),
                results.len() - before
            );
        }

        results
    }

    /// 所有表格单元的主流程, 结果按单元顺序拼接
    pub fn extract(&self, units: &[TabularUnit]) -> ResultSet {
        let per_unit: Vec<ResultSet> = units.par_iter().map(|u| self.extract_unit(u)).collect();
        let mut results = ResultSet::new();
        for set in per_unit {
            results.extend(set);
        }
        tracing::info!("Primary pass: {} records from {} units", results.len(), units.len());
        results
    }

    /// 主流程 + 外部兜底合并
    pub async fn run(&self, units: &[TabularUnit], classifier: &dyn ExternalClassifier) -> ResultSet {
        let primary = self.extract(units);
        let sample = loader::sample_rows(units, self.config.sample_size);
        fallback::merge(primary, &sample, classifier, &self.config).await
    }

    /// 读取文件并执行主流程; 读取失败与"没有合格记录"一样返回空结果
    pub fn analyze_file(&self, path: &Path) -> ResultSet {
        match loader::load_units(path) {
            Ok(units) => self.extract(&units),
            Err(e) => {
                tracing::error!("Failed to analyze file {}: {}", path.display(), e);
                ResultSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::models::{Candidate, CellValue};
    use async_trait::async_trait;
    use serde_json::Value;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn engine() -> ExtractionEngine {
        ExtractionEngine::new(ExtractionConfig::default())
    }

    fn customers() -> TabularUnit {
        TabularUnit::from_grid(
            "CSV",
            vec!["Cliente".into(), "CPF".into(), "Qtd".into()],
            vec![
                vec![text("Ana"), text("111.222.333-44"), CellValue::Integer(3)],
                vec![text("Bruno"), text("555.666.777-88"), CellValue::Integer(1)],
            ],
        )
    }

    #[test]
    fn keyword_columns_scenario() {
        let results = engine().extract_unit(&customers());
        assert_eq!(results.len(), 1);
        let rec = &results.records()[0];
        assert_eq!(rec.name.as_deref(), Some("Ana"));
        assert_eq!(rec.document.as_deref(), Some("111.222.333-44"));
        assert_eq!(rec.quantity, 3.0);
        assert_eq!(rec.source_unit, "CSV");
        assert_eq!(rec.source_quantity_column, "Qtd");
        assert!(rec.extra.is_empty());
    }

    #[test]
    fn type_and_pattern_fallback_scenario() {
        let unit = TabularUnit::from_grid(
            "Planilha1",
            vec!["col1".into(), "col2".into()],
            vec![
                vec![text("Maria Souza"), CellValue::Integer(5)],
                vec![text("Jose Lima"), CellValue::Integer(1)],
                vec![text("x"), CellValue::Integer(2)],
            ],
        );
        let results = engine().extract_unit(&unit);
        assert_eq!(results.len(), 1);
        let rec = &results.records()[0];
        assert_eq!(rec.name.as_deref(), Some("Maria Souza"));
        assert_eq!(rec.quantity, 5.0);
        assert_eq!(rec.source_quantity_column, "col2");
    }

    #[test]
    fn row_without_identity_is_dropped() {
        let unit = TabularUnit::from_grid(
            "S",
            vec!["Produto".into(), "Qtd".into()],
            vec![vec![text("caneta azul"), CellValue::Integer(10)]],
        );
        assert!(engine().extract_unit(&unit).is_empty());
    }

    #[test]
    fn each_quantity_column_is_evaluated() {
        let unit = TabularUnit::from_grid(
            "S",
            vec!["Cliente".into(), "Qtd Jan".into(), "Qtd Fev".into()],
            vec![vec![text("Ana"), CellValue::Integer(3), CellValue::Integer(4)]],
        );
        let results = engine().extract_unit(&unit);
        assert_eq!(results.len(), 2);
        assert_eq!(results.records()[0].source_quantity_column, "Qtd Jan");
        assert_eq!(results.records()[0].extra["Qtd Fev"], "4");
        assert_eq!(results.records()[1].source_quantity_column, "Qtd Fev");
        assert_eq!(results.records()[1].extra["Qtd Jan"], "3");
    }

    #[test]
    fn threshold_comes_from_config() {
        let engine = ExtractionEngine::new(ExtractionConfig {
            threshold: 0.5,
            ..Default::default()
        });
        assert_eq!(engine.extract_unit(&customers()).len(), 2);
    }

    #[test]
    fn extraction_is_idempotent_and_ordered() {
        let mut second = customers();
        second.name = "Planilha2".into();
        let units = vec![customers(), second];
        let engine = engine();
        let first = engine.extract(&units);
        assert_eq!(first, engine.extract(&units));
        assert_eq!(first.records()[0].source_unit, "CSV");
        assert_eq!(first.records()[1].source_unit, "Planilha2");
    }

    #[test]
    fn unreadable_file_collapses_to_empty() {
        assert!(engine().analyze_file(Path::new("/nonexistent/vendas.xlsx")).is_empty());
    }

    struct Offline;

    #[async_trait]
    impl ExternalClassifier for Offline {
        async fn classify(&self, _sample: &[Value]) -> Result<Vec<Candidate>, ClassifierError> {
            Err(ClassifierError::Malformed("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn classifier_failure_keeps_primary_records() {
        let unit = TabularUnit::from_grid(
            "CSV",
            vec!["Cliente".into(), "Qtd".into()],
            vec![
                vec![text("Ana"), CellValue::Integer(3)],
                vec![text("Bia"), CellValue::Integer(4)],
            ],
        );
        let results = engine().run(&[unit], &Offline).await;
        assert_eq!(results.len(), 2);
    }
}
