use crate::models::TabularUnit;

/// 数量列上严格大于阈值的行号; 无法转为数值的单元格视为缺失, 不参与判断
pub fn filter_qualifying(unit: &TabularUnit, quantity_column: &str, threshold: f64) -> Vec<usize> {
    unit.rows()
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| match row.get(quantity_column).to_number() {
            Some(v) if v > threshold => Some(idx),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn quantities(values: Vec<CellValue>) -> TabularUnit {
        TabularUnit::from_grid(
            "S",
            vec!["Qtd".into()],
            values.into_iter().map(|v| vec![v]).collect(),
        )
    }

    #[test]
    fn threshold_is_exclusive() {
        let u = quantities(vec![
            CellValue::Integer(2),
            CellValue::Float(2.0000001),
            CellValue::Integer(3),
            CellValue::Float(1.0),
        ]);
        assert_eq!(filter_qualifying(&u, "Qtd", 2.0), vec![1, 2]);
    }

    #[test]
    fn unparseable_cells_never_qualify() {
        let u = quantities(vec![
            CellValue::Text("muitos".into()),
            CellValue::Text(" 7 ".into()),
            CellValue::Absent,
            CellValue::Boolean(true),
        ]);
        assert_eq!(filter_qualifying(&u, "Qtd", 2.0), vec![1]);
    }

    #[test]
    fn threshold_is_configurable() {
        let u = quantities(vec![CellValue::Integer(3), CellValue::Integer(10)]);
        assert_eq!(filter_qualifying(&u, "Qtd", 5.0), vec![1]);
        assert_eq!(filter_qualifying(&u, "Qtd", -1.0), vec![0, 1]);
    }

    #[test]
    fn missing_column_yields_nothing() {
        let u = quantities(vec![CellValue::Integer(9)]);
        assert!(filter_qualifying(&u, "Outra", 2.0).is_empty());
    }
}
