use crate::models::{CellValue, QualifyingRecord, Row, TabularUnit};
use crate::service::patterns::Patterns;
use indexmap::IndexMap;

/// 组装一条记录所需的列信息
pub struct AssemblyPlan<'a> {
    pub quantity_column: &'a str,
    pub name_columns: &'a [&'a str],
    pub document_columns: &'a [&'a str],
}

/// 组装合格行的记录; 姓名和证件号都缺失时返回 None
pub fn assemble(
    unit: &TabularUnit,
    row_index: usize,
    plan: &AssemblyPlan<'_>,
    patterns: &Patterns,
) -> Option<QualifyingRecord> {
    let row = unit.rows().get(row_index)?;
    let quantity = row.get(plan.quantity_column).to_number()?;

    let name = if plan.name_columns.is_empty() {
        scan_row(unit, row, |s| patterns.looks_like_name(s))
    } else {
        first_present(row, plan.name_columns)
    };
    let document = if plan.document_columns.is_empty() {
        scan_row(unit, row, |s| patterns.looks_like_document(s))
    } else {
        first_present(row, plan.document_columns)
    };

    if name.is_none() && document.is_none() {
        return None;
    }

    let consumed = [
        Some(plan.quantity_column),
        name.as_ref().map(|(col, _)| col.as_str()),
        document.as_ref().map(|(col, _)| col.as_str()),
    ];
    let extra: IndexMap<String, String> = unit
        .columns()
        .iter()
        .filter(|c| !consumed.iter().any(|used| *used == Some(c.as_str())))
        .filter_map(|c| extra_value(row.get(c)).map(|v| (c.clone(), v)))
        .collect();

    Some(QualifyingRecord {
        name: name.map(|(_, v)| v),
        document: document.map(|(_, v)| v),
        quantity,
        source_unit: unit.name.clone(),
        source_quantity_column: plan.quantity_column.to_string(),
        extra,
    })
}

/// 按列序取第一个非空单元格 -> (列名, 值)
fn first_present(row: &Row, columns: &[&str]) -> Option<(String, String)> {
    columns
        .iter()
        .find_map(|c| row.get(c).display().map(|v| (c.to_string(), v)))
}

/// 扫描整行的文本单元格, 取第一个匹配模式的
fn scan_row(unit: &TabularUnit, row: &Row, matches: impl Fn(&str) -> bool) -> Option<(String, String)> {
    unit.columns().iter().find_map(|c| {
        row.get(c)
            .as_text()
            .filter(|s| matches(s))
            .map(|s| (c.clone(), s.trim().to_string()))
    })
}

/// 只有文本、整数、浮点进入 extra
fn extra_value(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(_) | CellValue::Integer(_) | CellValue::Float(_) => cell.display(),
        _ => None,
    }
}
