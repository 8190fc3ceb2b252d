use crate::error::LoadError;
use crate::models::{CellValue, TabularUnit};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 读取工作簿, 每个非空工作表一个表格单元; 单个工作表读取失败时跳过
pub fn read_workbook(path: &Path) -> Result<Vec<TabularUnit>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let mut units = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = match workbook.worksheet_range(sheet_name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("Sheet '{}' in {} unreadable, skipping: {}", sheet_name, path.display(), e);
                continue;
            }
        };

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            tracing::info!("Sheet '{}' is empty, skipping", sheet_name);
            continue;
        };
        let header: Vec<String> = header_row.iter().map(header_text).collect();

        let grid: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
            .filter(|cells| !cells.iter().all(CellValue::is_absent))
            .collect();

        let unit = TabularUnit::from_grid(sheet_name.clone(), header, grid);
        if unit.is_empty() {
            tracing::info!("Sheet '{}' has no data rows, skipping", sheet_name);
            continue;
        }
        units.push(unit);
    }

    Ok(units)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => match convert_cell(other).display() {
            Some(s) => s,
            None => other.to_string(),
        },
    }
}

/// 整数值的浮点单元格按整数处理
pub(crate) fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Absent,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) if f.is_finite() => CellValue::Float(*f),
        Data::Float(_) => CellValue::Absent,
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Absent,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Absent),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_calamine_cells() {
        assert_eq!(convert_cell(&Data::Float(3.0)), CellValue::Integer(3));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Absent);
        assert_eq!(convert_cell(&Data::Empty), CellValue::Absent);
        assert_eq!(
            convert_cell(&Data::String("Ana".into())),
            CellValue::Text("Ana".into())
        );
    }

    #[test]
    fn header_uses_display_text() {
        assert_eq!(header_text(&Data::String(" Qtd ".into())), "Qtd");
        assert_eq!(header_text(&Data::Float(2024.0)), "2024");
        assert_eq!(header_text(&Data::Empty), "");
    }
}
