use crate::error::LoadError;
use crate::models::{CellValue, TabularUnit};
use csv::ReaderBuilder;

/// CSV 文件产生的表格单元名称
pub const CSV_UNIT_NAME: &str = "CSV";

/// 读取 CSV 字节: 首行为表头, 分隔符在 ',' 和 ';' 之间嗅探, 非 UTF-8 字节做有损替换
pub fn read_csv(bytes: &[u8]) -> Result<TabularUnit, LoadError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<CellValue> = record.iter().map(CellValue::infer).collect();
        if cells.iter().all(CellValue::is_absent) {
            continue;
        }
        grid.push(cells);
    }

    Ok(TabularUnit::from_grid(CSV_UNIT_NAME, header, grid))
}

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
