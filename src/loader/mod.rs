pub mod delimited;
pub mod workbook;

pub use delimited::{read_csv, CSV_UNIT_NAME};
pub use workbook::read_workbook;

use crate::error::LoadError;
use crate::models::TabularUnit;
use serde_json::Value;
use std::path::Path;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// 按扩展名读取文件为表格单元; 空的表格单元被丢弃
pub fn load_units(path: &Path) -> Result<Vec<TabularUnit>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let units = if ext == "csv" {
        let bytes = std::fs::read(path)?;
        vec![read_csv(&bytes)?]
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook(path)?
    } else {
        return Err(LoadError::UnsupportedType(ext));
    };

    Ok(units.into_iter().filter(|u| !u.is_empty()).collect())
}

/// 外部分类服务的样本: 每个表格单元前 n 行, 按单元顺序拼接
pub fn sample_rows(units: &[TabularUnit], n: usize) -> Vec<Value> {
    units.iter().flat_map(|u| u.sample(n)).collect()
}
