use crate::error::ReportError;
use crate::models::{table::format_float, QualifyingRecord};

/// 下载用的 JSON (缩进格式)
pub fn to_json(records: &[QualifyingRecord]) -> Result<Vec<u8>, ReportError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// 扁平 CSV, extra 以 JSON 对象字符串写入一列
pub fn to_csv(records: &[QualifyingRecord]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "document", "quantity", "sourceUnit", "sourceQuantityColumn", "extra"])?;
    for r in records {
        let extra = serde_json::to_string(&r.extra)?;
        writer.write_record([
            r.name.as_deref().unwrap_or_default(),
            r.document.as_deref().unwrap_or_default(),
            format_float(r.quantity).as_str(),
            r.source_unit.as_str(),
            r.source_quantity_column.as_str(),
            extra.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Buffer(e.to_string()))
}
