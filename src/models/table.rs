use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// 单元格值 (缺失的单元格统一为 Absent)
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Absent,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

static ABSENT: CellValue = CellValue::Absent;

impl CellValue {
    /// 从文本推断类型: 空白 -> Absent, 整数 -> Integer, 其他数值 -> Float, 否则 Text
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Absent;
        }
        // 前导零的数字串 (如证件号) 保留为文本
        if trimmed.len() > 1 && trimmed.starts_with('0') && !trimmed.starts_with("0.") {
            return CellValue::Text(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => CellValue::Float(f),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 转为数值; 无法解析视为缺失 (不是 0, 也不是错误)
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Float(f) => *f,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// 非空展示文本; Absent 或去空白后为空返回 None
    pub fn display(&self) -> Option<String> {
        let s = match self {
            CellValue::Absent => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        (!s.is_empty()).then_some(s)
    }

    /// 发送给外部分类服务的 JSON 形式
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Absent => Value::Null,
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Boolean(b) => Value::Bool(*b),
            CellValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// 浮点数保留一位小数的整数形式 (3.0 而不是 3), 与整数列区分
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

/// 一行数据: 列名 -> 单元格值, 不要求完整
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// 缺失的列返回 Absent
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&ABSENT)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// 表格单元: 一个工作表或一个 CSV
#[derive(Debug, Clone, PartialEq)]
pub struct TabularUnit {
    pub name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularUnit {
    /// 列名会被去重 (重复列追加 .1, .2 ...), 空列名记为 "Unnamed: {i}"
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns: unique_column_names(columns),
            rows,
        }
    }

    /// 由按位置排列的单元格构造, 行长度不足的补 Absent, 多余的丢弃
    pub fn from_grid(name: impl Into<String>, header: Vec<String>, grid: Vec<Vec<CellValue>>) -> Self {
        let columns = unique_column_names(header);
        let rows: Vec<Row> = grid
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .cloned()
                    .zip(cells.into_iter().chain(std::iter::repeat(CellValue::Absent)))
                    .filter(|(_, v)| !v.is_absent())
                    .collect::<Row>()
            })
            .collect();
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// 前 n 行, 以 JSON 对象形式 (列序保持)
    pub fn sample(&self, n: usize) -> Vec<Value> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                let obj: serde_json::Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).to_json()))
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }
}

fn unique_column_names(columns: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(columns.len());
    for (idx, col) in columns.into_iter().enumerate() {
        let base = if col.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            col
        };
        let mut name = base.clone();
        while taken.contains(&name) {
            let n = suffixes.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{}.{}", base, n);
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types_cells() {
        assert_eq!(CellValue::infer("  "), CellValue::Absent);
        assert_eq!(CellValue::infer("3"), CellValue::Integer(3));
        assert_eq!(CellValue::infer("2.5"), CellValue::Float(2.5));
        assert_eq!(CellValue::infer("0.5"), CellValue::Float(0.5));
        assert_eq!(CellValue::infer("Ana"), CellValue::Text("Ana".into()));
        assert_eq!(
            CellValue::infer("01234567890"),
            CellValue::Text("01234567890".into())
        );
        assert_eq!(CellValue::infer("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn non_numeric_text_has_no_number() {
        assert_eq!(CellValue::Text("abc".into()).to_number(), None);
        assert_eq!(CellValue::Text(" 4.5 ".into()).to_number(), Some(4.5));
        assert_eq!(CellValue::Text("inf".into()).to_number(), None);
        assert_eq!(CellValue::Boolean(true).to_number(), None);
        assert_eq!(CellValue::Absent.to_number(), None);
    }

    #[test]
    fn display_skips_blank_text() {
        assert_eq!(CellValue::Text("   ".into()).display(), None);
        assert_eq!(CellValue::Float(3.0).display().as_deref(), Some("3.0"));
        assert_eq!(CellValue::Integer(3).display().as_deref(), Some("3"));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let unit = TabularUnit::new(
            "S",
            vec!["a".into(), "a".into(), "".into(), "a".into()],
            vec![],
        );
        assert_eq!(unit.columns(), &["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn ragged_grid_fills_absent() {
        let unit = TabularUnit::from_grid(
            "S",
            vec!["x".into(), "y".into()],
            vec![vec![CellValue::Integer(1)]],
        );
        assert_eq!(unit.rows()[0].get("y"), &CellValue::Absent);
        assert_eq!(unit.sample(10)[0]["y"], Value::Null);
    }
}
