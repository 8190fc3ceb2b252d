use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 列的语义角色, 按列分配而非按单元格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Quantity,
    Name,
    Document,
    Unclassified,
}

/// 分类结果: 列名 -> 角色, 保持原始列序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRoles {
    roles: IndexMap<String, ColumnRole>,
}

impl ColumnRoles {
    /// 所有列初始为 Unclassified
    pub fn unclassified<'a>(columns: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            roles: columns
                .into_iter()
                .map(|c| (c.clone(), ColumnRole::Unclassified))
                .collect(),
        }
    }

    pub fn role_of(&self, column: &str) -> ColumnRole {
        self.roles
            .get(column)
            .copied()
            .unwrap_or(ColumnRole::Unclassified)
    }

    /// 仅给尚未分类的列赋予角色; 每列至多一个角色
    pub fn assign(&mut self, column: &str, role: ColumnRole) -> bool {
        match self.roles.get_mut(column) {
            Some(slot) if *slot == ColumnRole::Unclassified => {
                *slot = role;
                true
            }
            _ => false,
        }
    }

    pub fn has_role(&self, role: ColumnRole) -> bool {
        self.roles.values().any(|r| *r == role)
    }

    /// 按原始列序返回具有该角色的列
    pub fn columns_with(&self, role: ColumnRole) -> Vec<&str> {
        self.roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.roles.iter().map(|(c, r)| (c.as_str(), *r))
    }
}
