use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 站点目前无法提供真实的预计送达日期，沿用观察到的固定值
pub const DELIVERY_DATE_PLACEHOLDER: &str = "10/10/2016";

/// 查询输入：姓名/公司名、税号、邮编
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub name: String,
    #[serde(alias = "cpf")]
    pub tax_id: String,
    #[serde(alias = "cep")]
    pub postal_code: String,
}

impl SearchCriteria {
    pub fn new(
        name: impl Into<String>,
        tax_id: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tax_id: tax_id.into(),
            postal_code: postal_code.into(),
        }
    }

    /// 三个字段都必须非空
    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("name", &self.name),
            ("tax_id", &self.tax_id),
            ("postal_code", &self.postal_code),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput { field });
            }
        }
        Ok(())
    }

    /// 按固定顺序返回输入值（用于生成文件名）
    pub fn values(&self) -> [&str; 3] {
        [&self.name, &self.tax_id, &self.postal_code]
    }
}

impl Display for SearchCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} / {}", self.name, self.tax_id, self.postal_code)
    }
}

/// 列表页中的一行：追踪编码 + 包裹标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    /// 从行 action 属性中取出的编码，用于拼接详情页 URL
    pub reference: String,
    pub package_label: String,
}

/// 包裹历史中的一条状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub date: String,
    pub status: String,
}

impl StatusEvent {
    pub fn new(date: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResult {
    pub delivery_date: String,
    pub package_id: String,
    /// 按页面渲染顺序排列，不重新排序
    pub status_list: Vec<StatusEvent>,
}

/// 一次查询的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub found_packages: bool,
    pub total_packages: usize,
    pub packages: Vec<PackageResult>,
}

impl QueryResult {
    /// 空结果：没有找到任何包裹
    pub fn empty() -> Self {
        Self::default()
    }

    /// 追加一个包裹，同步更新计数
    pub fn push_package(&mut self, package: PackageResult) {
        self.packages.push(package);
        self.total_packages = self.packages.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_shape() {
        let result = QueryResult::empty();
        assert!(!result.found_packages);
        assert_eq!(result.total_packages, 0);
        assert!(result.packages.is_empty());
    }

    #[test]
    fn test_push_package_keeps_total_in_sync() {
        let mut result = QueryResult::empty();
        result.push_package(PackageResult {
            delivery_date: DELIVERY_DATE_PLACEHOLDER.to_string(),
            package_id: "PKG-A".to_string(),
            status_list: vec![StatusEvent::new("01/01/2020", "Shipped")],
        });
        assert_eq!(result.total_packages, 1);
    }

    #[test]
    fn test_result_serializes_with_snake_case_keys() {
        let value = serde_json::to_value(QueryResult::empty()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "found_packages": false,
                "total_packages": 0,
                "packages": []
            })
        );
    }

    #[test]
    fn test_criteria_accepts_source_aliases() {
        let criteria: SearchCriteria = toml::from_str(
            r#"
            name = "Raony"
            cpf = "06908488462"
            cep = "50950005"
            "#,
        )
        .unwrap();
        assert_eq!(criteria, SearchCriteria::new("Raony", "06908488462", "50950005"));
    }

    #[test]
    fn test_criteria_validate_names_blank_field() {
        let criteria = SearchCriteria::new("Raony", " ", "50950005");
        match criteria.validate() {
            Err(AppError::InvalidInput { field }) => assert_eq!(field, "tax_id"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
