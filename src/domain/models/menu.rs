// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 菜单CSV的固定表头
pub const MENU_CSV_HEADER: [&str; 4] = ["day", "lunch", "price", "tags"];

/// 标签之间的分隔符
pub const TAG_SEPARATOR: &str = " | ";

/// 工作日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 非法工作日代码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidWeekday(pub String);

impl FromStr for Weekday {
    type Err = InvalidWeekday;

    /// 仅接受小写三字母代码
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| InvalidWeekday(s.to_string()))
    }
}

/// 菜单数据行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRow {
    pub day: Weekday,
    pub lunch: String,
    pub price: Option<f64>,
    /// 标签保持原有顺序
    pub tags: Vec<String>,
}

/// 通过校验的菜单CSV文档
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MenuCsvDocument {
    pub rows: Vec<MenuRow>,
}

impl MenuCsvDocument {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// 单道菜
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    pub tags: Vec<String>,
}

/// 某餐厅某周某天的菜单条目
///
/// 查询接口按 `sk = MENU#<year>_<week>#<day>` 读取。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMenu {
    pub restaurant_id: String,
    pub sk: String,
    pub week: String,
    pub day: Weekday,
    pub dishes: Vec<Dish>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}
