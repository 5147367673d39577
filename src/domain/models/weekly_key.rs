// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WEEKLY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^weekly/year=([0-9]{4})/week=([0-9]{2})/([^/]+)\.csv$")
        .expect("weekly key pattern is valid")
});

/// 周菜单存储键
///
/// 形如 `weekly/year=2024/week=02/acme-bistro.csv`，年与周均为ISO-8601周历。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyKey {
    /// 4位ISO年份
    pub year: String,
    /// 2位补零ISO周数
    pub week: String,
    pub restaurant_id: String,
}

impl WeeklyKey {
    /// 根据日期所在的ISO周创建存储键
    ///
    /// 十二月末的日期可能属于下一年的第1周，一月初的日期可能属于上一年的最后一周。
    pub fn for_date(restaurant_id: impl Into<String>, date: DateTime<Utc>) -> Self {
        let iso = date.iso_week();
        Self {
            year: format!("{:04}", iso.year()),
            week: format!("{:02}", iso.week()),
            restaurant_id: restaurant_id.into(),
        }
    }

    /// 生成存储键字符串，未指定日期时使用当前UTC时间
    pub fn build(restaurant_id: &str, date: Option<DateTime<Utc>>) -> String {
        Self::for_date(restaurant_id, date.unwrap_or_else(Utc::now)).to_string()
    }

    /// 严格解析存储键，任何偏差都返回 `None`
    pub fn parse(key: &str) -> Option<Self> {
        let caps = WEEKLY_KEY_RE.captures(key)?;
        let week = &caps[2];
        let week_number: u32 = week.parse().ok()?;
        if !(1..=53).contains(&week_number) {
            return None;
        }

        Some(Self {
            year: caps[1].to_string(),
            week: week.to_string(),
            restaurant_id: caps[3].to_string(),
        })
    }

    /// 查询接口使用的周标签，形如 `2024_02`
    pub fn week_label(&self) -> String {
        format!("{}_{}", self.year, self.week)
    }
}

impl fmt::Display for WeeklyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weekly/year={}/week={}/{}.csv",
            self.year, self.week, self.restaurant_id
        )
    }
}

#[cfg(test)]
#[path = "weekly_key_test.rs"]
mod tests;
