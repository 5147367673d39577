// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use crate::domain::models::menu::{DailyMenu, Dish, Weekday};
use crate::domain::models::weekly_key::WeeklyKey;
use crate::domain::services::csv_validator::parse_records;

/// 把已存储的周菜单CSV按天分组为查询条目
///
/// 按表头定位列，宽松处理：星期不在周一至周五或菜名为空的行被跳过，
/// 无法解析的CSV不产生任何条目。每天一条，按首次出现的顺序排列。
pub fn group_daily_menus(
    key: &WeeklyKey,
    csv_text: &str,
    city: Option<&str>,
    area: Option<&str>,
) -> Vec<DailyMenu> {
    let Ok(records) = parse_records(csv_text) else {
        return Vec::new();
    };
    let Some((header, data)) = records.split_first() else {
        return Vec::new();
    };

    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let column = |record: &[String], name: &str| -> String {
        columns
            .get(name)
            .and_then(|&i| record.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let week = key.week_label();
    let city = city.filter(|c| !c.is_empty()).map(str::to_string);
    let area = area.filter(|a| !a.is_empty()).map(str::to_string);
    let mut menus: Vec<DailyMenu> = Vec::new();

    for record in data.iter().filter(|r| !r.is_empty()).map(Vec::as_slice) {
        let Ok(day) = column(record, "day").to_lowercase().parse::<Weekday>() else {
            continue;
        };
        let name = column(record, "lunch");
        if name.is_empty() {
            continue;
        }

        let dish = Dish {
            name,
            price: normalize_price(&column(record, "price")),
            tags: column(record, "tags")
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        };

        match menus.iter_mut().find(|m| m.day == day) {
            Some(menu) => menu.dishes.push(dish),
            None => menus.push(DailyMenu {
                restaurant_id: key.restaurant_id.clone(),
                sk: format!("MENU#{}#{}", week, day),
                week: week.clone(),
                day,
                dishes: vec![dish],
                city: city.clone(),
                area: area.clone(),
            }),
        }
    }

    menus
}

/// 只保留价格中的数字，没有数字时返回 `None`
pub fn normalize_price(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
