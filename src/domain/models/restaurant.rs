// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 餐厅上下文
///
/// 每次抽取调用时由调用方提供的字段构造，核心流程从不持久化它。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantContext {
    /// 餐厅唯一标识符（非空）
    pub restaurant_id: String,
    /// 餐厅网页地址
    pub restaurant_url: String,
    /// 城市，可能为空
    pub city: String,
    /// 区域，可能为空
    pub area: String,
}

impl RestaurantContext {
    /// 创建新的餐厅上下文
    pub fn new(
        restaurant_id: impl Into<String>,
        restaurant_url: impl Into<String>,
        city: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            restaurant_url: restaurant_url.into(),
            city: city.into(),
            area: area.into(),
        }
    }

    /// 仅包含餐厅ID的上下文（图片上传路径使用）
    pub fn for_restaurant(restaurant_id: impl Into<String>) -> Self {
        Self::new(restaurant_id, "", "", "")
    }
}
