// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 餐厅上下文（restaurant）：每次抽取调用携带的餐厅信息
/// - 抽取请求（extraction）：抽取任务与发送给模型的请求
/// - 菜单（menu）：校验后的菜单行与按天分组的菜单条目
/// - 周存储键（weekly_key）：按ISO周生成和解析的存储路径
pub mod extraction;
pub mod menu;
pub mod restaurant;
pub mod weekly_key;
