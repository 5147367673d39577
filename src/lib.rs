// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含队列消息与对象事件的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含菜单抽取的核心实体、服务、仓库接口和用例
pub mod domain;

/// 引擎模块
///
/// 实现餐厅网页抓取
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如对象存储、密钥存储与指标导出
pub mod infrastructure;

/// 工具模块
///
/// 提供错误类型与日志初始化
pub mod utils;

/// 工作器模块
///
/// 处理队列消息与对象事件批次
pub mod workers;
