// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 把队列消息与对象创建事件批次交给菜单抽取用例处理
pub mod menu_worker;

pub use menu_worker::MenuWorker;
