// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义队列消息和对象创建事件，在外部输入与领域模型之间传输数据
pub mod menu_message;
