// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含队列消息与对象事件等外部输入的数据传输对象
pub mod dto;
