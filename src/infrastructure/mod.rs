// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 指标（metrics）：Prometheus导出器与指标注册
/// - 密钥（secrets）：密钥存储的文件系统与内存实现
/// - 存储（storage）：对象存储的S3、本地文件与内存实现
///
/// 基础设施层遵循依赖倒置原则，依赖于领域层的抽象接口。
pub mod metrics;
pub mod secrets;
pub mod storage;
