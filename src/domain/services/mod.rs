// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含菜单抽取流水线的核心业务逻辑。
///
/// 包含的服务：
/// - 文本规范化（html_normalizer）：把原始HTML转换为紧凑纯文本
/// - 提示词（prompts）：系统提示词与任务提示词
/// - 请求构建（request_builder）：组装模型请求并解析token上限
/// - 响应文本（response_text）：按固定顺序从多种响应形状中提取文本
/// - LLM服务（llm_service）：调用模型接口的抽取客户端
/// - CSV校验（csv_validator）：严格校验模型输出的菜单CSV
/// - 凭据（credential_provider）：解析并缓存模型API密钥
/// - 菜单导入（menu_import）：把周菜单CSV按天分组为查询条目
pub mod credential_provider;
pub mod csv_validator;
pub mod html_normalizer;
pub mod llm_service;
pub mod menu_import;
pub mod prompts;
pub mod request_builder;
pub mod response_text;
