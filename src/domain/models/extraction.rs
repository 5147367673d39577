// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use serde_json::{json, Value};

use super::restaurant::RestaurantContext;

/// 抽取任务
///
/// 每次调用只携带一种载荷。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionTask {
    /// 网页文本（已规范化或原始HTML）
    Html(String),
    /// 菜单图片原始字节
    Image(Vec<u8>),
}

impl ExtractionTask {
    /// 任务类型
    pub fn kind(&self) -> TaskKind {
        match self {
            ExtractionTask::Html(_) => TaskKind::Html,
            ExtractionTask::Image(_) => TaskKind::Image,
        }
    }
}

/// 任务类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Html,
    Image,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Html => "html",
            TaskKind::Image => "image",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求载荷
///
/// 图片以base64编码连同字节长度发送，从不直接嵌入原始字节。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Text(String),
    Image {
        image_bytes_base64: String,
        image_bytes_len: usize,
    },
}

/// 模型请求
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub model: String,
    pub max_output_tokens: u32,
    pub system_prompt: String,
    pub task_prompt: String,
    pub context: RestaurantContext,
    pub payload: RequestPayload,
    pub task: TaskKind,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl ExtractionRequest {
    /// 序列化为模型接口的JSON请求体
    ///
    /// 用户消息内容是 `{prompt, context, payload}` 的JSON字符串；
    /// 未配置的采样参数不会出现在请求体中。
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        let user_content = serde_json::to_string(&json!({
            "prompt": self.task_prompt,
            "context": self.context,
            "payload": self.payload,
        }))?;

        let mut body = json!({
            "model": self.model,
            "max_output_tokens": self.max_output_tokens,
            "text": { "format": { "type": "text" } },
            "input": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": user_content },
            ],
            "metadata": {
                "task": self.task.as_str(),
                "restaurant_id": self.context.restaurant_id,
            },
        });

        if let Some(map) = body.as_object_mut() {
            if let Some(temperature) = self.temperature {
                map.insert("temperature".to_string(), json!(temperature));
            }
            if let Some(top_p) = self.top_p {
                map.insert("top_p".to_string(), json!(top_p));
            }
        }

        Ok(body)
    }
}
