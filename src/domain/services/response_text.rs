// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use serde_json::Value;

/// 模型响应中可能携带补全文本的位置
///
/// 按 [`ResponseShape::ORDERED`] 的顺序依次尝试，第一个非空结果生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// 顶层 `output_text` 字段
    OutputText,
    /// 顶层 `text` 字段
    Text,
    /// `output` 列表中的文本或类型化内容
    OutputItems,
    /// `choices[].message.content`
    Choices,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    text: Option<Value>,
    #[serde(default)]
    content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

impl ResponseShape {
    pub const ORDERED: [ResponseShape; 4] = [
        ResponseShape::OutputText,
        ResponseShape::Text,
        ResponseShape::OutputItems,
        ResponseShape::Choices,
    ];

    /// 尝试从响应中取出文本
    pub fn extract(&self, payload: &Value) -> Option<String> {
        match self {
            ResponseShape::OutputText => non_blank(payload.get("output_text")),
            ResponseShape::Text => non_blank(payload.get("text")),
            ResponseShape::OutputItems => {
                let items = list_of::<OutputItem>(payload.get("output")?);
                items.into_iter().find_map(|item| {
                    non_blank(item.text.as_ref()).or_else(|| {
                        item.content.unwrap_or_default().into_iter().find_map(|part| {
                            match part.kind.as_deref() {
                                Some("output_text") | Some("text") => non_blank(part.text.as_ref()),
                                _ => None,
                            }
                        })
                    })
                })
            }
            ResponseShape::Choices => {
                let choices = list_of::<Choice>(payload.get("choices")?);
                choices
                    .into_iter()
                    .find_map(|choice| non_blank(choice.message?.content.as_ref()))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::OutputText => "output_text",
            ResponseShape::Text => "text",
            ResponseShape::OutputItems => "output",
            ResponseShape::Choices => "choices",
        }
    }
}

/// 按固定顺序提取补全文本，返回命中的形状与文本
pub fn extract_response_text(payload: &Value) -> Option<(ResponseShape, String)> {
    ResponseShape::ORDERED
        .iter()
        .find_map(|shape| shape.extract(payload).map(|text| (*shape, text)))
}

/// 响应的顶层字段名，用于诊断日志
pub fn top_level_keys(payload: &Value) -> Vec<String> {
    let mut keys: Vec<String> = match payload.as_object() {
        Some(map) => map.keys().cloned().collect(),
        None => Vec::new(),
    };
    keys.sort();
    keys
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// 宽松地反序列化列表：元素形状不符时跳过该元素
fn list_of<T: for<'de> Deserialize<'de>>(value: &Value) -> Vec<T> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}
