// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{Html, Node};

/// 整棵子树都会被丢弃的非内容标签
const EXCLUDED_TAGS: &[&str] = &[
    "head", "script", "style", "nav", "footer", "header", "aside", "noscript", "svg",
];

/// 嵌入结构化数据的 `type` 属性值
const STRUCTURED_DATA_TYPES: &[&str] = &["application/json", "application/ld+json"];

/// 行内标签，文本直接相连，不插入分隔
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// 将原始HTML转换为适合模型处理的紧凑纯文本
///
/// 对解析后的标签树做一次结构化遍历：跳过非内容标签、图片与结构化数据块的整棵子树，
/// 收集其余文本节点。块级元素前后插入分隔，行内元素的文本直接拼接，
/// 最后把所有空白压缩为单个空格并去除首尾空白。
/// 输入可以是不平衡或残缺的HTML，解析器会尽力恢复。
pub fn normalize(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);
    let mut text = String::with_capacity(raw_html.len() / 2);

    // Reverse push keeps document order on pop; `None` closes a block element
    let mut stack = vec![Some(document.tree.root())];
    while let Some(step) = stack.pop() {
        let Some(node) = step else {
            text.push(' ');
            continue;
        };
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) => {
                if is_excluded(element) {
                    continue;
                }
                if !is_inline(element.name()) {
                    text.push(' ');
                    stack.push(None);
                }
                stack.extend(node.children().rev().map(Some));
            }
            Node::Document | Node::Fragment => stack.extend(node.children().rev().map(Some)),
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

fn is_inline(name: &str) -> bool {
    INLINE_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}

/// 将空白序列压缩为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_excluded(element: &scraper::node::Element) -> bool {
    let name = element.name();
    if name == "img" || EXCLUDED_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag)) {
        return true;
    }

    element
        .attr("type")
        .map(|kind| {
            let kind = kind.trim();
            STRUCTURED_DATA_TYPES
                .iter()
                .any(|t| kind.eq_ignore_ascii_case(t))
        })
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "html_normalizer_test.rs"]
mod tests;
