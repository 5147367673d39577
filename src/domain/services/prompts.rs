// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 模型提示词
//!
//! 系统提示词约束输出格式，任务提示词描述输入内容的处理方式。

use crate::domain::models::extraction::TaskKind;

/// 固定的系统提示词：只允许输出符合菜单CSV格式的文本
pub const SYSTEM_PROMPT: &str = r#"You turn restaurant lunch menus into CSV.
Respond with CSV text only, starting with a header row. Output UTF-8 and keep Swedish characters (å, ä, ö) intact.
CSV format:
- Header row exactly: day,lunch,price,tags
- One row for each dish on each day; repeat a dish on every day it is served.
- day is one of mon,tue,wed,thu,fri in lowercase; skip weekend days unless the menu lists them explicitly.
- price is a plain number; leave the field empty when no price is given.
- tags are lowercase and joined by " | " (space, pipe, space). Pick a few tags that fit best.
- Wrap a field in double quotes when it contains a comma or a quote, and write a quote inside a field as two quotes.
- No markdown, no code fences, no commentary before or after the CSV.

Example:
day,lunch,price,tags
mon,"Stekt strömming med potatismos, lingon och smält smör",135,fisk | svenskt | husmanskost
mon,Pad thai med kyckling,135,asiatiskt
wed,"Ugnsbakad lax med dillsås, kokt potatis & citron",145,fisk | svenskt
"#;

/// 网页任务提示词
pub const HTML_PROMPT: &str = r#"Read the page content below and extract the lunch menu for every weekday.
For each day give the day, the dish and the price. A day can have several dishes. Keep dish names in Swedish as written.
Days are lowercase three-letter codes: mon, tue, wed, thu, fri.
When a dish is served on several days (for example "hela veckan" or a weekly special), add a row for each of those days.
Tag every dish with fitting categories such as swedish, asian, italian, vegetarian or husmanskost; several tags are allowed.
Leave out everything that is not part of the menu, such as opening hours, addresses or contact details.
Answer with CSV only, following the format from the system instructions.
"#;

/// 图片任务提示词
pub const IMAGE_PROMPT: &str = "Read the attached menu image and extract the lunch menu for the current week. \
Use the restaurant context fields where they help.";

/// 根据任务类型选择任务提示词
pub fn task_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Html => HTML_PROMPT,
        TaskKind::Image => IMAGE_PROMPT,
    }
}
