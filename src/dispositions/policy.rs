// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// 禁止联络类处置名（归一化键）
///
/// 显式枚举而非子串匹配，新处置名必须显式加入。
/// 转写文本的负面情绪触发不经过本表，由上游归一化为这些名称
static DNC_DISPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "dnc",
        "do_not_call",
        "do_not_contact",
        "remove_and_dnc",
        "remove",
        "stop",
        "hostile",
        "threatening",
    ])
});

/// 移出序列类处置名（归一化键）
///
/// 负面终态与正面终态都移出序列，禁止联络类蕴含移出
static REMOVE_DISPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "dnc",
        "do_not_call",
        "do_not_contact",
        "remove_and_dnc",
        "remove",
        "stop",
        "hostile",
        "threatening",
        "not_interested",
        "wrong_number",
        "non_homeowner",
        "dead_lead",
        "completed",
        "appointment_set",
        "converted",
        "transferred",
        "sold",
    ])
});

/// 暂停序列类处置名（归一化键），非终态的跟进类结果
static PAUSE_DISPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from(["callback", "callback_scheduled", "on_hold", "left_voicemail"])
});

/// 归一化键到规范看板标签的别名表
static STAGE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("callback", "Callback Scheduled"),
        ("callback_scheduled", "Callback Scheduled"),
        ("appointment", "Appointment Set"),
        ("appointment_set", "Appointment Set"),
        ("not_interested", "Not Interested"),
        ("sold", "Closed Won"),
        ("dead_lead", "Dead"),
    ])
});

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// 处置命中的策略类集合
///
/// 三类互不排斥：禁止联络与移出可同时命中
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyClasses {
    /// 禁止联络
    pub dnc: bool,
    /// 移出序列
    pub remove_from_sequence: bool,
    /// 暂停序列
    pub pause: bool,
}

impl PolicyClasses {
    /// 是否没有命中任何策略类
    pub fn is_empty(&self) -> bool {
        !self.dnc && !self.remove_from_sequence && !self.pause
    }
}

/// 把原始处置名归一化为查表键
///
/// 小写化并把非字母数字的连续段折叠为单个下划线
///
/// # 参数
///
/// * `raw` - 原始处置名
///
/// # 返回值
///
/// 返回归一化键，如"Not Interested" → "not_interested"
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// 按显式策略表给归一化键分类
pub fn classify(key: &str) -> PolicyClasses {
    PolicyClasses {
        dnc: DNC_DISPOSITIONS.contains(key),
        remove_from_sequence: REMOVE_DISPOSITIONS.contains(key),
        pause: PAUSE_DISPOSITIONS.contains(key),
    }
}

/// 把归一化键解析为规范看板标签
///
/// 先查别名表，没有命中则把snake_case逐词首字母大写
pub fn canonical_stage_label(key: &str) -> String {
    if let Some(label) = STAGE_ALIASES.get(key) {
        return label.to_string();
    }

    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
