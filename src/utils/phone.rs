// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d]").expect("valid regex"));

/// 规范化电话号码
///
/// 去掉分隔符并补全北美国家码，得到E.164形式。
/// 无法识别的号码按原始数字串返回，由提供商侧校验兜底
///
/// # 参数
///
/// * `raw` - 原始电话号码
///
/// # 返回值
///
/// 返回规范化后的号码
pub fn normalize(raw: &str) -> String {
    let digits = NON_DIGIT.replace_all(raw, "");

    match digits.len() {
        10 => format!("+1{}", digits),
        11 if digits.starts_with('1') => format!("+{}", digits),
        0 => String::new(),
        _ => format!("+{}", digits),
    }
}

/// 提取北美号码的区号
///
/// 本地化外显（local presence）路由时用于匹配目标区号
///
/// # 参数
///
/// * `number` - 规范化或原始的电话号码
///
/// # 返回值
///
/// * `Some(String)` - 三位区号
/// * `None` - 非北美号码或长度不足
pub fn area_code(number: &str) -> Option<String> {
    // 显式标注非北美国家码的号码不参与区号匹配
    if let Some(rest) = number.trim().strip_prefix('+') {
        if !rest.starts_with('1') {
            return None;
        }
    }

    let digits = NON_DIGIT.replace_all(number, "");

    let national = if digits.len() == 11 && digits.starts_with('1') {
        &digits[1..]
    } else if digits.len() == 10 {
        &digits[..]
    } else {
        return None;
    };

    Some(national[..3].to_string())
}
