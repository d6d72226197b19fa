//! Free-text parsers for intake answers
//!
//! Every parser is a pure function from the user's text to a typed value or
//! a [`ParseFailure`]. Chinese keywords are matched as substrings, English
//! keywords as whole words.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why an answer could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "input", rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("Empty answer")]
    Empty,

    #[error("Unrecognized city: '{0}'")]
    UnknownCity(String),

    #[error("Could not read a budget from '{0}'")]
    InvalidBudget(String),

    #[error("Budget must be greater than zero")]
    NonPositiveBudget,

    #[error("Unrecognized usage: '{0}'")]
    UnknownUsage(String),

    #[error("Expected a yes or no answer, got '{0}'")]
    NotYesNo(String),
}

/// Cities with MotoMatch stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Taipei,
    NewTaipei,
    Keelung,
    Taoyuan,
    Hsinchu,
    Miaoli,
    Taichung,
    Changhua,
    Nantou,
    Yunlin,
    Chiayi,
    Tainan,
    Kaohsiung,
    Pingtung,
    Yilan,
    Hualien,
    Taitung,
}

impl City {
    // New Taipei precedes Taipei so "new taipei" is not read as "taipei"
    const ALL: [City; 17] = [
        City::NewTaipei,
        City::Taipei,
        City::Keelung,
        City::Taoyuan,
        City::Hsinchu,
        City::Miaoli,
        City::Taichung,
        City::Changhua,
        City::Nantou,
        City::Yunlin,
        City::Chiayi,
        City::Tainan,
        City::Kaohsiung,
        City::Pingtung,
        City::Yilan,
        City::Hualien,
        City::Taitung,
    ];

    /// Chinese name as it appears in store names
    pub fn name(&self) -> &'static str {
        match self {
            City::Taipei => "台北",
            City::NewTaipei => "新北",
            City::Keelung => "基隆",
            City::Taoyuan => "桃園",
            City::Hsinchu => "新竹",
            City::Miaoli => "苗栗",
            City::Taichung => "台中",
            City::Changhua => "彰化",
            City::Nantou => "南投",
            City::Yunlin => "雲林",
            City::Chiayi => "嘉義",
            City::Tainan => "台南",
            City::Kaohsiung => "高雄",
            City::Pingtung => "屏東",
            City::Yilan => "宜蘭",
            City::Hualien => "花蓮",
            City::Taitung => "台東",
        }
    }

    fn romanized(&self) -> &'static [&'static str] {
        match self {
            City::Taipei => &["taipei"],
            City::NewTaipei => &["new taipei", "newtaipei", "xinbei"],
            City::Keelung => &["keelung", "jilong"],
            City::Taoyuan => &["taoyuan"],
            City::Hsinchu => &["hsinchu", "xinzhu"],
            City::Miaoli => &["miaoli"],
            City::Taichung => &["taichung", "taizhong"],
            City::Changhua => &["changhua", "zhanghua"],
            City::Nantou => &["nantou"],
            City::Yunlin => &["yunlin"],
            City::Chiayi => &["chiayi", "jiayi"],
            City::Tainan => &["tainan"],
            City::Kaohsiung => &["kaohsiung", "gaoxiong"],
            City::Pingtung => &["pingtung", "pingdong"],
            City::Yilan => &["yilan", "ilan"],
            City::Hualien => &["hualien", "hualian"],
            City::Taitung => &["taitung", "taidong"],
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Riding purpose, mapped onto catalog styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    Commute,
    Sport,
    Leisure,
}

impl Usage {
    /// Catalog style label for this usage
    pub fn style(&self) -> &'static str {
        match self {
            Usage::Commute => "通勤",
            Usage::Sport => "運動",
            Usage::Leisure => "休閒",
        }
    }

    fn chinese_keywords(&self) -> &'static [&'static str] {
        match self {
            Usage::Commute => &["通勤", "上班", "上學", "代步", "買菜", "接送"],
            Usage::Sport => &["運動", "跑山", "競速", "性能", "賽道", "操控"],
            Usage::Leisure => &["休閒", "旅遊", "兜風", "出遊", "環島", "露營"],
        }
    }

    fn english_keywords(&self) -> &'static [&'static str] {
        match self {
            Usage::Commute => &["commute", "commuting", "work", "school", "daily", "city"],
            Usage::Sport => &["sport", "sports", "racing", "track", "performance", "speed"],
            Usage::Leisure => &["leisure", "touring", "tour", "travel", "weekend", "cruise"],
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style())
    }
}

/// Recognize a city in free text
pub fn parse_location(input: &str) -> Result<City, ParseFailure> {
    let text = normalize(input)?;
    let folded = text.replace('臺', "台");

    City::ALL
        .into_iter()
        .find(|city| {
            folded.contains(city.name())
                || city.romanized().iter().any(|alias| folded.contains(alias))
        })
        .ok_or_else(|| ParseFailure::UnknownCity(input.trim().to_string()))
}

/// Read a budget such as "5萬", "NT$ 80,000", "8w", "75k" or "六萬"
pub fn parse_budget(input: &str) -> Result<f64, ParseFailure> {
    let text = normalize(input)?;
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '，' | '_') && !c.is_whitespace())
        .collect();

    let amount = match leading_number(&compact) {
        Some((value, rest)) => value * unit_multiplier(rest),
        None => chinese_amount(&compact)
            .ok_or_else(|| ParseFailure::InvalidBudget(input.trim().to_string()))?,
    };

    if amount > 0.0 && amount.is_finite() {
        Ok(amount)
    } else {
        Err(ParseFailure::NonPositiveBudget)
    }
}

/// Recognize a riding purpose
pub fn parse_usage(input: &str) -> Result<Usage, ParseFailure> {
    let text = normalize(input)?;

    [Usage::Commute, Usage::Sport, Usage::Leisure]
        .into_iter()
        .find(|usage| {
            usage.chinese_keywords().iter().any(|k| text.contains(k))
                || has_word(&text, usage.english_keywords())
        })
        .ok_or_else(|| ParseFailure::UnknownUsage(input.trim().to_string()))
}

// Agreeing phrases, most with a negation character inside; longer forms first
const AFFIRMATIVE_ZH: [&str; 10] = [
    "沒問題", "沒關係", "沒差", "不會介意", "不介意", "不錯", "無所謂", "都可以", "都行", "都好",
];
const AFFIRMATIVE_EN: [&str; 7] = [
    "no problem", "no worries", "not bad", "don't mind", "dont mind", "why not", "either way",
];
const NEGATIVE_ZH: [&str; 19] = [
    "不要", "不用", "不需", "不必", "不行", "不能", "不可", "不想", "不好", "不了", "不是", "不一定",
    "沒有", "沒必要", "沒興趣", "免了", "算了", "別", "否",
];
// Bare answers that only negate as the whole reply
const NEGATIVE_ZH_BARE: [&str; 3] = ["不", "沒", "免"];
const NEGATIVE_EN: [&str; 7] = ["no", "nope", "not", "don't", "dont", "n", "never"];
const POSITIVE_ZH: [&str; 9] = ["要", "需要", "好", "可以", "是", "對", "當然", "必須", "一定"];
const POSITIVE_EN: [&str; 7] = ["yes", "y", "yeah", "yep", "ok", "sure", "definitely"];
// Indifference about ABS means it is not a requirement
const INDIFFERENT_ZH: [&str; 5] = ["無所謂", "都可以", "都行", "沒差", "都好"];
const INDIFFERENT_EN: [&str; 3] = ["don't care", "dont care", "either way"];

/// Generic yes/no detection
///
/// Agreeing phrases such as "沒問題" or "no problem" are taken out first,
/// then any remaining negation wins over affirmation.
pub fn parse_yes_no(input: &str) -> Result<bool, ParseFailure> {
    let text = normalize(input)?;

    let mut rest = text.clone();
    let mut agreed = false;
    for phrase in AFFIRMATIVE_ZH.iter().chain(AFFIRMATIVE_EN.iter()) {
        if rest.contains(phrase) {
            rest = rest.replace(phrase, " ");
            agreed = true;
        }
    }

    let bare = rest.trim_matches(|c: char| !c.is_alphanumeric());
    if NEGATIVE_ZH.iter().any(|k| rest.contains(k))
        || NEGATIVE_ZH_BARE.contains(&bare)
        || has_word(&rest, &NEGATIVE_EN)
    {
        return Ok(false);
    }
    if agreed || POSITIVE_ZH.iter().any(|k| rest.contains(k)) || has_word(&rest, &POSITIVE_EN) {
        return Ok(true);
    }
    Err(ParseFailure::NotYesNo(input.trim().to_string()))
}

/// Whether the rider needs ABS; naming ABS without negation counts as yes
pub fn parse_abs_preference(input: &str) -> Result<bool, ParseFailure> {
    let text = normalize(input)?;
    if INDIFFERENT_ZH.iter().any(|k| text.contains(k))
        || INDIFFERENT_EN.iter().any(|k| text.contains(k))
    {
        return Ok(false);
    }
    match parse_yes_no(&text) {
        Ok(answer) => Ok(answer),
        Err(_) if text.contains("abs") || text.contains("防鎖死") => Ok(true),
        Err(_) => Err(ParseFailure::NotYesNo(input.trim().to_string())),
    }
}

/// Whether the rider accepts a bike shipped from another store
pub fn parse_shipping_preference(input: &str) -> Result<bool, ParseFailure> {
    let text = normalize(input)?;
    if ["自取", "現場", "親自", "本地"].iter().any(|k| text.contains(k))
        || has_word(&text, &["pickup", "local"])
    {
        return Ok(false);
    }
    match parse_yes_no(&text) {
        Ok(answer) => Ok(answer),
        Err(_)
            if ["寄", "運送", "配送", "調車", "外縣市"].iter().any(|k| text.contains(k))
                || has_word(&text, &["ship", "shipping", "delivery", "deliver"]) =>
        {
            Ok(true)
        }
        Err(_) => Err(ParseFailure::NotYesNo(input.trim().to_string())),
    }
}

fn normalize(input: &str) -> Result<String, ParseFailure> {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        Err(ParseFailure::Empty)
    } else {
        Ok(text)
    }
}

fn has_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .any(|token| !token.is_empty() && words.contains(&token))
}

/// First ASCII number in the text and whatever follows it
fn leading_number(text: &str) -> Option<(f64, &str)> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tail = &text[start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(tail.len());
    let value = tail[..end].trim_end_matches('.').parse::<f64>().ok()?;
    Some((value, &tail[end..]))
}

fn unit_multiplier(rest: &str) -> f64 {
    if rest.starts_with('萬') || rest.starts_with('w') {
        10_000.0
    } else if rest.starts_with('千') || rest.starts_with('k') {
        1_000.0
    } else {
        1.0
    }
}

/// "六萬", "十五萬", "兩千" style amounts
fn chinese_amount(text: &str) -> Option<f64> {
    let (number_part, multiplier) = if let Some(pos) = text.find('萬') {
        (&text[..pos], 10_000.0)
    } else if let Some(pos) = text.find('千') {
        (&text[..pos], 1_000.0)
    } else {
        return None;
    };

    let digits: Vec<u32> = number_part.chars().filter_map(chinese_digit).collect();
    let has_ten = number_part.contains('十');
    let value = match (has_ten, digits.as_slice()) {
        (false, [d]) => *d,
        (true, []) => 10,
        (true, [d]) if number_part.ends_with('十') => d * 10,
        (true, [d]) => 10 + d,
        (true, [tens, ones]) => tens * 10 + ones,
        _ => return None,
    };
    Some(value as f64 * multiplier)
}

fn chinese_digit(c: char) -> Option<u32> {
    match c {
        '一' => Some(1),
        '二' | '兩' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_chinese() {
        assert_eq!(parse_location("我住台中").unwrap(), City::Taichung);
        assert_eq!(parse_location("臺北市").unwrap(), City::Taipei);
        assert_eq!(parse_location("新北板橋").unwrap(), City::NewTaipei);
    }

    #[test]
    fn test_location_romanized() {
        assert_eq!(parse_location("Kaohsiung").unwrap(), City::Kaohsiung);
        assert_eq!(parse_location("New Taipei City").unwrap(), City::NewTaipei);
        assert_eq!(parse_location("taipei").unwrap(), City::Taipei);
    }

    #[test]
    fn test_location_unknown() {
        assert!(matches!(parse_location("Tokyo"), Err(ParseFailure::UnknownCity(_))));
        assert_eq!(parse_location("   "), Err(ParseFailure::Empty));
    }

    #[test]
    fn test_budget_formats() {
        assert_eq!(parse_budget("5萬").unwrap(), 50_000.0);
        assert_eq!(parse_budget("5.5萬").unwrap(), 55_000.0);
        assert_eq!(parse_budget("NT$ 80,000").unwrap(), 80_000.0);
        assert_eq!(parse_budget("8w").unwrap(), 80_000.0);
        assert_eq!(parse_budget("75K").unwrap(), 75_000.0);
        assert_eq!(parse_budget("預算大概 60000 元").unwrap(), 60_000.0);
    }

    #[test]
    fn test_budget_chinese_numerals() {
        assert_eq!(parse_budget("六萬").unwrap(), 60_000.0);
        assert_eq!(parse_budget("十五萬").unwrap(), 150_000.0);
        assert_eq!(parse_budget("二十萬").unwrap(), 200_000.0);
        assert_eq!(parse_budget("兩千").unwrap(), 2_000.0);
    }

    #[test]
    fn test_budget_failures() {
        assert!(matches!(parse_budget("很多"), Err(ParseFailure::InvalidBudget(_))));
        assert_eq!(parse_budget("0"), Err(ParseFailure::NonPositiveBudget));
    }

    #[test]
    fn test_usage() {
        assert_eq!(parse_usage("每天上班通勤").unwrap(), Usage::Commute);
        assert_eq!(parse_usage("假日跑山").unwrap(), Usage::Sport);
        assert_eq!(parse_usage("Weekend touring").unwrap(), Usage::Leisure);
        assert!(matches!(parse_usage("不知道"), Err(ParseFailure::UnknownUsage(_))));
    }

    #[test]
    fn test_yes_no() {
        assert!(parse_yes_no("要").unwrap());
        assert!(!parse_yes_no("不需要").unwrap());
        assert!(parse_yes_no("Yes please").unwrap());
        assert!(!parse_yes_no("no").unwrap());
        // "know" is not "no"
        assert!(parse_yes_no("I know").is_err());
    }

    #[test]
    fn test_yes_no_agreeing_phrases() {
        assert!(parse_yes_no("沒問題").unwrap());
        assert!(parse_yes_no("不錯啊").unwrap());
        assert!(parse_yes_no("沒關係").unwrap());
        assert!(parse_yes_no("無所謂").unwrap());
        assert!(parse_yes_no("No problem!").unwrap());
        assert!(parse_yes_no("I don't mind").unwrap());
        // A real refusal after the phrase still counts
        assert!(!parse_yes_no("不錯，但我不要").unwrap());
    }

    #[test]
    fn test_yes_no_refusals() {
        for answer in ["不", "沒", "免", "不要", "不用了", "沒有", "不行", "算了", "別寄", "不一定", "Nope"] {
            assert!(!parse_yes_no(answer).unwrap(), "{answer}");
        }
    }

    #[test]
    fn test_abs_preference() {
        assert!(parse_abs_preference("一定要有ABS").unwrap());
        assert!(parse_abs_preference("abs").unwrap());
        assert!(!parse_abs_preference("不用 ABS").unwrap());
        assert!(!parse_abs_preference("無所謂").unwrap());
        assert!(!parse_abs_preference("有沒有ABS都可以").unwrap());
        assert!(!parse_abs_preference("I don't care").unwrap());
        assert!(parse_abs_preference("沒問題，要ABS").unwrap());
        assert!(parse_abs_preference("maybe").is_err());
    }

    #[test]
    fn test_shipping_preference() {
        assert!(parse_shipping_preference("可以調車").unwrap());
        assert!(parse_shipping_preference("ship it").unwrap());
        assert!(!parse_shipping_preference("我要現場看車").unwrap());
        assert!(!parse_shipping_preference("不行").unwrap());
        assert!(parse_shipping_preference("沒問題").unwrap());
        assert!(parse_shipping_preference("寄過來沒關係").unwrap());
        assert!(parse_shipping_preference("無所謂").unwrap());
    }
}
