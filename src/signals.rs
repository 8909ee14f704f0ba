//! Heuristic extractors over free-text queries.
//!
//! Pure functions: tickers, cleaned company phrases, monetary amounts
//! (including lakh/crore units), month counts and embedded calendar dates.
//! A missing match is `None`, which the router treats as an ordinary
//! branch condition.

use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ExtractedSignal;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// Market and jargon words that look like tickers but never are.
const TICKER_STOPLIST: &[&str] = &[
    "IPO", "INDIA", "NSE", "BSE", "STOCK", "SHARE", "PRICE", "RATE", "RBI", "NEWS", "MARKET",
    "TODAY", "LATEST", "CURRENT",
];

/// Noise seen in web-search result text when guessing a ticker.
pub const WEB_TICKER_STOPLIST: &[&str] = &[
    "IPO", "INDIA", "NSE", "BSE", "STOCK", "SHARE", "PRICE", "LIMITED", "LTD", "PLC", "THE",
    "AND", "FOR", "WITH", "COMPANY", "SYMBOL", "TICKER", "QUOTE", "MARKET", "TODAY", "INC",
    "NYSE", "NASDAQ", "USD", "INR", "CEO", "ETF",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

lazy_static! {
    static ref TICKER_TOKEN: Regex = Regex::new(r"\b[A-Z]{2,10}\b").unwrap();
    static ref WEB_TICKER_TOKEN: Regex = Regex::new(r"\b[A-Z]{2,12}\b").unwrap();
    static ref FILLER_WORDS: Regex =
        Regex::new(r"\b(stock|share|price|of|give|me|today|current|latest|pls|please)\b").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9\s&.-]").unwrap();
    static ref UNIT_AMOUNT: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(lakhs?|crores?|k)\b").unwrap();
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
    static ref MONTH_COUNT: Regex = Regex::new(r"(\d+)\s*(?:months|month|mths)").unwrap();
    static ref DAY_MONTH: Regex = Regex::new(
        r"\b(?P<on>on\s+)?(?P<day>\d{1,2})(?P<ord>st|nd|rd|th)?\s+(?:of\s+)?(?P<month>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?,?(?:\s+(?P<year>\d{4}))?\b"
    )
    .unwrap();
    static ref MONTH_DAY: Regex = Regex::new(
        r"\b(?P<on>on\s+)?(?P<month>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?\s+(?P<day>\d{1,2})(?P<ord>st|nd|rd|th)?\b,?(?:\s+(?P<year>\d{4}))?"
    )
    .unwrap();
    static ref NUMERIC_DATE: Regex =
        Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})\b").unwrap();
}

/// Ticker typed directly into the query, e.g. `MSFT`. Rightmost token wins.
pub fn extract_ticker(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    TICKER_TOKEN
        .find_iter(&upper)
        .map(|m| m.as_str())
        .filter(|t| !TICKER_STOPLIST.contains(t))
        .last()
        .map(str::to_string)
}

/// First plausible ticker in web-search text, skipping [`WEB_TICKER_STOPLIST`].
pub fn guess_ticker_from_text(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    WEB_TICKER_TOKEN
        .find_iter(&upper)
        .map(|m| m.as_str())
        .find(|t| !WEB_TICKER_STOPLIST.contains(t))
        .map(str::to_string)
}

/// Strip filler so symbol search sees `hdfc bank` instead of
/// `give me the stock price of HDFC Bank`.
pub fn clean_company_query(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = FILLER_WORDS.replace_all(lower.trim(), " ");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let kept = DISALLOWED.replace_all(collapsed.trim(), "");
    let cleaned = WHITESPACE.replace_all(kept.trim(), " ").into_owned();

    if cleaned.is_empty() {
        text.trim().to_string()
    } else {
        cleaned
    }
}

/// Parse a rupee amount: `2 lakh`, `1.5 lakh`, `3 crore`, `50k`, `2,00,000`.
pub fn parse_amount(text: &str) -> Option<u64> {
    let t = text.to_lowercase().replace(',', "");

    if let Some(caps) = UNIT_AMOUNT.captures(&t) {
        let num: f64 = caps[1].parse().ok()?;
        let multiplier = match &caps[2] {
            u if u.starts_with("lakh") => LAKH,
            u if u.starts_with("crore") => CRORE,
            _ => THOUSAND,
        };
        return Some((num * multiplier).round() as u64);
    }

    DIGITS.find(&t).and_then(|m| m.as_str().parse().ok())
}

/// Month count such as `10 months` or `6 mths`.
pub fn extract_months(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    MONTH_COUNT
        .captures(&lower)
        .and_then(|caps| caps[1].parse().ok())
}

/// Rewrite an embedded date into a news search phrase, assuming the
/// current year when none is given.
pub fn detect_date_query(text: &str) -> Option<String> {
    detect_date_query_on(text, Local::now().date_naive())
}

/// [`detect_date_query`] with an explicit reference date.
pub fn detect_date_query_on(text: &str, today: NaiveDate) -> Option<String> {
    let lower = text.to_lowercase();

    let (day, month, year) = if let Some(found) = named_month_date(&DAY_MONTH, &lower) {
        found
    } else if let Some(found) = named_month_date(&MONTH_DAY, &lower) {
        found
    } else if let Some(caps) = NUMERIC_DATE.captures(&lower) {
        let raw_year = &caps[3];
        let year: i32 = raw_year.parse().ok()?;
        let year = if raw_year.len() == 2 { 2000 + year } else { year };
        (caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?, Some(year))
    } else {
        return None;
    };

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    let year = year.unwrap_or_else(|| today.year());
    Some(format!(
        "news headlines {} {} {}",
        day,
        MONTHS[(month - 1) as usize],
        year
    ))
}

/// First match of a day/month-name pattern as `(day, month, year)`.
/// A bare "may" next to a number is usually the verb, so it only counts
/// with an ordinal, a year, or a leading "on".
fn named_month_date(pattern: &Regex, text: &str) -> Option<(u32, u32, Option<i32>)> {
    pattern.captures_iter(text).find_map(|caps| {
        let month_word = caps.name("month")?.as_str();
        let anchored = caps.name("on").is_some()
            || caps.name("ord").is_some()
            || caps.name("year").is_some();
        if month_word == "may" && !anchored {
            return None;
        }
        Some((
            caps["day"].parse().ok()?,
            month_from_name(month_word)?,
            caps.name("year").and_then(|y| y.as_str().parse().ok()),
        ))
    })
}

fn month_from_name(prefix: &str) -> Option<u32> {
    let key = &prefix[..prefix.len().min(3)];
    MONTHS
        .iter()
        .position(|m| m[..3].eq_ignore_ascii_case(key))
        .map(|i| i as u32 + 1)
}

/// Run every extractor over one query.
pub fn extract_signal(text: &str) -> ExtractedSignal {
    ExtractedSignal {
        ticker: extract_ticker(text),
        company: clean_company_query(text),
        amount: parse_amount(text),
        months: extract_months(text),
        date_query: detect_date_query(text),
    }
}
