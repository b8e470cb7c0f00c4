//! Lightweight translation lookup.
//!
//! # Design
//! Bundles are loaded once at startup into an immutable `Translations` that
//! is shared through `Arc`. The language for a request is resolved from its
//! `lang` query parameter and passed to rendering explicitly; nothing here
//! is mutated per request.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use todo_core::BulkAction;
use tracing::warn;

const EMBEDDED_EN: &str = include_str!("../locales/en.json");
const EMBEDDED_FA: &str = include_str!("../locales/fa.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    En,
    Fa,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Fa];

    /// Anything other than a supported code falls back to English.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("fa") => Lang::Fa,
            _ => Lang::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Fa => "fa",
        }
    }

    /// Text direction for the `dir` attribute.
    pub fn dir(self) -> &'static str {
        match self {
            Lang::En => "ltr",
            Lang::Fa => "rtl",
        }
    }
}

type Bundle = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct Translations {
    bundles: HashMap<Lang, Bundle>,
}

impl Translations {
    /// Loads the bundles compiled into the binary.
    pub fn embedded() -> Self {
        let mut bundles = HashMap::new();
        for (lang, raw) in [(Lang::En, EMBEDDED_EN), (Lang::Fa, EMBEDDED_FA)] {
            bundles.insert(lang, parse_bundle(lang, raw));
        }
        Self { bundles }
    }

    /// Loads `<dir>/en.json` and `<dir>/fa.json`. A missing or malformed
    /// file is logged and leaves that language empty.
    pub fn from_dir(dir: &Path) -> Self {
        let mut bundles = HashMap::new();
        for lang in Lang::ALL {
            let path = dir.join(format!("{}.json", lang.code()));
            let bundle = match std::fs::read_to_string(&path) {
                Ok(raw) => parse_bundle(lang, &raw),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "locale file unreadable");
                    Bundle::new()
                }
            };
            bundles.insert(lang, bundle);
        }
        Self { bundles }
    }

    /// Looks `key` up in `lang`, then English, then returns the key itself.
    pub fn t<'a>(&'a self, lang: Lang, key: &'a str) -> &'a str {
        [lang, Lang::En]
            .iter()
            .filter_map(|l| self.bundles.get(l))
            .find_map(|bundle| bundle.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Looks up a template containing `{n}` and fills in `n` with digits of
    /// `lang`.
    pub fn count(&self, lang: Lang, key: &str, n: impl ToString) -> String {
        let text = self.t(lang, key).replace("{n}", &n.to_string());
        localize_digits(&text, lang)
    }

    /// Translates a status message carried in the URL.
    ///
    /// Bulk results embed their count ("3 tasks deleted"), so they are
    /// matched against the bulk templates and re-filled after translation.
    /// Everything else is looked up as-is.
    pub fn message(&self, lang: Lang, text: &str) -> String {
        BulkAction::ALL
            .into_iter()
            .find_map(|action| {
                let template = action.template();
                count_in(template, text).map(|n| self.count(lang, template, n))
            })
            .unwrap_or_else(|| self.t(lang, text).to_string())
    }
}

/// Extracts the number standing in for `{n}` when `text` is an instance of
/// `template`.
fn count_in<'a>(template: &str, text: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = template.split_once("{n}")?;
    let n = text.strip_prefix(prefix)?.strip_suffix(suffix)?;
    (!n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())).then_some(n)
}

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Rewrites ASCII digits in the script of `lang`.
pub fn localize_digits(text: &str, lang: Lang) -> String {
    match lang {
        Lang::En => text.to_string(),
        Lang::Fa => text
            .chars()
            .map(|c| c.to_digit(10).map_or(c, |d| PERSIAN_DIGITS[d as usize]))
            .collect(),
    }
}

pub const JALALI_MONTHS: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Converts a Gregorian date to the Solar Hijri (Jalali) calendar as
/// `(year, month, day)` with 1-based month and day.
pub fn to_jalali(date: NaiveDate) -> (i64, u32, u32) {
    const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = i64::from(date.year());
    let gy2 = if date.month() > 2 { gy + 1 } else { gy };
    let leap_days = (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400;
    let day_of_year = DAYS_BEFORE_MONTH[date.month0() as usize] + i64::from(date.day());
    let mut days = 355_666 + 365 * gy + leap_days + day_of_year;

    let mut year = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    year += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        year += (days - 1) / 365;
        days = (days - 1) % 365;
    }
    let (month, day) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };
    (year, month as u32, day as u32)
}

fn parse_bundle(lang: Lang, raw: &str) -> Bundle {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(lang = lang.code(), error = %err, "locale bundle is not valid JSON");
        Bundle::new()
    })
}
