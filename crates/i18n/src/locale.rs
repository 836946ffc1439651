//! Culture context derived from a language id: text direction plus date and
//! number formatting.

use {chrono::NaiveDate, gamedock_config::SOURCE_LANGUAGE};

pub const DEFAULT_LOCALE_TAG: &str = "en-US";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    /// BCP-47 style tag, e.g. `de-DE`.
    pub tag: String,
    pub language: String,
    pub region: Option<String>,
    pub direction: TextDirection,
    pub decimal_separator: char,
    pub group_separator: char,
    pub date_order: DateOrder,
    pub date_separator: char,
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self::build("en", Some("US"))
    }
}

impl LocaleContext {
    /// Derive a context from `english`, `xx`, `xx_YY` or `xx-YY`.
    /// Anything else resolves to `en-US`.
    pub fn from_language_id(id: &str) -> Self {
        if id == SOURCE_LANGUAGE {
            return Self::default();
        }
        let mut parts = id.split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        let region = parts.next();
        let valid = |s: &str, len: std::ops::RangeInclusive<usize>| {
            len.contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())
        };
        if parts.next().is_some()
            || !valid(language, 2..=3)
            || region.is_some_and(|r| !valid(r, 2..=3))
        {
            return Self::default();
        }
        Self::build(language, region)
    }

    fn build(language: &str, region: Option<&str>) -> Self {
        let language = language.to_ascii_lowercase();
        let region = region.map(str::to_ascii_uppercase);
        let tag = match &region {
            Some(r) => format!("{language}-{r}"),
            None => language.clone(),
        };

        let direction = match language.as_str() {
            "ar" | "fa" | "he" | "ur" | "ps" | "yi" | "ckb" => TextDirection::RightToLeft,
            _ => TextDirection::LeftToRight,
        };

        let (decimal_separator, group_separator) = match language.as_str() {
            "de" | "es" | "it" | "nl" | "tr" | "id" | "da" | "el" | "ro" | "vi" | "hr" | "sr"
            | "sl" => (',', '.'),
            "pt" if region.as_deref() == Some("BR") => (',', '.'),
            "fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" | "uk" | "hu" | "bg"
            | "pt" | "lt" | "lv" | "et" => (',', '\u{a0}'),
            _ => ('.', ','),
        };

        let (date_order, date_separator) = match (language.as_str(), region.as_deref()) {
            ("en", Some("US" | "PH")) | ("en", None) => (DateOrder::MonthDayYear, '/'),
            ("zh" | "ja", _) => (DateOrder::YearMonthDay, '/'),
            ("ko" | "hu", _) => (DateOrder::YearMonthDay, '.'),
            ("sv" | "lt", _) => (DateOrder::YearMonthDay, '-'),
            ("de" | "ru" | "pl" | "cs" | "sk" | "fi" | "nb" | "no" | "uk" | "tr" | "ro", _) => {
                (DateOrder::DayMonthYear, '.')
            },
            ("nl", _) => (DateOrder::DayMonthYear, '-'),
            _ => (DateOrder::DayMonthYear, '/'),
        };

        Self {
            tag,
            language,
            region,
            direction,
            decimal_separator,
            group_separator,
            date_order,
            date_separator,
        }
    }

    pub fn is_right_to_left(&self) -> bool {
        self.direction == TextDirection::RightToLeft
    }

    /// Short numeric date, e.g. `31.01.2024` for `de-DE`.
    pub fn format_date(&self, date: NaiveDate) -> String {
        let sep = self.date_separator;
        let pattern = match self.date_order {
            DateOrder::DayMonthYear => format!("%d{sep}%m{sep}%Y"),
            DateOrder::MonthDayYear => format!("%m{sep}%d{sep}%Y"),
            DateOrder::YearMonthDay => format!("%Y{sep}%m{sep}%d"),
        };
        date.format(&pattern).to_string()
    }

    /// Fixed-point number with locale separators, e.g. `1.234,50` for `de-DE`.
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        let fixed = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(c);
        }

        let mut out = String::new();
        if value.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_and_garbage_fall_back_to_en_us() {
        assert_eq!(LocaleContext::from_language_id("english").tag, DEFAULT_LOCALE_TAG);
        assert_eq!(LocaleContext::from_language_id("").tag, DEFAULT_LOCALE_TAG);
        assert_eq!(LocaleContext::from_language_id("x1_??").tag, DEFAULT_LOCALE_TAG);
        assert_eq!(LocaleContext::from_language_id("a_b_c").tag, DEFAULT_LOCALE_TAG);
    }

    #[test]
    fn parses_locale_ids() {
        let de = LocaleContext::from_language_id("de_DE");
        assert_eq!(de.tag, "de-DE");
        assert_eq!(de.region.as_deref(), Some("DE"));
        assert!(!de.is_right_to_left());

        let ar = LocaleContext::from_language_id("ar_SA");
        assert!(ar.is_right_to_left());

        assert_eq!(LocaleContext::from_language_id("pt-br").tag, "pt-BR");
        assert_eq!(LocaleContext::from_language_id("ja").tag, "ja");
    }

    #[test]
    fn formats_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(LocaleContext::default().format_date(date), "01/31/2024");
        assert_eq!(LocaleContext::from_language_id("de_DE").format_date(date), "31.01.2024");
        assert_eq!(LocaleContext::from_language_id("ja_JP").format_date(date), "2024/01/31");
        assert_eq!(LocaleContext::from_language_id("en_GB").format_date(date), "31/01/2024");
    }

    #[test]
    fn formats_numbers() {
        let en = LocaleContext::default();
        assert_eq!(en.format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(en.format_number(-12.0, 0), "-12");
        assert_eq!(en.format_number(-0.001, 1), "0.0");
        assert_eq!(en.format_number(999.0, 1), "999.0");

        let de = LocaleContext::from_language_id("de_DE");
        assert_eq!(de.format_number(1234.5, 2), "1.234,50");

        let fr = LocaleContext::from_language_id("fr_FR");
        assert_eq!(fr.format_number(1234.5, 1), "1\u{a0}234,5");
    }
}
