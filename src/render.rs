//! xbar menu output. The first line is the menu-bar title, `---` starts the
//! dropdown, and `| key=value` suffixes carry color and link directives.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::types::TickerReading;

pub const SEPARATOR: &str = "---";

const TEXT_COLOR_LIGHT: &str = "#000000";
const TEXT_COLOR_DARK: &str = "#FFFFFF";
const HIGH_COLOR: &str = "#0000ff";
const LOW_COLOR: &str = "#ff00ff";
const BID_COLOR: &str = "#00ff00";
const ASK_COLOR: &str = "#ff0000";

const TIMESTAMP_FORMAT: &str = "%A, %d %B %Y, %I:%M %p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine {
    pub text: String,
    pub color: Option<String>,
    pub href: Option<String>,
}

impl MenuLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: None, href: None }
    }

    pub fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self { text: text.into(), color: Some(color.into()), href: None }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self { text: text.into(), color: None, href: Some(href.into()) }
    }

    pub fn separator() -> Self {
        Self::plain(SEPARATOR)
    }
}

impl std::fmt::Display for MenuLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)?;
        let mut directives = Vec::with_capacity(2);
        if let Some(color) = &self.color {
            directives.push(format!("color={color}"));
        }
        if let Some(href) = &self.href {
            directives.push(format!("href={href}"));
        }
        if !directives.is_empty() {
            write!(f, " | {}", directives.join(" "))?;
        }
        Ok(())
    }
}

/// Everything the menu shows, already computed.
#[derive(Debug, Clone)]
pub struct MenuView<'a> {
    pub coin_name: &'a str,
    pub market_name: &'a str,
    pub coin_investment: f64,
    pub reading: &'a TickerReading,
    pub distance_from_high: i64,
    pub distance_color: &'a str,
    pub dark_mode: bool,
    /// Already formatted for display, see [`format_local_timestamp`].
    pub timestamp: &'a str,
}

pub fn render_menu(view: &MenuView<'_>) -> Vec<MenuLine> {
    let r = view.reading;
    let coin = view.coin_name;
    let book = view.market_name;
    let text = if view.dark_mode { TEXT_COLOR_DARK } else { TEXT_COLOR_LIGHT };

    let title = format!("{coin} ${} {book}", format_number(r.last));
    let title = if view.dark_mode {
        MenuLine::colored(title, view.distance_color)
    } else {
        MenuLine::plain(title)
    };

    vec![
        title,
        MenuLine::separator(),
        MenuLine::plain("My Investment"),
        MenuLine::colored(format!("{} {coin}", format_number(view.coin_investment)), text),
        MenuLine::colored(
            format!("${} {book}", format_number(round2(r.last * view.coin_investment))),
            text,
        ),
        MenuLine::separator(),
        MenuLine::plain("Last Price Distance"),
        MenuLine::colored(format!("Distance From High: {}%", view.distance_from_high), text),
        MenuLine::colored(format!("Distance From Low: {}%", 100 - view.distance_from_high), text),
        MenuLine::separator(),
        MenuLine::plain("Trading Data"),
        MenuLine::colored(format!("High: ${} {book}", format_number(r.high)), HIGH_COLOR),
        MenuLine::colored(format!("Low: ${} {book}", format_number(r.low)), LOW_COLOR),
        MenuLine::colored(format!("Bid: ${} {book}", format_number(r.bid)), BID_COLOR),
        MenuLine::colored(format!("Ask: ${} {book}", format_number(r.ask)), ASK_COLOR),
        MenuLine::colored(format!("Spread: ${} {book}", format_number(round2(r.ask - r.bid))), text),
        MenuLine::colored(format!("Volume (24h): {} {coin}", format_number(round2(r.volume))), text),
        MenuLine::colored(format!("Volume WAP: ${} {book}", format_number(r.vwap)), text),
        MenuLine::colored(view.timestamp, text),
        MenuLine::separator(),
        MenuLine::plain("Bitso"),
        MenuLine::link("-- Bitso Wallet", "https://bitso.com/wallet"),
        MenuLine::link(
            "-- Bitso Alpha",
            format!(
                "https://bitso.com/alpha/{}/{}",
                coin.to_lowercase(),
                book.to_lowercase()
            ),
        ),
    ]
}

/// Shortest round-trip decimal with `,` grouping and at least one fractional
/// digit: `1234.0` → `1,234.0`, `0.00051407` → `0.00051407`.
pub fn format_number(value: f64) -> String {
    let mut s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    match unsigned.split_once('.') {
        Some((int_part, frac)) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{unsigned}"),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Ticker time in the machine's local timezone, e.g. `Friday, 08 April 2016, 05:52 PM`.
pub fn format_local_timestamp(dt: &DateTime<Utc>) -> String {
    format_timestamp(dt, &Local)
}
