//! Argument rendering
//!
//! Turns decoded params into display fragments. Rendering never fails:
//! anything without a dedicated form is dumped as text.

use alloy::primitives::{hex, Address, I256, U256};
use serde::Serialize;

use proposal_actions_core::{DecodedParam, Network, ParamKind, ParamValue};

/// Significant digits kept for amounts below one whole unit.
const SUB_UNIT_SIGNIFICANT_DIGITS: usize = 2;

/// Fractional digits kept for amounts of one unit or more.
const WHOLE_UNIT_MAX_DECIMALS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Shorten addresses to `0x1234…abcd`.
    pub truncate_addresses: bool,
    /// Longest bytes or string value shown before truncating.
    pub max_bytes_chars: usize,
    /// Param names (case-insensitive) treated as token amounts.
    pub amount_param_names: Vec<String>,
    pub default_decimals: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            truncate_addresses: false,
            max_bytes_chars: 66,
            amount_param_names: vec!["amount".to_owned(), "value".to_owned(), "wad".to_owned()],
            default_decimals: 18,
        }
    }
}

impl RenderOptions {
    /// Whether a param name marks a token amount: `amount`, `_value`,
    /// `amount[3]`, `sharesAmount`, ...
    pub fn is_amount_name(&self, name: &str) -> bool {
        let base = name
            .split('[')
            .next()
            .unwrap_or(name)
            .trim_start_matches('_')
            .to_ascii_lowercase();
        let singular = base.strip_suffix('s').unwrap_or(&base);

        self.amount_param_names.iter().any(|n| {
            let n = n.to_ascii_lowercase();
            base == n || singular == n
        }) || singular.ends_with("amount")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Rendered {
    Address {
        display: String,
        checksum: String,
        explorer_url: Option<String>,
        label: Option<String>,
    },
    Number {
        raw: String,
        /// Dynamic-decimal form when the param is a token amount.
        formatted: Option<String>,
    },
    Text {
        value: String,
        /// Untruncated string, present only when `value` was cut.
        #[serde(skip_serializing_if = "Option::is_none")]
        full: Option<String>,
    },
    Bytes {
        display: String,
        full: String,
        truncated: bool,
    },
    List {
        items: Vec<RenderedField>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub rendered: Rendered,
}

impl Rendered {
    pub fn text(value: impl Into<String>) -> Self {
        Rendered::Text {
            value: value.into(),
            full: None,
        }
    }

    /// Single-line text form.
    pub fn to_display_string(&self) -> String {
        match self {
            Rendered::Address {
                display, label, ..
            } => match label {
                Some(label) => format!("{display} ({label})"),
                None => display.clone(),
            },
            Rendered::Number {
                raw,
                formatted: Some(formatted),
            } => format!("{formatted} ({raw})"),
            Rendered::Number { raw, .. } => raw.clone(),
            Rendered::Text { value, .. } => value.clone(),
            Rendered::Bytes { display, .. } => display.clone(),
            Rendered::List { items } => {
                let items: Vec<String> =
                    items.iter().map(|f| f.rendered.to_display_string()).collect();
                format!("[{}]", items.join(", "))
            }
        }
    }
}

/// Render a decoded param for display on `network`.
pub fn render(
    param: &DecodedParam,
    network: Option<&Network>,
    options: &RenderOptions,
) -> Rendered {
    match &param.value {
        ParamValue::Address(address) => render_address(address, network, options),
        ParamValue::Uint(value) => Rendered::Number {
            raw: value.to_string(),
            formatted: options
                .is_amount_name(&param.name)
                .then(|| format_units_dynamic(*value, options.default_decimals)),
        },
        ParamValue::Int(value) => Rendered::Number {
            raw: value.to_string(),
            formatted: options
                .is_amount_name(&param.name)
                .then(|| format_signed_dynamic(*value, options.default_decimals)),
        },
        ParamValue::Bool(b) => Rendered::text(b.to_string()),
        ParamValue::Bytes(bytes) => render_bytes(format!("0x{}", hex::encode(bytes)), options),
        ParamValue::String(s) => render_string(s.clone(), options),
        ParamValue::Array(items) | ParamValue::Tuple(items) => Rendered::List {
            items: items
                .iter()
                .map(|item| RenderedField {
                    name: item.name.clone(),
                    ty: item.ty.clone(),
                    rendered: render(item, network, options),
                })
                .collect(),
        },
        ParamValue::Raw(raw) => Rendered::text(raw.clone()),
    }
}

/// Render a value given as text with its Solidity type, for values that come
/// from outside the decoder.
///
/// Text-only convenience: numbers are never scaled as token amounts since
/// there is no param name to go by, and arrays or tuples are shown as the
/// text they came in. Unparseable values fall back to the raw text.
pub fn render_value(
    ty: &str,
    raw: &str,
    network: Option<&Network>,
    options: &RenderOptions,
) -> Rendered {
    let raw = raw.trim();
    match ParamKind::from_solidity(ty) {
        ParamKind::Address => match raw.parse::<Address>() {
            Ok(address) => render_address(&address, network, options),
            Err(_) => Rendered::text(raw),
        },
        ParamKind::Uint => match raw.parse::<U256>() {
            Ok(value) => Rendered::Number {
                raw: value.to_string(),
                formatted: None,
            },
            Err(_) => Rendered::text(raw),
        },
        ParamKind::Int => match I256::from_dec_str(raw) {
            Ok(value) => Rendered::Number {
                raw: value.to_string(),
                formatted: None,
            },
            Err(_) => Rendered::text(raw),
        },
        ParamKind::Bool => Rendered::text(raw.to_ascii_lowercase()),
        ParamKind::Bytes => render_bytes(raw.to_owned(), options),
        ParamKind::String => render_string(raw.to_owned(), options),
        _ => Rendered::text(raw),
    }
}

fn render_address(
    address: &Address,
    network: Option<&Network>,
    options: &RenderOptions,
) -> Rendered {
    let checksum = address.to_checksum(None);
    let display = if options.truncate_addresses {
        truncate_address(&checksum)
    } else {
        checksum.clone()
    };
    Rendered::Address {
        display,
        explorer_url: network.map(|n| n.address_url(address)),
        label: network
            .filter(|n| n.is_multisend(address))
            .map(|_| "Safe MultiSend".to_owned()),
        checksum,
    }
}

fn render_bytes(full: String, options: &RenderOptions) -> Rendered {
    match truncate_chars(&full, options.max_bytes_chars) {
        Some(shown) => Rendered::Bytes {
            display: shown,
            full,
            truncated: true,
        },
        None => Rendered::Bytes {
            display: full.clone(),
            full,
            truncated: false,
        },
    }
}

fn render_string(full: String, options: &RenderOptions) -> Rendered {
    match truncate_chars(&full, options.max_bytes_chars) {
        Some(shown) => Rendered::Text {
            value: shown,
            full: Some(full),
        },
        None => Rendered::text(full),
    }
}

/// First `max` chars plus an ellipsis, or `None` when `s` already fits.
fn truncate_chars(s: &str, max: usize) -> Option<String> {
    if s.chars().count() <= max {
        return None;
    }
    let shown: String = s.chars().take(max).collect();
    Some(format!("{shown}…"))
}

/// `0x1234…abcd`
fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_owned();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

/// Fractional digits needed to show `base_units` legibly.
///
/// Amounts of at least one unit keep up to four decimals; smaller amounts
/// keep their leading zeros plus two significant digits. Zero and whole
/// amounts need none.
pub fn dynamic_decimals(base_units: U256, unit_decimals: u8) -> usize {
    let unit_decimals = unit_decimals as usize;
    let (whole, frac) = split_units(base_units, unit_decimals);
    if frac.is_zero() {
        return 0;
    }
    if !whole.is_zero() {
        return WHOLE_UNIT_MAX_DECIMALS.min(unit_decimals);
    }
    let digits = frac.to_string();
    let leading_zeros = unit_decimals - digits.len();
    (leading_zeros + SUB_UNIT_SIGNIFICANT_DIGITS).min(unit_decimals)
}

/// Scale base units to whole units with dynamic decimal places, e.g.
/// `1000000000000000000` at 18 decimals is `1.0`.
pub fn format_units_dynamic(base_units: U256, unit_decimals: u8) -> String {
    let (whole, frac) = split_units(base_units, unit_decimals as usize);
    if unit_decimals == 0 {
        return whole.to_string();
    }

    let places = dynamic_decimals(base_units, unit_decimals);
    let frac_digits = format!("{:0>width$}", frac.to_string(), width = unit_decimals as usize);
    let shown = frac_digits[..places].trim_end_matches('0');

    if shown.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{shown}")
    }
}

fn format_signed_dynamic(value: I256, unit_decimals: u8) -> String {
    let formatted = format_units_dynamic(value.unsigned_abs(), unit_decimals);
    if value.is_negative() {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Native value of an action, e.g. `0.5 ETH`.
pub fn format_native(value: U256, network: &Network) -> String {
    format!("{} {}", format_units_dynamic(value, 18), network.symbol)
}

fn split_units(base_units: U256, unit_decimals: usize) -> (U256, U256) {
    match U256::from(10u8).checked_pow(U256::from(unit_decimals)) {
        Some(scale) => (base_units / scale, base_units % scale),
        None => (U256::ZERO, base_units),
    }
}
