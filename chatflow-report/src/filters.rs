//! Custom Tera filters for fixed-width text layout.
//!
//! ```text
//! {{ row.product | pad_end(width=15) }}{{ row.units | pad_start(width=5) }}
//! ${{ overview.agent_revenue | thousands }}
//! ```

use std::collections::HashMap;

use tera::{Error, Result, Value};

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn width_arg(args: &HashMap<String, Value>, filter: &str) -> Result<usize> {
    args.get("width")
        .and_then(Value::as_u64)
        .map(|w| w as usize)
        .ok_or_else(|| Error::msg(format!("filter `{filter}` requires a numeric `width` argument")))
}

/// Left-align in a field of `width` characters.
pub fn pad_end(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let width = width_arg(args, "pad_end")?;
    Ok(Value::String(format!("{:<width$}", as_text(value))))
}

/// Right-align in a field of `width` characters.
pub fn pad_start(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let width = width_arg(args, "pad_start")?;
    Ok(Value::String(format!("{:>width$}", as_text(value))))
}

/// Integer with `,` thousands separators: `84650` → `84,650`.
pub fn thousands(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let (negative, magnitude) = if let Some(n) = value.as_u64() {
        (false, n)
    } else if let Some(n) = value.as_i64() {
        (n < 0, n.unsigned_abs())
    } else if let Some(f) = value.as_f64() {
        (f < 0.0, f.abs().round() as u64)
    } else {
        return Err(Error::msg(format!(
            "filter `thousands` expects a number, got {value}"
        )));
    };
    let grouped = group_digits(magnitude);
    Ok(Value::String(if negative { format!("-{grouped}") } else { grouped }))
}

/// `5423` → `5,423`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Register every filter on `tera`.
pub fn register(tera: &mut tera::Tera) {
    tera.register_filter("pad_end", pad_end);
    tera.register_filter("pad_start", pad_start);
    tera.register_filter("thousands", thousands);
}
