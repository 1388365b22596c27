//! Number formatting helpers for report output.
//!
//! Keeps count and amount rendering consistent across every command's
//! printed report.

/// Formats a count with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use farm_audit_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Formats a monetary amount with two decimals and comma separators.
///
/// Used for trade-amount columns in printed reports.
///
/// # Examples
///
/// ```
/// use farm_audit_tools::utils::format::format_amount;
///
/// assert_eq!(format_amount(12845.5), "12,845.50");
/// assert_eq!(format_amount(0.456), "0.46");
/// ```
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = format_number((cents / 100) as usize);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, whole, cents % 100)
}
