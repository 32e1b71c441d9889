use crate::error::{LedgerError, LedgerResult};
use bigdecimal::BigDecimal;

/// 与 `NUMERIC(14, 2)` 列一致: 最多两位小数，整数部分最多 12 位
pub const AMOUNT_SCALE: i64 = 2;
const AMOUNT_MAX_INTEGER_DIGITS: u32 = 12;

fn amount_limit() -> BigDecimal {
    BigDecimal::from(10_i64.pow(AMOUNT_MAX_INTEGER_DIGITS))
}

/// 校验金额能被数据库原样存下，返回统一为两位小数的值
///
/// 超出精度的值直接拒绝，不做舍入。
pub fn checked_amount(field: &str, value: &BigDecimal) -> LedgerResult<BigDecimal> {
    let scaled = value.with_scale(AMOUNT_SCALE);
    if &scaled != value {
        return Err(LedgerError::validation(format!(
            "{} must have at most {} decimal places",
            field, AMOUNT_SCALE
        )));
    }
    if scaled.abs() >= amount_limit() {
        return Err(LedgerError::validation(format!(
            "{} must be less than 10^{} in magnitude",
            field, AMOUNT_MAX_INTEGER_DIGITS
        )));
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn two_decimals_pass_and_are_normalised() {
        let v = checked_amount("netCash", &dec("12.5")).unwrap();
        assert_eq!(v.to_string(), "12.50");
        assert_eq!(checked_amount("netCash", &dec("-3")).unwrap(), dec("-3"));
        assert_eq!(checked_amount("netCash", &dec("1.200")).unwrap(), dec("1.2"));
    }

    #[test]
    fn third_decimal_is_rejected() {
        let err = checked_amount("netCash", &dec("0.005")).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn magnitude_limit_matches_column() {
        assert!(checked_amount("totalStock", &dec("999999999999.99")).is_ok());
        let err = checked_amount("totalStock", &dec("1000000000000")).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        let err = checked_amount("netCash", &dec("-1000000000000")).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
