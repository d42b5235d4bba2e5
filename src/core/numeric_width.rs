// 数値幅計算
//
// 10進精度から格納に必要なバイト幅を算出し、
// ベンダーの精度・スケール上限に対する検証を行います。

use crate::core::error::DdlError;

/// 固定幅計算で扱える最大精度（i128に収まる10進桁数）
const MAX_WIDTH_PRECISION: u16 = 38;

/// ネイティブ整数型のバイト幅
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntegerWidth {
    One,
    Two,
    Four,
    Eight,
}

impl IntegerWidth {
    /// 宣言されたバイト幅から変換（1, 2, 4, 8のみ）
    pub fn from_bytes(bytes: u8) -> Result<Self, DdlError> {
        match bytes {
            1 => Ok(IntegerWidth::One),
            2 => Ok(IntegerWidth::Two),
            4 => Ok(IntegerWidth::Four),
            8 => Ok(IntegerWidth::Eight),
            other => Err(DdlError::data_type(
                format!("integer width {} is not one of 1, 2, 4, 8", other),
                "integer_width",
            )),
        }
    }

    /// 指定バイト数を収容できる最小のネイティブ幅
    ///
    /// 8バイトを超える場合はNoneを返します。
    pub fn covering(bytes: u8) -> Option<Self> {
        match bytes {
            0 | 1 => Some(IntegerWidth::One),
            2 => Some(IntegerWidth::Two),
            3 | 4 => Some(IntegerWidth::Four),
            5..=8 => Some(IntegerWidth::Eight),
            _ => None,
        }
    }

    /// バイト数
    pub fn bytes(&self) -> u8 {
        match self {
            IntegerWidth::One => 1,
            IntegerWidth::Two => 2,
            IntegerWidth::Four => 4,
            IntegerWidth::Eight => 8,
        }
    }

    /// 一段広い幅（8バイトの次は存在しない）
    pub fn wider(&self) -> Option<Self> {
        match self {
            IntegerWidth::One => Some(IntegerWidth::Two),
            IntegerWidth::Two => Some(IntegerWidth::Four),
            IntegerWidth::Four => Some(IntegerWidth::Eight),
            IntegerWidth::Eight => None,
        }
    }

    /// 値域を表現するのに必要な10進桁数
    pub fn decimal_digits(&self, unsigned: bool) -> u8 {
        match (self, unsigned) {
            (IntegerWidth::One, _) => 3,
            (IntegerWidth::Two, _) => 5,
            (IntegerWidth::Four, _) => 10,
            (IntegerWidth::Eight, false) => 19,
            (IntegerWidth::Eight, true) => 20,
        }
    }

    /// 値域 (最小値, 最大値)
    pub fn range(&self, unsigned: bool) -> (i128, i128) {
        let bits = u32::from(self.bytes()) * 8;
        if unsigned {
            (0, (1i128 << bits) - 1)
        } else {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        }
    }
}

/// 精度とスケールをベンダーの上限に対して検証
///
/// `max_scale` がNoneの場合、スケールは精度以外の上限を持ちません。
pub fn validate(
    precision: u16,
    scale: u16,
    max_precision: u16,
    max_scale: Option<u16>,
) -> Result<(), DdlError> {
    if precision == 0 {
        return Err(DdlError::data_type(
            "precision must be at least 1",
            "min_precision",
        ));
    }
    if scale > precision {
        return Err(DdlError::data_type(
            format!("scale {} exceeds precision {}", scale, precision),
            "precision",
        ));
    }
    if precision > max_precision {
        return Err(DdlError::data_type(
            format!(
                "precision {} exceeds maximum precision {}",
                precision, max_precision
            ),
            "max_precision",
        ));
    }
    if let Some(max_scale) = max_scale {
        if scale > max_scale {
            return Err(DdlError::data_type(
                format!("scale {} exceeds maximum scale {}", scale, max_scale),
                "max_scale",
            ));
        }
    }
    Ok(())
}

/// 指定精度の値を格納するのに必要な最小バイト数を算出
///
/// 符号付きは2の補数、符号なしは純粋な2進表現で計算します。
/// `explicit_min` / `explicit_max` は整数部の境界値で、指定された場合は
/// 精度から導かれる値域の代わりに使用されます（10^scale倍して比較）。
pub fn width_bytes(
    precision: u16,
    scale: u16,
    unsigned: bool,
    explicit_min: Option<i64>,
    explicit_max: Option<i64>,
) -> Result<u8, DdlError> {
    validate(precision, scale, MAX_WIDTH_PRECISION, None)?;

    let factor = 10i128.pow(u32::from(scale));
    let max_unscaled = 10i128.pow(u32::from(precision)) - 1;

    let scaled = |bound: i64, name: &str| {
        i128::from(bound).checked_mul(factor).ok_or_else(|| {
            DdlError::data_type(
                format!("{} {} overflows at scale {}", name, bound, scale),
                "max_width_precision",
            )
        })
    };

    let low = match explicit_min {
        Some(min) => scaled(min, "minimum")?,
        None if unsigned => 0,
        None => -max_unscaled,
    };
    let high = match explicit_max {
        Some(max) => scaled(max, "maximum")?,
        None => max_unscaled,
    };

    if low > high {
        return Err(DdlError::data_type(
            format!("minimum {} exceeds maximum {}", low, high),
            "range",
        ));
    }
    if unsigned && low < 0 {
        return Err(DdlError::data_type(
            format!("unsigned value cannot have negative minimum {}", low),
            "unsigned",
        ));
    }

    for bytes in 1u8..=16 {
        let bits = u32::from(bytes) * 8;
        let fits = if unsigned {
            bits >= 127 || high < (1i128 << bits)
        } else if bits == 128 {
            true
        } else {
            let limit = 1i128 << (bits - 1);
            low >= -limit && high < limit
        };
        if fits {
            return Ok(bytes);
        }
    }

    Err(DdlError::data_type(
        format!("precision {} does not fit in 16 bytes", precision),
        "max_width_precision",
    ))
}

/// 整数カラムのネイティブ幅を決定
///
/// 明示的なバイト幅があればそれを使用し、なければ精度（省略時は19桁）と
/// min/maxから算出した幅を最小のネイティブ幅に切り上げます。
/// 幅・精度・値域のいずれも指定がなければ4バイトです。
/// 8バイトを超える場合はNoneを返し、呼び出し側は `DECIMAL(p, 0)` で代替します。
pub fn integer_width_for(
    width: Option<u8>,
    precision: Option<u16>,
    unsigned: bool,
    explicit_min: Option<i64>,
    explicit_max: Option<i64>,
) -> Result<Option<IntegerWidth>, DdlError> {
    if let Some(width) = width {
        return IntegerWidth::from_bytes(width).map(Some);
    }
    if precision.is_none() && explicit_min.is_none() && explicit_max.is_none() {
        return Ok(Some(IntegerWidth::Four));
    }
    let precision = precision.unwrap_or(19);
    if precision > MAX_WIDTH_PRECISION {
        return Ok(None);
    }
    let bytes = width_bytes(precision, 0, unsigned, explicit_min, explicit_max)?;
    Ok(IntegerWidth::covering(bytes))
}
