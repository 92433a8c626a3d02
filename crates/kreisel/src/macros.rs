/// Returns `ConfigError::NonPositive` from the enclosing function for the
/// first listed field that is not a positive finite number.
#[macro_export]
macro_rules! ensure_positive {
    ($config:expr, $($field:ident),+ $(,)?) => {
        $(
            if !($config.$field.is_finite() && $config.$field > 0.0) {
                return Err($crate::ConfigError::NonPositive {
                    field: stringify!($field),
                    value: $config.$field,
                });
            }
        )+
    };
}
