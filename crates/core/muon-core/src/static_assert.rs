//! Compile-time assertion macro.

/// Asserts a condition at compile time.
///
/// Usable at item scope; the condition must be a `const` expression. A
/// failing condition is a compile error, not a runtime panic.
#[macro_export]
macro_rules! static_assert {
    ($cond:expr $(,)?) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:expr $(,)?) => {
        const _: () = assert!($cond, $msg);
    };
}

#[cfg(test)]
mod tests {
    static_assert!(u16::MAX as u32 == 65_535);
    static_assert!(64usize.is_power_of_two(), "example ring size");

    #[test]
    fn assertions_above_compiled() {}
}
