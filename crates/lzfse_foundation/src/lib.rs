/// Fails compilation when the expression does not hold.
///
/// ```
/// lzfse_foundation::const_assert!(u32::BITS == 32);
/// ```
#[macro_export]
macro_rules! const_assert {
    ($cond:expr $(,)?) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:literal $(,)?) => {
        const _: () = assert!($cond, $msg);
    };
}
