#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Asserts that an analytic derivative matches its finite difference estimate.
///
/// The tolerance is relative to the magnitude of the estimate, but never finer than
/// `tol` in absolute terms.
#[macro_export]
macro_rules! assert_derivative_eq {
    ($analytic:expr, $fd:expr, tol = $tol:expr, $($context:tt)+) => {{
        let analytic: f64 = $analytic;
        let fd: f64 = $fd;
        let scale = f64::max(1.0, fd.abs());
        if (analytic - fd).abs() > $tol * scale {
            panic!(
                "derivative mismatch: analytic {:e}, finite difference {:e} ({})",
                analytic,
                fd,
                format!($($context)+)
            );
        }
    }};
}
