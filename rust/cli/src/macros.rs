//! Small helpers for the dispatcher in [`crate::run`].

/// Write a line to `$dest`, returning the error exit code if the write fails.
#[macro_export]
macro_rules! write_or_exit {
    ($dest:expr, $($arg:tt)*) => {
        if writeln!($dest, $($arg)*).is_err() {
            return $crate::exit_code::ERROR;
        }
    };
}
