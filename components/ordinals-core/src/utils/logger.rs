//! `slog` macros that go through [`crate::utils::Context::try_log`], so a
//! silent context costs nothing.

#[macro_export]
macro_rules! try_info {
    ($ctx:expr, $($args:tt)+) => {
        $ctx.try_log(|logger| info!(logger, $($args)+))
    };
}

#[macro_export]
macro_rules! try_debug {
    ($ctx:expr, $($args:tt)+) => {
        $ctx.try_log(|logger| debug!(logger, $($args)+))
    };
}

#[macro_export]
macro_rules! try_warn {
    ($ctx:expr, $($args:tt)+) => {
        $ctx.try_log(|logger| warn!(logger, $($args)+))
    };
}

#[macro_export]
macro_rules! try_error {
    ($ctx:expr, $($args:tt)+) => {
        $ctx.try_log(|logger| error!(logger, $($args)+))
    };
}
