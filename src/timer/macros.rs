/// Declares a static global `FS20_RX` front-end protected by a `critical_section` mutex.
///
/// Both interrupt handlers and the mainloop reach the front-end through this
/// singleton.
///
/// # Arguments
/// - `$counter`: The capture counter type (must implement `TickCounter`)
/// - `$input`: The demodulated data pin type (must implement `InputPin`)
/// - `$sink`: The event sink type (must implement `EventSink`)
/// - `$led`: The receive indicator pin type (must implement `OutputPin`)
///
/// # Example
/// ```rust,ignore
/// init_fs20_receiver!(Tc2, Pd2, Producer<'static, RxEvent, 32>, Pd5);
/// ```
#[macro_export]
macro_rules! init_fs20_receiver {
    ( $counter:ty, $input:ty, $sink:ty, $led:ty ) => {
        pub static FS20_RX: $crate::timer::GlobalEdgeCapture<$counter, $input, $sink, $led> =
            $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs an `EdgeCapture` into the global `FS20_RX`.
///
/// # Example
/// ```rust,ignore
/// setup_fs20_receiver!(EdgeCapture::new(tc2, pd2, producer, Some(led), silence));
/// ```
///
/// # Notes
/// - Requires `init_fs20_receiver!` to have been used earlier.
#[macro_export]
macro_rules! setup_fs20_receiver {
    ( $capture:expr ) => {
        $crate::timer::global_edge_capture_setup(&FS20_RX, $capture)
    };
}

/// Runs the edge handler on the global `FS20_RX`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn INT0() {
///     fs20_edge_interrupt!();
/// }
/// ```
///
/// # Notes
/// - Does nothing until `setup_fs20_receiver!` has run.
#[macro_export]
macro_rules! fs20_edge_interrupt {
    () => {
        $crate::timer::global_edge_interrupt(&FS20_RX)
    };
}

/// Runs the timeout handler on the global `FS20_RX`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER2_COMPA() {
///     fs20_timeout_interrupt!();
/// }
/// ```
#[macro_export]
macro_rules! fs20_timeout_interrupt {
    () => {
        $crate::timer::global_timeout_interrupt(&FS20_RX)
    };
}
