//! Odds and ends shared by the driver crates

#[macro_use] extern crate log;

/// Groups a number of items under one conditional-compilation attribute
///
/// Examples:
///
/// ```rust
/// # #[macro_use] extern crate utils;
/// // this one compiles!
///
/// pub struct Foo;
///
/// group_attr! {
///     #[cfg(any(unix, not(unix)))] // always true
///
///     pub struct Bar(
///         Foo, // types from outside are accessible
///     );
/// }
///
/// type Baz = Bar; // types from inside are accessible
/// # fn main() {}
/// ```
///
/// ```rust,ignore
/// # #[macro_use] extern crate utils;
/// // this one doesn't compile!
///
/// group_attr! {
///     #[cfg(all(unix, not(unix)))] // never true
///
///     pub struct Bar;
/// }
///
/// type Baz = Bar; // undefined
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! group_attr {
    (#[cfg($attr:meta)] $($yes:item)*) => {
          $(#[cfg($attr)] $yes)*
    }
}

#[macro_use]
pub mod prof {
    extern crate hprof;
    use std::cell::RefCell;

    pub use self::hprof::enter;

    thread_local! {
        // Thread-local profiler object (FIXME no doc comments on thread locals)
        pub static PROF: RefCell<Option<hprof::Profiler>> = RefCell::new(None)
    }

    /// Install a fresh profiler for the current thread
    pub fn start(name: &'static str) {
        PROF.with(|wrapped_prof| {
            *wrapped_prof.borrow_mut() = Some(hprof::Profiler::new(name));
        });
    }

    /// Remove the current thread's profiler, dumping its timing tree if debug logging is on
    pub fn finish() {
        PROF.with(|wrapped_prof| {
            if let Some(prof) = wrapped_prof.borrow_mut().take() {
                if log_enabled!(::log::Level::Debug) {
                    prof.print_timing();
                }
            }
        });
    }

    #[macro_export]
    macro_rules! prof {
        ($b:expr) => { prof!(stringify!($b), $b) };
        ($n:expr, $b:expr) => {{
            $crate::prof::PROF.with(|wrapped_prof| {
                let appease_borrowck = wrapped_prof.borrow();
                let g = match *appease_borrowck {
                    Some(ref prof) => prof.enter($n),
                    None => $crate::prof::enter($n)
                };
                let ret = { $b }; //~ ALLOW let_unit_value
                drop(g);
                ret
            })
        }}
    }
}

pub use prof::PROF;
