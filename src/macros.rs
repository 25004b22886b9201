//! Utility macros for building the static binding tables.

/// Make creating a HashMap a little less verbose
///
/// ```
/// # #[macro_use] extern crate escher;
/// map! {
///     1 => "one",
///     2 => "two",
///     3 => "three",
/// };
/// ```
#[macro_export]
macro_rules! map {
    {} => { ::std::collections::HashMap::new() };

    { $($key:expr => $value:expr),+, } => {
        {
            let mut _map = ::std::collections::HashMap::new();
            $(_map.insert($key, $value);)+
            _map
        }
    };
}

/// Wrap a command handler so it can be stored in a binding table.
#[macro_export]
macro_rules! key_handler {
    ($f:expr) => {
        Box::new($f) as $crate::core::bindings::KeyHandler<_>
    };
}

/// A key binding that spawns an external program.
#[macro_export]
macro_rules! spawn {
    ($s:expr) => {
        Box::new(|_: &mut $crate::core::State, _: &_| $crate::util::spawn($s))
            as $crate::core::bindings::KeyHandler<_>
    };
}
