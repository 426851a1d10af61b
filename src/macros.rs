//! Macros for declaring state enums.

/// Declare a closed state enum with fixed display names.
///
/// Each variant is paired with the label used for `Display`, for
/// [`State::name`](crate::core::State::name) and for serde. The macro also emits an
/// `ALL` constant listing the variants in declaration order.
///
/// # Example
///
/// ```
/// use liftstate::state_enum;
/// use liftstate::core::State;
///
/// state_enum! {
///     pub enum Signal {
///         Stop => "stop",
///         Go => "go",
///     }
/// }
///
/// assert_eq!(Signal::Go.name(), "go");
/// assert_eq!(Signal::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
