/// Declares newtype indices backed by an unsigned integer.
///
/// Every declared type is `Copy`, ordered, hashable and implements
/// [`EntityIndex`](crate::memory::EntityIndex). The `Display` form is the
/// type name followed by the raw index, e.g. `NodeIndex(3)`.
#[macro_export]
macro_rules! make_entity {
    ($($(#[$attr:meta])* $vis:vis struct $name:ident($backing:ty);)*) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
            $vis struct $name($backing);

            $crate::entity_impl!($name, $backing);

            impl ::std::fmt::Display for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        )*
    };
}
