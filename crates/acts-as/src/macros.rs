/// Generate a typed attribute method table over a change-tracked record.
///
/// Every listed column gets its reader plus the setter, presence, change,
/// changed, was and will-change members. The table is a trait with a blanket
/// impl over [`HasRecord`](crate::HasRecord), so a facade holding the
/// supermodel's record answers the supermodel's table unchanged.
///
/// ```ignore
/// acts_as::attribute_methods! {
///     pub trait ProductAttributes for product::ActiveModel {
///         product::Column::Name => name: String {
///             set: set_name,
///             present: is_name_present,
///             change: name_change,
///             changed: is_name_changed,
///             was: name_was,
///             will_change: name_will_change,
///         },
///     }
/// }
/// ```
#[macro_export]
macro_rules! attribute_methods {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident for $active:ty {
            $(
                $column:path => $attr:ident : $ty:ty {
                    set: $set:ident,
                    present: $present:ident,
                    change: $change:ident,
                    changed: $changed:ident,
                    was: $was:ident,
                    will_change: $will_change:ident $(,)?
                }
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis trait $name: $crate::HasRecord<$active> {
            $(
                fn $attr(&self) -> ::std::option::Option<$ty> {
                    <Self as $crate::HasRecord<$active>>::record(self).read::<$ty>($column)
                }

                fn $set(&mut self, value: impl ::std::convert::Into<::std::option::Option<$ty>>) {
                    <Self as $crate::HasRecord<$active>>::record_mut(self)
                        .write::<$ty>($column, value.into());
                }

                fn $present(&self) -> bool {
                    <Self as $crate::HasRecord<$active>>::record(self).is_present($column)
                }

                fn $change(
                    &self,
                ) -> ::std::option::Option<(::std::option::Option<$ty>, ::std::option::Option<$ty>)> {
                    <Self as $crate::HasRecord<$active>>::record(self).change::<$ty>($column)
                }

                fn $changed(&self) -> bool {
                    <Self as $crate::HasRecord<$active>>::record(self).changed($column)
                }

                fn $was(&self) -> ::std::option::Option<$ty> {
                    <Self as $crate::HasRecord<$active>>::record(self).was::<$ty>($column)
                }

                fn $will_change(&mut self) {
                    <Self as $crate::HasRecord<$active>>::record_mut(self).will_change($column);
                }
            )*
        }

        impl<T: $crate::HasRecord<$active> + ?Sized> $name for T {}
    };
}

/// Declare that `$facade` acts as `$supermodel`.
///
/// Implements [`Model`](crate::Model) with a lineage that continues into the
/// supermodel's, [`ActsAs`](crate::ActsAs) over the field holding the
/// supermodel, and [`HasRecord`](crate::HasRecord) for the supermodel's
/// record so its attribute table applies to the facade.
#[macro_export]
macro_rules! acts_as {
    (
        $facade:ty : $name:literal => $supermodel:ty {
            field: $field:ident,
            owner: $owner:expr,
            record: $record:ty $(,)?
        }
    ) => {
        impl $crate::Model for $facade {
            const MODEL_NAME: &'static str = $name;

            fn lineage() -> ::std::vec::Vec<::std::any::TypeId> {
                let mut lineage = ::std::vec![::std::any::TypeId::of::<Self>()];
                lineage.extend(<$supermodel as $crate::Model>::lineage());
                lineage
            }
        }

        impl $crate::ActsAs for $facade {
            type Supermodel = $supermodel;

            const OWNER: <$supermodel as $crate::Actable>::Owner = $owner;

            fn acting_as(&self) -> &$supermodel {
                &self.$field
            }

            fn acting_as_mut(&mut self) -> &mut $supermodel {
                &mut self.$field
            }
        }

        impl $crate::HasRecord<$record> for $facade {
            fn record(&self) -> &$crate::Tracked<$record> {
                <$supermodel as $crate::HasRecord<$record>>::record(&self.$field)
            }

            fn record_mut(&mut self) -> &mut $crate::Tracked<$record> {
                <$supermodel as $crate::HasRecord<$record>>::record_mut(&mut self.$field)
            }
        }
    };
}
