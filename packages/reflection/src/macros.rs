/// Expands to the `as_any`, `as_any_mut` and `into_any` methods of a
/// [`Reflect`](crate::Reflect) impl.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_any_methods {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
            self
        }
    };
}

/// Implements [`Reflect`](crate::Reflect) and [`Struct`](crate::Struct) for a
/// plain struct whose fields are all reflectable.
///
/// Fields are listed in visit order with their declared attributes. Fields not
/// listed are invisible to reflection.
///
/// The struct converts to a `Value::Object` keyed by field name. Applying an
/// object updates the listed fields it names and leaves the rest alone; if any
/// field rejects its value the whole struct is restored.
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ident { $($field:ident => $attrs:expr),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            $crate::__reflect_any_methods!();

            fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Object(self)
            }

            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Object(self)
            }

            #[allow(unused_mut)]
            fn to_value(&self) -> $crate::__dom::Value {
                let mut object = $crate::__dom::Object::new();
                $(
                    object.insert(
                        ::std::string::String::from(stringify!($field)),
                        $crate::Reflect::to_value(&self.$field),
                    );
                )*
                $crate::__dom::Value::Object(object)
            }

            #[allow(unused_variables)]
            fn apply_value(&mut self, value: &$crate::__dom::Value) -> ::std::result::Result<(), $crate::ReflectError> {
                let object = value
                    .as_object()
                    .ok_or_else(|| $crate::ReflectError::conversion::<$ty>(value))?;
                let previous = $crate::Reflect::to_value(self);
                let result = (|| -> ::std::result::Result<(), $crate::ReflectError> {
                    $(
                        if let Some(field_value) = object.get(stringify!($field)) {
                            $crate::Reflect::apply_value(&mut self.$field, field_value)?;
                        }
                    )*
                    Ok(())
                })();
                if result.is_err() {
                    // Fields written before the failure are put back.
                    let _ = $crate::Reflect::apply_value(self, &previous);
                }
                result
            }
        }

        impl $crate::Struct for $ty {
            fn field_len(&self) -> usize {
                <[&str]>::len(&[$(stringify!($field)),*])
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some(&self.$field);
                    }
                    position += 1;
                )*
                None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some(&mut self.$field);
                    }
                    position += 1;
                )*
                None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_info(&self, index: usize) -> ::std::option::Option<$crate::FieldInfo> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some($crate::FieldInfo {
                            name: stringify!($field),
                            attributes: $attrs,
                        });
                    }
                    position += 1;
                )*
                None
            }
        }
    };
}
