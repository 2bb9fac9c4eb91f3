/// Generates a dependency trait and a service struct holding every dependency
/// behind an `Arc`. Optional `state` fields are plain, non-shared members
/// initialised with `Default`.
#[macro_export]
macro_rules! gen_service_impl {
    (
        struct $service_name:ident : $trait:path = $dependencies:ident {
            $($field_name:ident: $field_type:path = $field_attr:ident),* $(,)?
        }
        $(state { $($state_attr:ident: $state_type:ty),* $(,)? })?
    ) => {
            pub trait $dependencies {
                $(
                    type $field_name: $field_type + Sync + Send;
                )*
            }

            pub struct $service_name<Deps: $dependencies> {
                $(
                    pub $field_attr: std::sync::Arc<Deps::$field_name>,
                )*
                $($(
                    pub $state_attr: $state_type,
                )*)?
            }

            impl<Deps: $dependencies> $service_name<Deps> {
                pub fn new(
                    $($field_attr: std::sync::Arc<Deps::$field_name>),*
                ) -> Self {
                    Self {
                        $($field_attr,)*
                        $($(
                            $state_attr: <$state_type>::default(),
                        )*)?
                    }
                }
            }
    };
}
