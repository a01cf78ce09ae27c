//! Macro for declaring typed clients.

/// Declare a client struct with one async method per remote operation.
///
/// Each method takes anything convertible into an
/// [`Argument`](crate::Argument) and forwards to
/// [`Dispatcher::invoke`](crate::Dispatcher::invoke) under its remote name.
///
/// The optional type id after the struct name is the interface the
/// generated `tcp` constructor checks for; it defaults to
/// [`DEFAULT_TYPE_ID`](crate::config::DEFAULT_TYPE_ID). `new`, `dispatcher`,
/// `reconnect` and `tcp` are taken and cannot name operations.
///
/// # Usage:
/// ```ignore
/// ice_rpc::ice_client! {
///     /// Client for `::business::IBusiness`
///     pub struct BusinessClient: "::business::IBusiness" {
///         "LicenseCheck" => license_check,
///         "Login" => login,
///     }
/// }
///
/// let client = BusinessClient::tcp(&config);
/// let user = client.login(json!({"user": "admin", "password": "secret"})).await?;
/// client.reconnect();
/// ```
#[macro_export]
macro_rules! ice_client {
    (@type_id) => {
        $crate::config::DEFAULT_TYPE_ID
    };
    (@type_id $type_id:literal) => {
        $type_id
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(: $type_id:literal)? {
            $($remote:literal => $method:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            dispatcher: $crate::Dispatcher,
        }

        #[allow(dead_code)]
        impl $name {
            /// Remote operation names, in declaration order.
            pub const METHODS: &'static [&'static str] = &[$($remote),*];

            /// Interface checked when connecting through [`Self::tcp`].
            pub const TYPE_ID: &'static str = $crate::ice_client!(@type_id $($type_id)?);

            pub fn new(dispatcher: $crate::Dispatcher) -> Self {
                Self { dispatcher }
            }

            pub fn dispatcher(&self) -> &$crate::Dispatcher {
                &self.dispatcher
            }

            /// Drop the current connection; the next call reconnects.
            pub fn reconnect(&self) {
                self.dispatcher.reset();
            }

            $(
                #[doc = concat!("Invoke the remote `", $remote, "` operation.")]
                pub async fn $method(
                    &self,
                    argument: impl ::core::convert::Into<$crate::Argument>,
                ) -> ::core::result::Result<$crate::serde_json::Value, $crate::CallError> {
                    self.dispatcher
                        .invoke($crate::CallRequest::new($remote).argument(argument))
                        .await
                }
            )*
        }

        $crate::__ice_client_tcp!($name);
    };
}

/// TCP constructor for [`ice_client!`] structs; empty without the `tcp`
/// feature.
#[cfg(feature = "tcp")]
#[doc(hidden)]
#[macro_export]
macro_rules! __ice_client_tcp {
    ($name:ident) => {
        #[allow(dead_code)]
        impl $name {
            /// Client over TCP, checking the remote object against
            /// [`Self::TYPE_ID`] instead of `config.type_id`.
            pub fn tcp(config: &$crate::ClientConfig) -> Self {
                let config = config.clone().type_id(Self::TYPE_ID);
                Self::new($crate::Dispatcher::tcp(&config))
            }
        }
    };
}

#[cfg(not(feature = "tcp"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __ice_client_tcp {
    ($name:ident) => {};
}
