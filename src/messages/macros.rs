/// Declare a request type and its response.
///
/// ```rust
/// use vali_mediator::impl_request;
///
/// struct Ping;
/// impl_request!(Ping => String);
/// ```
#[macro_export]
macro_rules! impl_request {
    ($message:ty => $response:ty) => {
        impl $crate::messages::Message for $message {
            type Kind = $crate::messages::kind::Request;
        }

        impl $crate::messages::Request for $message {
            type Response = $response;
        }
    };
}

/// Declare a fire-and-forget command type.
#[macro_export]
macro_rules! impl_fire_and_forget {
    ($($message:ty),+ $(,)?) => {
        $(
            impl $crate::messages::Message for $message {
                type Kind = $crate::messages::kind::FireAndForget;
            }

            impl $crate::messages::FireAndForget for $message {}
        )+
    };
}

/// Declare a notification type.
#[macro_export]
macro_rules! impl_notification {
    ($($message:ty),+ $(,)?) => {
        $(
            impl $crate::messages::Message for $message {
                type Kind = $crate::messages::kind::Notification;
            }

            impl $crate::messages::Notification for $message {}
        )+
    };
}
