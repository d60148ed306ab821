/// Generates a request/response method on a hand-written service client.
///
/// The client must hold `sender: mpsc::Sender<Request>` and the error type must
/// implement `From<FrameworkError>`.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| <$error_type>::from($crate::actor_framework::FrameworkError::ActorClosed))?;

                response
                    .await
                    .map_err(|_| <$error_type>::from($crate::actor_framework::FrameworkError::ActorDropped))?
            }
        }
    };
}

/// Adds `new` plus the get/list/delete passthroughs for a `ResourceClient` wrapper.
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident, $plural_snake:ident) => {
        paste::paste! {
            impl $client_name {
                pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                    Self { inner }
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $plural_snake>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: String) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await
                }

                #[tracing::instrument(skip(self, items), fields(count = items.len()))]
                pub async fn restore(&self, items: Vec<$entity>) -> Result<usize, $error> {
                    self.inner.restore(items).await
                }

                pub async fn shutdown(&self) {
                    self.inner.shutdown().await
                }
            }
        }
    };
}
