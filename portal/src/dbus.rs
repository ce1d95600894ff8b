//! The portal transport over the D-Bus session bus.
//! See <https://flatpak.github.io/xdg-desktop-portal/docs/requests.html>

use crate::config::{PortalConfig, REQUEST_INTERFACE};
use crate::error::{PortalError, Result};
use crate::transport::{Invocation, Response, Results, Subscription, Transport};
use async_trait::async_trait;
use futures_util::stream::StreamExt;
use std::sync::Arc;
use zbus::Proxy;
use zvariant::StructureBuilder;

/// Proxy for one `org.freedesktop.portal.Request` object.
struct RequestProxy {
    inner: Proxy<'static>,
}

impl RequestProxy {
    async fn new(
        connection: &zbus::Connection,
        config: &PortalConfig,
        request_path: &str,
    ) -> zbus::Result<Self> {
        let inner = Proxy::new_owned(
            connection.clone(),
            config.bus_name.clone(),
            request_path.to_string(),
            REQUEST_INTERFACE,
        )
        .await?;
        Ok(Self { inner })
    }

    async fn receive_response(&self) -> zbus::Result<zbus::proxy::SignalStream<'static>> {
        self.inner.receive_signal("Response").await
    }

    async fn close(&self) -> zbus::Result<()> {
        self.inner.call_noreply("Close", &()).await
    }
}

pub struct DbusTransport {
    connection: zbus::Connection,
    config: Arc<PortalConfig>,
    sender: String,
}

impl DbusTransport {
    /// Connect to the session bus.
    pub async fn session(config: Arc<PortalConfig>) -> Result<Self> {
        let connection = zbus::ConnectionBuilder::session()?.build().await?;
        Self::with_connection(connection, config)
    }

    /// Connect to the bus at `address`, e.g. a private test bus.
    pub async fn address(address: &str, config: Arc<PortalConfig>) -> Result<Self> {
        let connection = zbus::ConnectionBuilder::address(address)?.build().await?;
        Self::with_connection(connection, config)
    }

    pub fn with_connection(
        connection: zbus::Connection,
        config: Arc<PortalConfig>,
    ) -> Result<Self> {
        let unique_name = connection
            .unique_name()
            .ok_or_else(|| PortalError::transport("connection has no unique name"))?;
        let sender = request_sender(unique_name.as_str());
        log::trace!("portal requests will be named under {sender}");
        Ok(Self {
            connection,
            config,
            sender,
        })
    }

    pub fn connection(&self) -> &zbus::Connection {
        &self.connection
    }
}

/// The form of a unique bus name used in request paths: `:1.42` -> `1_42`.
pub fn request_sender(unique_name: &str) -> String {
    unique_name.trim_start_matches(':').replace('.', "_")
}

#[async_trait]
impl Transport for DbusTransport {
    fn sender(&self) -> &str {
        &self.sender
    }

    async fn subscribe(&self, request_path: &str) -> Result<Subscription> {
        let proxy = RequestProxy::new(&self.connection, &self.config, request_path).await?;
        let stream = proxy.receive_response().await?;
        let path = request_path.to_string();
        let responses = stream.filter_map(move |message| {
            let decoded = message.body().deserialize::<(u32, Results)>();
            let response = match decoded {
                Ok((code, results)) => Some(Response::new(code, results)),
                Err(err) => {
                    log::warn!("ignoring malformed Response on {path}: {:#}", err);
                    None
                }
            };
            async move { response }
        });
        // Dropping the stream removes the match rule.
        Ok(Subscription::new(responses))
    }

    async fn invoke(&self, invocation: Invocation) -> Result<()> {
        let proxy = Proxy::new(
            &self.connection,
            self.config.bus_name.as_str(),
            self.config.object_path.as_str(),
            invocation.interface,
        )
        .await?;

        let mut body = StructureBuilder::new().add_field(invocation.parent_handle);
        for argument in invocation.arguments {
            body = body.append_field(argument);
        }
        let body = body.add_field(invocation.options.into_inner()).build();

        let reply = proxy.call_method(invocation.method, &body).await?;
        if let Ok(handle) = reply.body().deserialize::<zvariant::OwnedObjectPath>() {
            log::trace!("{} returned request handle {}", invocation.method, handle.as_str());
        }
        Ok(())
    }

    async fn close(&self, request_path: &str) -> Result<()> {
        let proxy = RequestProxy::new(&self.connection, &self.config, request_path).await?;
        proxy.close().await?;
        Ok(())
    }
}
