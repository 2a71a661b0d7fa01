//! Fetching of remote keys and key sets.

use std::{fmt::Debug, io::Read, time::Duration};

use log::{debug, trace};

use crate::{
    source::Url,
    tls::{self, ConnectionSecurity, create_agent},
};

/// The largest accepted response body in bytes.
pub const MAX_BODY_SIZE: u64 = 1024 * 1024;

/// The default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An error that may occur when fetching remote data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server responded with a status code other than 2xx
    #[error("The server responded with status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The request failed before a response was received
    #[error("Transport error: {message}")]
    Transport {
        /// The message describing the transport failure.
        message: String,
    },

    /// The response body exceeds [`MAX_BODY_SIZE`]
    #[error("The response body exceeds {max} bytes", max = MAX_BODY_SIZE)]
    TooLarge,

    /// The response body can not be read
    #[error("Unable to read response body: {0}")]
    Io(#[from] std::io::Error),

    /// The TLS configuration can not be created
    #[error("TLS error: {0}")]
    Tls(#[from] tls::Error),

    /// A custom fetcher failed
    #[error("{0}")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Retrieval of the raw bytes behind a [`Url`].
///
/// The trait is the seam for transports other than [`HttpsFetcher`], e.g. for tests or for
/// applications that bring their own HTTP client.
pub trait Fetch: Debug + Send + Sync {
    /// Fetches the data at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data can not be fetched or the server does not respond with a
    /// success status.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error>;
}

/// A [`Fetch`] implementation issuing HTTPS GET requests.
#[derive(Clone, Debug)]
pub struct HttpsFetcher {
    security: ConnectionSecurity,
    timeout: Duration,
}

impl HttpsFetcher {
    /// Creates a new [`HttpsFetcher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use jose_keys::{ConnectionSecurity, HttpsFetcher};
    ///
    /// let fetcher = HttpsFetcher::new(ConnectionSecurity::Native, Duration::from_secs(5));
    /// # let _ = fetcher;
    /// ```
    pub fn new(security: ConnectionSecurity, timeout: Duration) -> Self {
        Self { security, timeout }
    }
}

impl Default for HttpsFetcher {
    fn default() -> Self {
        Self::new(ConnectionSecurity::default(), DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Fetch for HttpsFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error> {
        let agent = create_agent(&self.security, self.timeout)?;
        debug!("Fetching {url}");
        let response = match agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => return Err(Error::Status { status }),
            Err(error) => {
                return Err(Error::Transport {
                    message: error.to_string(),
                });
            }
        };
        trace!("{url} responded with status {}", response.status());

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_SIZE + 1)
            .read_to_end(&mut body)?;
        if body.len() as u64 > MAX_BODY_SIZE {
            return Err(Error::TooLarge);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, net::TcpListener, thread};

    use testresult::TestResult;

    use super::*;

    #[test]
    fn plain_http_server_fails_handshake() -> TestResult {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let server = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n{}");
            }
        });

        let fetcher = HttpsFetcher::new(ConnectionSecurity::Unsafe, Duration::from_secs(5));
        let url = Url::new(&format!("https://127.0.0.1:{port}/jwks.json"))?;
        assert!(matches!(
            fetcher.fetch(&url),
            Err(Error::Transport { .. })
        ));
        let _ = server.join();
        Ok(())
    }
}
