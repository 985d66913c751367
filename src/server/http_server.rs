use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer as MiniHttpServer, HttpService};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Starts a `may_minihttp` service on a concrete address.
pub(crate) struct HttpServer<T>(pub T);

/// Handle to a running listener coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the address until a TCP connection succeeds.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the listener is not accepting within about a second.
    pub fn wait_ready(&self) -> io::Result<()> {
        let probe = if self.addr.ip().is_unspecified() {
            SocketAddr::from(([127, 0, 0, 1], self.addr.port()))
        } else {
            self.addr
        };
        for _ in 0..200 {
            if TcpStream::connect(probe).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the listener coroutine and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel is unsafe in may because the coroutine unwinds at its
        // next yield point. The listener holds no state that outlives it, and
        // the handle is owned here so nothing else observes the cancellation.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            tracing::debug!(addr = %self.addr, "Listener coroutine ended by cancellation");
        }
    }
}

const FREE_PORT_ATTEMPTS: usize = 5;

/// Pick a free port for `addr` by binding and releasing it.
///
/// `may_minihttp` binds its own listener, so the port is free again between
/// this probe and that bind; [`bind_with_retry`] covers the window.
fn resolve(mut addr: SocketAddr) -> io::Result<SocketAddr> {
    if addr.port() == 0 {
        let probe = TcpListener::bind(addr)?;
        addr.set_port(probe.local_addr()?.port());
    }
    Ok(addr)
}

/// Call `bind` with a concrete address. When the caller asked for port 0 and
/// the chosen port was taken in the meantime, try again with a new one.
fn bind_with_retry<T>(
    requested: SocketAddr,
    mut bind: impl FnMut(SocketAddr) -> io::Result<T>,
) -> io::Result<(SocketAddr, T)> {
    let mut attempt = 1;
    loop {
        let addr = resolve(requested)?;
        match bind(addr) {
            Ok(bound) => return Ok((addr, bound)),
            Err(e)
                if requested.port() == 0
                    && e.kind() == io::ErrorKind::AddrInUse
                    && attempt < FREE_PORT_ATTEMPTS =>
            {
                tracing::debug!(addr = %addr, attempt, "Free port taken before bind, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    pub(crate) fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let requested = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let service = self.0;
        let (addr, handle) =
            bind_with_retry(requested, |addr| MiniHttpServer(service.clone()).start(addr))?;
        Ok(ServerHandle { addr, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_port() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[test]
    fn test_resolve_picks_port() {
        let addr = resolve(any_port()).unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_taken_free_port_is_retried() {
        let mut tried = Vec::new();
        let (addr, listener) = bind_with_retry(any_port(), |addr| {
            tried.push(addr);
            if tried.len() < 3 {
                Err(io::Error::from(io::ErrorKind::AddrInUse))
            } else {
                TcpListener::bind(addr)
            }
        })
        .unwrap();
        assert_eq!(tried.len(), 3);
        assert_eq!(listener.local_addr().unwrap(), addr);
    }

    #[test]
    fn test_explicit_port_is_not_retried() {
        let taken = TcpListener::bind(any_port()).unwrap();
        let requested = taken.local_addr().unwrap();
        let mut calls = 0;
        let err = bind_with_retry(requested, |addr| {
            calls += 1;
            TcpListener::bind(addr)
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let err = bind_with_retry(any_port(), |_addr| -> io::Result<()> {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::AddrInUse))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        assert_eq!(calls, FREE_PORT_ATTEMPTS);
    }
}
