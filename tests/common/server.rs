//! Scripted IRC server.
//!
//! Accepts one connection at a time and lets the test read the client's
//! lines and write server lines by hand.

use super::WAIT;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// A listening mock server on an ephemeral localhost port.
pub struct MockServer {
    listener: TcpListener,
}

impl MockServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Accept the next plain-text connection.
    pub async fn accept(&self) -> anyhow::Result<MockConn<tokio::net::TcpStream>> {
        let stream = self.accept_tcp().await?;
        Ok(MockConn::new(stream))
    }

    pub async fn accept_tcp(&self) -> anyhow::Result<tokio::net::TcpStream> {
        let (stream, _) = timeout(WAIT, self.listener.accept()).await??;
        Ok(stream)
    }
}

/// One accepted client connection.
pub struct MockConn<S> {
    stream: BufReader<S>,
}

impl<S> MockConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Send one server line; CRLF is appended.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;
        Ok(())
    }

    /// Next line from the client, without CRLF.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(WAIT, self.stream.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("client closed the connection");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Assert the next client line.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        anyhow::ensure!(line == expected, "expected {expected:?}, got {line:?}");
        Ok(())
    }

    /// Read client lines until one satisfies `pred` and return it.
    pub async fn recv_until<F>(&mut self, mut pred: F) -> anyhow::Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            let line = self.recv().await?;
            if pred(&line) {
                return Ok(line);
            }
        }
    }

    /// Round-trip a PING so everything sent before it has been handled.
    pub async fn sync(&mut self, token: &str) -> anyhow::Result<()> {
        self.send(&format!("PING :{token}")).await?;
        let pong = format!("PONG :{token}");
        self.recv_until(|line| line == pong).await?;
        Ok(())
    }

    /// Answer `CAP LS` with 421 and consume NICK/USER.
    pub async fn register_without_cap(&mut self, nick: &str) -> anyhow::Result<()> {
        self.expect("CAP LS").await?;
        self.send(":irc.test 421 * CAP :Unknown command").await?;
        self.expect(&format!("NICK {nick}")).await?;
        self.expect("USER slirc 0 * :slirc client").await?;
        Ok(())
    }
}
