//! Scripted IRC server.

use std::time::Duration;

use slircbot::irc::{Command, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// Listens on `127.0.0.1:0`.
pub struct FakeServer {
    listener: TcpListener,
}

impl FakeServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Accept the bot's next connection.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _) = timeout(Duration::from_secs(10), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }
}

/// One accepted bot connection, seen from the server side.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ServerConn {
    /// Send a raw IRC line to the bot.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single message from the bot.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed by bot");
        }
        line.trim_end()
            .parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive messages until one matches, returning the match.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Message>
    where
        F: FnMut(&Message) -> bool,
    {
        loop {
            let msg = self.recv().await?;
            if predicate(&msg) {
                return Ok(msg);
            }
        }
    }

    /// Next line with the given verb (`NICK`, `JOIN`, ...).
    pub async fn expect(&mut self, verb: &str) -> anyhow::Result<Message> {
        self.recv_until(|m| verb_of(m) == verb).await
    }

    /// Next PRIVMSG to `target`, as its text.
    pub async fn expect_privmsg(&mut self, target: &str) -> anyhow::Result<String> {
        let msg = self
            .recv_until(|m| matches!(&m.command, Command::PRIVMSG(t, _) if t == target))
            .await?;
        match msg.command {
            Command::PRIVMSG(_, text) => Ok(text),
            other => anyhow::bail!("unexpected {other:?}"),
        }
    }

    /// Complete registration as `nick` and acknowledge the JOINs that follow.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<Vec<String>> {
        let first = self.expect("NICK").await?;
        anyhow::ensure!(
            first.command == Command::NICK("slircbot".into()),
            "unexpected {first:?}"
        );
        self.expect("USER").await?;
        self.send_raw(&format!(":irc.test 001 {nick} :Welcome to the test network"))
            .await?;

        let join = self.expect("JOIN").await?;
        let Command::JOIN(channel, _, _) = join.command else {
            anyhow::bail!("unexpected {join:?}");
        };
        self.send_raw(&format!(":{nick}!bot@test JOIN {channel}")).await?;
        let topic = self.expect("TOPIC").await?;
        anyhow::ensure!(
            topic.command == Command::TOPIC(channel.clone(), None),
            "unexpected {topic:?}"
        );
        Ok(vec![channel])
    }

    /// Message from `nick` to `target`.
    pub async fn privmsg_from(&mut self, nick: &str, target: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":{nick}!{nick}@test PRIVMSG {target} :{text}"))
            .await
    }
}

/// The verb of a line the bot wrote, as it appears on the wire.
pub fn verb_of(msg: &Message) -> String {
    String::from(&msg.command)
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}
