//! Inbound event demultiplexer.
//!
//! Turns each parsed server line into state updates, router calls and
//! command dispatches. Anything that must go back to the server right away
//! (PONG, JOIN, IDENTIFY) is returned to the caller instead of queued, so
//! this stays synchronous.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::router::Router;
use super::state::SessionState;
use crate::commands::{Permission, Principal};
use crate::context::BotContext;
use crate::dispatch::Dispatcher;
use crate::error::ConnectionError;
use crate::irc::{Command, Message, Response};

const NICKSERV: &str = "NickServ";

fn join(channel: &str) -> Message {
    Command::JOIN(channel.to_string(), None, None).into()
}

pub struct EventHandler {
    bot: Arc<BotContext>,
    state: Arc<SessionState>,
    router: Arc<dyn Router>,
    dispatcher: Arc<Dispatcher>,
    /// Nick sent with the last NICK during registration.
    attempted_nick: String,
    registered: bool,
}

impl EventHandler {
    pub fn new(
        bot: Arc<BotContext>,
        state: Arc<SessionState>,
        router: Arc<dyn Router>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let attempted_nick = bot.config.irc.name.clone();
        Self {
            bot,
            state,
            router,
            dispatcher,
            attempted_nick,
            registered: false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Handle one server line; returns the lines to write back immediately.
    pub fn handle(&mut self, msg: &Message) -> Result<Vec<Message>, ConnectionError> {
        let mut out = Vec::new();
        let source = msg.source_nickname();

        match &msg.command {
            Command::PING(token, _) => out.push(Command::PONG(token.clone(), None).into()),
            Command::ERROR(reason) => return Err(ConnectionError::ServerError(reason.clone())),
            Command::Response(response, args) => self.on_response(response, args, &mut out),
            Command::NICK(new) => self.on_nick(source, new),
            Command::JOIN(channel, _, _) => self.on_join(source, channel, &mut out),
            Command::PART(channel, _) => self.on_part(source, channel),
            Command::KICK(channel, victim, _) => self.on_kick(source, channel, victim, &mut out),
            Command::TOPIC(channel, topic) => {
                self.update_topic(channel, topic.as_deref().unwrap_or_default());
            }
            Command::NOTICE(_, text) => self.on_notice(source, text, &mut out),
            Command::PRIVMSG(target, text) => self.on_privmsg(source, target, text),
            other => debug!(command = ?other, "Ignoring command"),
        }
        Ok(out)
    }

    fn on_response(&mut self, response: &Response, args: &[String], out: &mut Vec<Message>) {
        let arg = |index: usize| args.get(index).map(String::as_str);
        match response {
            Response::RPL_WELCOME => self.on_welcome(arg(0), out),
            Response::ERR_NICKNAMEINUSE if !self.registered => {
                self.attempted_nick.push('_');
                warn!(nick = %self.attempted_nick, "Nickname in use, retrying");
                out.push(Command::NICK(self.attempted_nick.clone()).into());
            }
            Response::RPL_NOTOPIC => {
                if let Some(channel) = arg(1) {
                    self.update_topic(channel, "");
                }
            }
            Response::RPL_TOPIC => {
                if let (Some(channel), Some(topic)) = (arg(1), arg(2)) {
                    self.update_topic(channel, topic);
                }
            }
            Response::RPL_NAMREPLY => {
                if let (Some(channel), Some(names)) = (arg(2), arg(3)) {
                    self.state.push_names(channel, names);
                }
            }
            Response::RPL_ENDOFNAMES => {
                if let Some(channel) = arg(1) {
                    let router = &self.router;
                    self.state
                        .finish_names(channel, |name, members| router.on_members(name, members));
                }
            }
            _ => {}
        }
    }

    fn on_welcome(&mut self, confirmed: Option<&str>, out: &mut Vec<Message>) {
        let nick = confirmed
            .unwrap_or(self.attempted_nick.as_str())
            .to_string();
        info!(nick = %nick, "Registered with server");
        self.registered = true;
        self.state.set_own_nick(&nick);
        self.state.set_connected(true);
        self.router.on_connection(&nick);

        let mut channels: Vec<String> = Vec::new();
        let configured = self.bot.config.irc.channels.iter().map(|c| c.name.clone());
        for name in configured.chain(self.state.channel_names()) {
            if !channels.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
                channels.push(name);
            }
        }
        out.extend(channels.iter().map(|channel| join(channel)));
    }

    fn on_nick(&mut self, source: Option<&str>, new: &str) {
        let Some(old) = source else {
            return;
        };
        if self.state.is_self(old) {
            info!(old = %old, new = %new, "Own nick changed");
            self.state.set_own_nick(new);
        }
    }

    fn on_join(&mut self, source: Option<&str>, channel: &str, out: &mut Vec<Message>) {
        let Some(nick) = source else {
            return;
        };
        if self.state.is_self(nick) {
            if self.state.on_self_join(channel) {
                info!(channel = %channel, "Joined channel");
            }
            out.push(Command::TOPIC(channel.to_string(), None).into());
        } else {
            self.deliver_mail(channel, nick);
        }
        self.router.on_join(channel, nick);
    }

    fn on_part(&mut self, source: Option<&str>, channel: &str) {
        let Some(nick) = source else {
            return;
        };
        if self.state.is_self(nick) {
            info!(channel = %channel, "Left channel");
            self.state.on_self_leave(channel);
        }
        self.router.on_part(channel, nick);
    }

    fn on_kick(
        &mut self,
        source: Option<&str>,
        channel: &str,
        victim: &str,
        out: &mut Vec<Message>,
    ) {
        let by = source.unwrap_or_default();
        if self.state.is_self(victim) {
            warn!(channel = %channel, by = %by, "Kicked, rejoining");
            self.state.on_self_leave(channel);
            out.push(join(channel));
        }
        self.router.on_kick(channel, victim, by);
    }

    fn on_notice(&mut self, source: Option<&str>, text: &str, out: &mut Vec<Message>) {
        let source = source.unwrap_or_default();

        if source.eq_ignore_ascii_case(NICKSERV) {
            let password = &self.bot.config.irc.password;
            if text.contains("This nickname is registered") {
                if password.is_empty() {
                    warn!("Nickname is registered but no password is configured");
                } else {
                    info!("Identifying with NickServ");
                    out.push(
                        Command::PRIVMSG(NICKSERV.to_string(), format!("IDENTIFY {password}"))
                            .into(),
                    );
                }
            } else if text.contains("You are now identified") {
                info!("Identified with NickServ");
            } else if text.contains("Invalid password") {
                error!("NickServ rejected the configured password");
            }
        }
        self.router.on_notice(source, text);
    }

    fn on_privmsg(&mut self, source: Option<&str>, target: &str, text: &str) {
        let Some(nick) = source else {
            return;
        };
        if self.state.is_self(nick) {
            return;
        }
        if text.starts_with('\x01') {
            self.router.on_message(target, nick, text);
            return;
        }

        let permission = if self.bot.config.is_admin(nick) {
            Permission::Admin
        } else {
            Permission::User
        };
        let sigil = self.bot.table.sigil();

        if self.state.is_self(target) {
            self.deliver_mail(nick, nick);
            let line = text.strip_prefix(sigil).unwrap_or(text);
            debug!(nick = %nick, line = %line, "Private command");
            self.dispatcher
                .dispatch(line, Principal::private(nick, permission));
            return;
        }

        self.deliver_mail(target, nick);
        match text.strip_prefix(sigil) {
            Some(line) => {
                debug!(channel = %target, nick = %nick, line = %line, "Channel command");
                self.dispatcher
                    .dispatch(line, Principal::channel(target, nick, permission));
            }
            None => self.router.on_message(target, nick, text),
        }
    }

    fn update_topic(&self, channel: &str, topic: &str) {
        if self.state.set_topic(channel, topic) {
            self.router.on_topic(channel, topic);
        } else {
            debug!(channel = %channel, "Topic for unknown channel");
        }
    }

    /// Hand pending mail for `nick` to `target` (a channel, or `nick` itself).
    fn deliver_mail(&self, target: &str, nick: &str) {
        for mail in self.bot.mail.take(nick) {
            debug!(target = %target, nick = %nick, from = %mail.from, "Delivering mail");
            self.bot.outbound.enqueue(target, &mail.render(nick));
        }
    }
}
