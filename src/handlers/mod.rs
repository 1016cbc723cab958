//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry that turn
//! received lines into state mutations, events and replies.

mod cap;
mod channel;
mod connection;
mod core;
mod messaging;
mod server;
mod user;

pub use self::core::{Context, Handler, Registry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerInfo, SessionConfig};
    use crate::event::{Event, EventKind};
    use crate::lag::{LagProbe, ProbeKind};
    use crate::outbound::IdSource;
    use crate::state::{Phase, SessionState, Store};
    use parking_lot::Mutex;
    use slirc_wire::Message;
    use std::time::{Duration, Instant};

    struct Harness {
        registry: Registry,
        state: SessionState,
        store: Store,
        server: ServerInfo,
        config: SessionConfig,
        ids: IdSource,
        user_probe: Mutex<LagProbe>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(SessionConfig::default())
        }

        fn with_config(config: SessionConfig) -> Self {
            let mut server = ServerInfo::new("irc.example.net", 6667, "mynick");
            server.second_nick = Some("mynick2".into());
            let mut state = SessionState::new("mynick");
            state.phase = Phase::Registered;
            Self {
                registry: Registry::new(),
                state,
                store: Store::new(
                    config.channel_buffer_length,
                    config.user_buffer_length,
                ),
                server,
                config,
                ids: IdSource::new(),
                user_probe: Mutex::new(LagProbe::new(ProbeKind::User)),
            }
        }

        fn feed_at(&mut self, line: &str, now: Instant) -> (Vec<Event>, Vec<String>) {
            let msg = Message::parse(line);
            let mut ctx = Context::new(
                &mut self.state,
                &mut self.store,
                &self.server,
                &self.config,
                &self.ids,
                &self.user_probe,
            );
            ctx.now = now;
            self.registry.dispatch(&mut ctx, &msg);
            (ctx.events, ctx.outbound)
        }

        fn feed(&mut self, line: &str) -> (Vec<Event>, Vec<String>) {
            self.feed_at(line, Instant::now())
        }
    }

    fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(Event::kind).collect()
    }

    // ------------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------------

    #[test]
    fn ping_echoes_parameters() {
        let mut h = Harness::new();
        let (events, out) = h.feed("PING :irc.example.net");
        assert!(events.is_empty());
        assert_eq!(out, vec!["PONG :irc.example.net"]);

        let (_, out) = h.feed("PING token");
        assert_eq!(out, vec!["PONG token"]);

        let (_, out) = h.feed(":hub.example.net PING :abc");
        assert_eq!(out, vec!["PONG :abc"]);
    }

    #[test]
    fn welcome_connects_and_arms_lag_timer() {
        let mut h = Harness::new();
        h.server.nickserv_password = Some("sekrit".into());
        h.config.autojoin = vec!["#rust".into()];

        let (events, out) = h.feed(":irc.example.net 001 mynick :Welcome");
        assert!(matches!(&events[..], [Event::Connected(s)] if s == "irc.example.net"));
        assert!(h.state.welcomed);
        assert!(h.state.lag_timer_armed);
        assert_eq!(h.state.server_name, "irc.example.net");
        assert_eq!(
            out,
            vec!["PRIVMSG NickServ :IDENTIFY sekrit", "JOIN #rust"]
        );
    }

    #[test]
    fn periodic_probe_measures_lag() {
        let mut h = Harness::new();
        let start = Instant::now();
        let token = h.state.lag_probe.arm(9, start);

        let later = start + Duration::from_millis(250);
        let (events, _) = h.feed_at(&format!(":irc.example.net PONG irc.example.net :{token}"), later);
        assert!(matches!(&events[..], [Event::LagMeasured(250)]));
        assert_eq!(h.state.lag, Some(Duration::from_millis(250)));
        assert!(!h.state.lag_probe.in_flight());

        // Stale or foreign PONGs are ignored.
        let (events, _) = h.feed(&format!("PONG :{token}"));
        assert!(events.is_empty());
        let (events, _) = h.feed("PONG :irc.example.net");
        assert!(events.is_empty());
    }

    #[test]
    fn pong_token_without_colon() {
        let mut h = Harness::new();
        let start = Instant::now();
        let token = h.state.lag_probe.arm(5, start);

        let later = start + Duration::from_millis(80);
        let (events, _) = h.feed_at(&format!(":irc PONG irc {token}"), later);
        assert!(matches!(&events[..], [Event::LagMeasured(80)]));
        assert!(!h.state.lag_probe.in_flight());

        let token = h.user_probe.lock().arm(6, start);
        let (events, _) = h.feed_at(&format!("PONG {token}"), later);
        assert!(matches!(&events[..], [Event::UserLagMeasured(80)]));
    }

    #[test]
    fn welcome_while_closing_keeps_phase() {
        let mut h = Harness::new();
        h.state.phase = Phase::Closing;
        let (events, _) = h.feed(":irc.example.net 001 mynick :Welcome");
        assert!(matches!(&events[..], [Event::Connected(_)]));
        assert_eq!(h.state.phase, Phase::Closing);

        h.state.phase = Phase::Registering;
        h.feed(":irc.example.net 001 mynick :Welcome");
        assert_eq!(h.state.phase, Phase::Registered);
    }

    #[test]
    fn user_probe_measures_lag() {
        let mut h = Harness::new();
        let start = Instant::now();
        let token = h.user_probe.lock().arm(4, start);

        let (events, _) = h.feed_at(&format!("PONG :{token}"), start + Duration::from_millis(40));
        assert!(matches!(&events[..], [Event::UserLagMeasured(40)]));
        assert!(!h.user_probe.lock().in_flight());
        assert_eq!(h.state.lag, None);
    }

    #[test]
    fn nick_collision_falls_back_then_gives_up() {
        let mut h = Harness::new();
        h.state.phase = Phase::Registering;

        let (events, out) = h.feed(":irc 433 * mynick :Nickname is already in use");
        assert!(matches!(&events[..], [Event::FirstNickInUse(n)] if n == "mynick"));
        assert_eq!(out, vec!["NICK mynick2"]);
        assert_eq!(h.state.nick, "mynick2");

        let (events, out) = h.feed(":irc 433 * mynick2 :Nickname is already in use");
        assert!(matches!(&events[..], [Event::AllNicksInUse(n)] if n == "mynick2"));
        assert!(out.is_empty());
        assert!(h.state.registration_abandoned);

        let (events, out) = h.feed(":irc 433 * mynick2 :Nickname is already in use");
        assert!(events.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn nick_collision_after_welcome_is_ignored() {
        let mut h = Harness::new();
        h.feed(":irc 001 mynick :Welcome");
        let (events, out) = h.feed(":irc 433 mynick other :Nickname is already in use");
        assert!(events.is_empty());
        assert!(out.is_empty());
    }

    // ------------------------------------------------------------------------
    // Capabilities
    // ------------------------------------------------------------------------

    #[test]
    fn cap_ls_requests_and_registers() {
        let mut h = Harness::new();
        h.state.phase = Phase::Registering;
        h.server.server_password = Some("pw".into());

        let (_, out) = h.feed(":irc CAP * LS * :sasl account-notify");
        assert!(out.is_empty(), "continuation line must not finish negotiation");

        let (_, out) = h.feed(":irc CAP * LS :multi-prefix away-notify");
        assert!(h.state.ircv3);
        assert_eq!(h.state.offered_caps.len(), 4);
        assert_eq!(
            out,
            vec![
                "CAP REQ :multi-prefix",
                "CAP END",
                "PASS pw",
                "NICK mynick",
                "USER slirc 0 * :slirc client",
            ]
        );
        assert_eq!(h.state.phase, Phase::Registered);

        // A later LS does not register again.
        let (_, out) = h.feed(":irc CAP * LS :multi-prefix");
        assert!(out.is_empty());
    }

    #[test]
    fn cap_ls_without_wanted_caps_skips_request() {
        let mut h = Harness::new();
        h.state.phase = Phase::Registering;
        let (_, out) = h.feed("CAP * LS :sasl");
        assert_eq!(out[0], "CAP END");
        assert_eq!(out[1], "NICK mynick");
    }

    #[test]
    fn cap_ack_and_nak() {
        let mut h = Harness::new();
        let (events, _) = h.feed(":irc CAP mynick ACK :multi-prefix");
        assert!(matches!(&events[..], [Event::CapabilityAccepted(c)] if c == "multi-prefix"));
        assert_eq!(h.state.enabled_caps, vec!["multi-prefix"]);

        let (events, _) = h.feed(":irc CAP mynick NAK :sasl");
        assert!(matches!(&events[..], [Event::CapabilityRejected(c)] if c == "sasl"));
    }

    #[test]
    fn unknown_cap_command_registers() {
        let mut h = Harness::new();
        h.state.phase = Phase::Registering;
        let (_, out) = h.feed(":irc 421 * CAP :Unknown command");
        assert_eq!(out, vec!["NICK mynick", "USER slirc 0 * :slirc client"]);

        let (_, out) = h.feed(":irc 421 mynick FOO :Unknown command");
        assert!(out.is_empty());
    }

    // ------------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------------

    #[test]
    fn join_names_scenario() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN :#t");
        h.feed(":alice!a@h JOIN :#t");
        h.feed(":irc 353 mynick = #t :@alice bob");
        let (events, _) = h.feed(":irc 366 mynick #t :End of /NAMES list.");

        assert!(matches!(&events[..], [Event::JoinedChannel(c)] if c == "#t"));
        let channel = h.store.channel("#t").unwrap();
        assert_eq!(channel.user("alice").unwrap().prefix(), "o");
        assert_eq!(channel.user("bob").unwrap().prefix(), "");
        assert!(h.store.has_user("alice"));
        assert!(h.store.has_user("bob"));
    }

    #[test]
    fn names_for_unknown_channel_creates_it() {
        let mut h = Harness::new();
        h.feed(":irc 353 mynick @ #new :+carol");
        assert_eq!(h.store.channel("#new").unwrap().user("carol").unwrap().prefix(), "v");
    }

    #[test]
    fn names_use_advertised_prefixes() {
        let mut h = Harness::new();
        h.feed(":irc 005 mynick PREFIX=(qaohv)~&@%+ NETWORK=Example :are supported by this server");
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":irc 353 mynick = #t :~root %half");
        let channel = h.store.channel("#t").unwrap();
        assert_eq!(channel.user("root").unwrap().prefix(), "q");
        assert_eq!(channel.user("half").unwrap().prefix(), "h");
    }

    #[test]
    fn other_join_to_unknown_channel_is_ignored() {
        let mut h = Harness::new();
        h.feed(":alice!a@h JOIN :#elsewhere");
        assert!(h.store.channel("#elsewhere").is_none());
        assert!(!h.store.has_user("alice"));
    }

    #[test]
    fn self_part_drops_channel_and_invisible_users() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":irc 353 mynick = #t :alice");
        let (events, _) = h.feed(":mynick!me@host PART #t :bye");

        assert!(matches!(&events[..], [Event::LeftChannel(c)] if c == "#t"));
        assert!(h.store.channel("#t").is_none());
        assert!(!h.store.has_user("alice"));
    }

    #[test]
    fn self_part_preserved_channel_is_marked_left() {
        let mut h = Harness::with_config(crate::config::SessionConfig {
            preserve_channels: true,
            ..Default::default()
        });
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":mynick!me@host PART #t");
        assert!(h.store.channel("#t").unwrap().is_left());

        h.feed(":mynick!me@host JOIN #t");
        assert!(!h.store.channel("#t").unwrap().is_left());
    }

    #[test]
    fn other_part_removes_member() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":alice!a@h JOIN #t");
        let (events, _) = h.feed(":alice!a@h PART #t");
        assert!(events.is_empty());
        assert!(!h.store.channel("#t").unwrap().has_user("alice"));
        assert!(!h.store.has_user("alice"));
    }

    #[test]
    fn kick_self_and_other() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":irc 353 mynick = #t :@op bob");

        let (events, _) = h.feed(":op!o@h KICK #t bob :spam");
        assert!(events.is_empty());
        assert!(!h.store.channel("#t").unwrap().has_user("bob"));

        let (events, _) = h.feed(":op!o@h KICK #t mynick :out");
        assert_eq!(kinds(&events), vec![EventKind::Kicked, EventKind::LeftChannel]);
        match &events[0] {
            Event::Kicked(msg) => assert_eq!(msg.trailing, "out"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.store.channel("#t").is_none());
    }

    #[test]
    fn topic_command_and_reply() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");

        h.feed(":irc 332 mynick #t :Welcome to #t");
        assert_eq!(h.store.channel("#t").unwrap().topic(), "Welcome to #t");

        h.feed(":alice!a@h TOPIC #t :new topic");
        assert_eq!(h.store.channel("#t").unwrap().topic(), "new topic");

        h.feed(":alice!a@h TOPIC #t :");
        assert_eq!(h.store.channel("#t").unwrap().topic(), "");

        h.feed(":alice!a@h TOPIC #t :#t");
        assert_eq!(h.store.channel("#t").unwrap().topic(), "#t");

        // unknown channel: nothing created
        h.feed(":irc 332 mynick #other :x");
        assert!(h.store.channel("#other").is_none());
    }

    // ------------------------------------------------------------------------
    // Users and messages
    // ------------------------------------------------------------------------

    #[test]
    fn nick_change_of_self_and_other() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":irc 353 mynick = #t :mynick @alice");

        h.feed(":alice!a@h NICK :alicia");
        let channel = h.store.channel("#t").unwrap();
        assert!(channel.has_user("alicia"));
        assert!(!channel.has_user("alice"));
        assert_eq!(channel.user("alicia").unwrap().prefix(), "o");

        h.feed(":mynick!me@host NICK newme");
        assert_eq!(h.state.nick, "newme");
        assert!(h.store.channel("#t").unwrap().has_user("newme"));
    }

    #[test]
    fn quit_removes_user() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #a");
        h.feed(":mynick!me@host JOIN #b");
        h.feed(":irc 353 mynick = #a :alice");
        h.feed(":irc 353 mynick = #b :alice");

        h.feed(":alice!a@h QUIT :Ping timeout");
        assert!(!h.store.channel("#a").unwrap().has_user("alice"));
        assert!(!h.store.channel("#b").unwrap().has_user("alice"));
        assert!(!h.store.has_user("alice"));
    }

    #[test]
    fn privmsg_routing() {
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        h.feed(":alice!a@h JOIN #t");

        h.feed(":alice!a@h PRIVMSG #t :hello channel");
        let channel = h.store.channel("#t").unwrap();
        assert_eq!(channel.messages().len(), 1);
        assert_eq!(channel.user("alice").unwrap().messages().len(), 1);

        h.feed(":dave!d@h PRIVMSG mynick :hi there");
        let dave = h.store.user("dave").unwrap();
        assert_eq!(dave.messages().latest().unwrap().trailing, "hi there");

        // channel we are not in: dropped
        h.feed(":alice!a@h PRIVMSG #nope :x");
        assert!(h.store.channel("#nope").is_none());
    }

    #[test]
    fn channel_buffer_is_bounded() {
        let mut h = Harness::with_config(crate::config::SessionConfig {
            channel_buffer_length: 3,
            ..Default::default()
        });
        h.feed(":mynick!me@host JOIN #t");
        for n in 0..5 {
            h.feed(&format!(":bob!b@h PRIVMSG #t :{n}"));
        }
        let texts: Vec<String> = h
            .store
            .channel("#t")
            .unwrap()
            .messages()
            .iter()
            .map(|m| m.trailing.clone())
            .collect();
        assert_eq!(texts, vec!["2", "3", "4"]);
    }

    // ------------------------------------------------------------------------
    // Server info
    // ------------------------------------------------------------------------

    #[test]
    fn isupport_records_tokens() {
        let mut h = Harness::new();
        let (events, _) =
            h.feed(":irc 005 mynick network=ExampleNet CHANTYPES=#& WHOX :are supported by this server");
        assert!(matches!(&events[..], [Event::GotServerName(n)] if n == "ExampleNet"));
        assert_eq!(h.state.server_name, "ExampleNet");
        assert_eq!(h.state.isupport.get("CHANTYPES").map(String::as_str), Some("#&"));
        assert_eq!(h.state.isupport.get("WHOX").map(String::as_str), Some(""));
    }

    #[test]
    fn motd_sequence() {
        let mut h = Harness::new();
        h.feed(":irc 375 mynick :- irc Message of the day -");
        h.feed(":irc 372 mynick :- Be nice");
        h.feed(":irc 372 mynick :- No spam");
        let (events, _) = h.feed(":irc 376 mynick :End of /MOTD command.");
        assert!(matches!(&events[..], [Event::GotMotd(m)] if m == "- Be nice\n- No spam"));
    }

    #[test]
    fn codes_are_exclusive() {
        // 332 must not fall into the welcome handler.
        let mut h = Harness::new();
        h.feed(":mynick!me@host JOIN #t");
        let (events, out) = h.feed(":irc 332 mynick #t :topic");
        assert!(events.is_empty());
        assert!(out.is_empty());
        assert!(!h.state.welcomed);

        // Unhandled and unparseable lines do nothing.
        let (events, out) = h.feed(":irc 002 mynick :Your host is irc");
        assert!(events.is_empty() && out.is_empty());
        let (events, out) = h.feed(":garbage");
        assert!(events.is_empty() && out.is_empty());
    }
}
