//! HTTP-to-telnet bridge: maps `c`/`p` query parameters onto the
//! remote-control command dispatcher.
//!
//! Grounded on `src-plugins/httptelnet/httptelnet.c`'s `_cb_generate_site`:
//! the original reads an HTTP session's query string for a `c` (command)
//! parameter plus its argument, hands it to the telnet command tree, and
//! maps the telnet result back onto an HTTP status. The HTTP transport
//! itself is out of scope here (spec.md §1) — this crate only expresses the
//! mapping as a plain function over [`plugin_remotecontrol::CommandDispatcher`].

use plugin_remotecontrol::{CommandDispatcher, CommandResult, Session};

/// HTTP-shaped outcome of bridging one request into the telnet dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResult {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
}

/// Bridge one HTTP request's query parameters into a telnet command.
///
/// `query` is the already-decoded query string (e.g. `c=interface&p=wlan0`).
/// Looks for a `c` parameter naming the command and an optional `p`
/// parameter carrying its argument string, matching `_cb_generate_site`'s
/// `http_lookup_param(session, "c")` / `"p"` calls.
pub fn handle_request(
    dispatcher: &CommandDispatcher,
    query: &str,
    out: &mut Vec<u8>,
) -> HttpResult {
    let params = parse_query(query);
    let Some(command) = params.get("c") else {
        tracing::debug!("http2telnet request missing 'c' parameter");
        return HttpResult::BadRequest;
    };
    let arg = params.get("p").copied().unwrap_or("");
    let line = if arg.is_empty() {
        command.to_string()
    } else {
        format!("{command} {arg}")
    };

    let mut session = Session::new();
    match dispatcher.dispatch(&line, out, &mut session) {
        CommandResult::Active | CommandResult::Continuous | CommandResult::Quit => HttpResult::Ok,
        CommandResult::UnknownCommand => HttpResult::NotFound,
        CommandResult::BufferError => HttpResult::InternalError,
    }
}

/// Minimal `key=value&key=value` query-string splitter. HTTP-layer
/// percent-decoding is the caller's responsibility (out of scope — the
/// HTTP transport itself is a contract here, not an implementation).
fn parse_query(query: &str) -> std::collections::HashMap<&str, &str> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCommand;
    impl plugin_remotecontrol::Command for EchoCommand {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn help(&self) -> &'static str {
            "echoes its argument back"
        }
        fn execute(
            &self,
            params: &str,
            out: &mut dyn std::io::Write,
            _session: &mut Session,
        ) -> CommandResult {
            let _ = out.write_all(params.as_bytes());
            CommandResult::Active
        }
    }

    fn dispatcher() -> CommandDispatcher {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(Box::new(EchoCommand)).unwrap();
        dispatcher
    }

    #[test]
    fn routes_c_and_p_into_the_command() {
        let dispatcher = dispatcher();
        let mut out = Vec::new();
        let result = handle_request(&dispatcher, "c=echo&p=hello", &mut out);
        assert_eq!(result, HttpResult::Ok);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn missing_command_parameter_is_a_bad_request() {
        let dispatcher = dispatcher();
        let mut out = Vec::new();
        assert_eq!(handle_request(&dispatcher, "p=hello", &mut out), HttpResult::BadRequest);
    }

    #[test]
    fn unknown_command_maps_to_not_found() {
        let dispatcher = dispatcher();
        let mut out = Vec::new();
        assert_eq!(handle_request(&dispatcher, "c=bogus", &mut out), HttpResult::NotFound);
    }
}
