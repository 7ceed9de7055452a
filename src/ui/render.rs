//! HTML rendering of pages and message fragments.
//!
//! The core hands this module a [`RenderedMessage`] — timestamp, body,
//! optional sender, message class — and this module turns it into an htmx
//! out-of-band fragment appended to the chat log. Which class a recipient
//! gets is decided in the relay core, never here.

use crate::common::time::timestamp_to_display;
use crate::domain::{MessageClass, RenderedMessage};

/// Escape text for safe interpolation into HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one message as an htmx out-of-band append to `#content`.
pub fn message_fragment(message: &RenderedMessage) -> String {
    let time = timestamp_to_display(message.timestamp);
    let body = escape_html(&message.body);
    let inner = match message.class {
        MessageClass::Own => {
            format!("<p class=\"self-message\">{time}: {body}</p>")
        }
        MessageClass::Peer => {
            let sender = message
                .sender
                .as_ref()
                .map(|s| escape_html(s.as_str()))
                .unwrap_or_default();
            format!(
                "<p class=\"message\"><span class=\"font-size-12\">@{sender}</span><br/>{time}: {body}</p>"
            )
        }
        MessageClass::ServerNotice => {
            format!("<p class=\"server-message\">{time}: {body}</p>")
        }
    };
    format!("<div hx-swap-oob=\"beforeend:#content\">{inner}</div>")
}

/// The welcome page: a form asking for a display name.
pub fn welcome_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <title>spchat</title>
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
    <script src="https://unpkg.com/htmx.org@1.9.12/dist/ext/ws.js"></script>
</head>
<body>
    <h1>spchat</h1>
    <form hx-post="/room" hx-target="body">
        <label for="handle">Pick a handle:</label>
        <input type="text" id="handle" name="handle" autofocus required/>
        <button type="submit">Join the room</button>
    </form>
</body>
</html>
"#
    .to_string()
}

/// The chat-area view for one client: a WebSocket-connected message log and
/// a send form.
pub fn chat_area(client_id: &str) -> String {
    let client_id = escape_html(client_id);
    format!(
        r#"<div hx-ext="ws" ws-connect="/ws/{client_id}">
    <h2>Room — you are @{client_id}</h2>
    <div id="content"></div>
    <form ws-send>
        <input type="text" name="chat_message" autofocus autocomplete="off"/>
        <button type="submit">Send</button>
    </form>
</div>
"#
    )
}
