//! Server-side HTML for the chat page.
//!
//! Layout: a header with title and logo, the scrollable transcript panel,
//! then the input row with the text form on the left and the collapsible
//! audio recorder on the right.

use crate::config::UiConfig;
use crate::session::{Notice, Role, SessionPhase, Transcript};

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Render the full chat page.
///
/// `logo` is inlined verbatim (it is the operator's own SVG file); every
/// piece of chat content is escaped.
pub fn render_page(
    ui: &UiConfig,
    logo: Option<&str>,
    transcript: &Transcript,
    notice: Option<&Notice>,
) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&ui.page_title)));
    html.push_str(&favicon(&ui.page_icon));
    html.push_str("<link rel=\"stylesheet\" href=\"/static/style.css\">\n");
    html.push_str("</head>\n<body>\n<main class=\"block-container\">\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&ui.heading)));
    if let Some(svg) = logo {
        html.push_str(&format!("<div class=\"logo-container\">{svg}</div>\n"));
    }
    html.push_str("</header>\n");

    // Transcript panel
    html.push_str("<section class=\"transcript\" id=\"transcript\">\n");
    for turn in transcript.turns() {
        let (class, avatar) = match turn.role() {
            Role::User => ("user", &ui.user_avatar),
            Role::Bot => ("bot", &ui.bot_avatar),
        };
        html.push_str(&format!(
            "<div class=\"msg msg-{class}\"><span class=\"avatar\">{}</span>\
             <div class=\"body\"><span class=\"role\">{}:</span> {}</div></div>\n",
            escape_html(avatar),
            turn.role().label(),
            escape_html(turn.content()),
        ));
    }
    html.push_str("</section>\n");

    if let Some(notice) = notice {
        let class = if notice.is_warning() { "warning" } else { "info" };
        html.push_str(&format!(
            "<div class=\"notice {class}\">{}</div>\n",
            escape_html(notice.text())
        ));
    }

    html.push_str(&input_row());

    html.push_str("<div class=\"busy\" id=\"busy\" hidden></div>\n");
    html.push_str("</main>\n<script src=\"/static/recorder.js\"></script>\n");
    html.push_str("</body>\n</html>\n");
    html
}

/// Minimal error page used when a submission fails outright.
pub fn render_error_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n<body>\n<main class=\"block-container\">\n\
         <h1>{title}</h1>\n<pre class=\"error\">{message}</pre>\n\
         <p><a href=\"/\">Back to the chat</a></p>\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        message = escape_html(message),
    )
}

fn favicon(icon: &str) -> String {
    format!(
        "<link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 \
         viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{}</text></svg>\">\n",
        escape_html(icon)
    )
}

fn input_row() -> String {
    format!(
        r#"<section class="inputs">
<form class="text-form" method="post" action="/chat/text" data-busy="{text_busy}">
<label for="message">Enter your text here:</label>
<input type="text" id="message" name="message" placeholder="Your message..." autocomplete="off">
<button type="submit">Submit</button>
</form>
<form class="audio-form" method="post" action="/chat/audio" enctype="multipart/form-data" data-busy="{audio_busy}">
<details>
<summary>🎙️ Audio Recorder</summary>
<label for="record">Record a voice message:</label>
<div class="recorder">
<button type="button" id="record">Record</button>
<audio id="playback" controls hidden></audio>
</div>
<input type="file" id="audio" name="audio" accept="audio/wav" hidden>
<button type="submit">Submit</button>
</details>
</form>
</section>
"#,
        text_busy = SessionPhase::Dispatching.label(),
        audio_busy = SessionPhase::Transcribing.label(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
