//! Event loops feeding the chat view

use std::io::{self, Write};
use std::path::Path;

use spaceroom_net::{PushClient, PushEvent};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::render::render;
use crate::view::ChatView;

const SEPARATOR: &str = "----";

/// Write the current transcript of `view`
pub fn print_transcript<W: Write>(view: &ChatView, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", SEPARATOR)?;
    for line in render(&view.lines(), view.transcript_config()) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Feed a file of JSON push events through the view, one event per line.
///
/// Unparseable lines are skipped. Returns the number of applied events.
pub async fn replay<W: Write>(
    path: &Path,
    view: &mut ChatView,
    out: &mut W,
) -> io::Result<usize> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut applied = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = match serde_json::from_str::<PushEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping invalid event");
                continue;
            }
        };

        if let Some(event) = event.into_source_event(view.conversation_id()) {
            if !view.apply(event) {
                break;
            }
            applied += 1;
            print_transcript(view, out)?;
        }
    }

    info!(path = %path.display(), applied, "Replay finished");
    Ok(applied)
}

/// Follow a live push channel; each stdin line is sent as a message
pub async fn follow(mut client: PushClient, view: &mut ChatView) -> io::Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut input_open = true;

    print_transcript(view, &mut stdout)?;
    loop {
        tokio::select! {
            event = client.next_event() => {
                let Some(event) = event else { break };
                if !view.apply(event) {
                    break;
                }
                print_transcript(view, &mut stdout)?;
            }
            line = stdin.next_line(), if input_open => {
                match line? {
                    Some(text) => match view.send(&text) {
                        Ok(record) => {
                            print_transcript(view, &mut stdout)?;
                            if let Err(e) = client.submit(record).await {
                                warn!(error = %e, "Message not submitted");
                            }
                        }
                        Err(e) => warn!(error = %e, "Message not sent"),
                    },
                    None => {
                        info!("Input closed, disconnecting");
                        input_open = false;
                        client.disconnect().await;
                    }
                }
            }
        }
    }

    info!(
        conversation_id = %client.conversation_id(),
        pending = view.pending_count(),
        "Push channel closed"
    );
    Ok(())
}
