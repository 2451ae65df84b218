use std::io::BufRead;
use std::thread::JoinHandle;

use kanal::AsyncSender;
use textsnap_types::{AppEvent, PointerEvent};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Parse one input line into an event. Blank lines yield `Ok(None)`.
///
/// ```text
/// capture | c            take a still and read it
/// select on|off          toggle drag selection
/// down|move|up <x> <y>   pointer input
/// resize <w> <h>         preview surface size
/// set <field> <value>    config update, e.g. `set ocr.threshold 140`
/// quit | q
/// ```
pub fn parse_command(line: &str) -> Result<Option<AppEvent>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    fn coord(s: &str) -> Result<f32, String> {
        s.parse().map_err(|_| format!("not a coordinate: '{s}'"))
    }

    fn size(s: &str) -> Result<u32, String> {
        s.parse().map_err(|_| format!("not a size: '{s}'"))
    }

    let event = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("capture" | "c", []) => AppEvent::TriggerCapture,
        ("select", ["on"]) => AppEvent::SetSelectionEnabled(true),
        ("select", ["off"]) => AppEvent::SetSelectionEnabled(false),
        ("down", [x, y]) => AppEvent::Pointer(PointerEvent::Down {
            x: coord(x)?,
            y: coord(y)?,
        }),
        ("move", [x, y]) => AppEvent::Pointer(PointerEvent::Move {
            x: coord(x)?,
            y: coord(y)?,
        }),
        ("up", [x, y]) => AppEvent::Pointer(PointerEvent::Up {
            x: coord(x)?,
            y: coord(y)?,
        }),
        ("resize", [w, h]) => AppEvent::SurfaceResized {
            width: size(w)?,
            height: size(h)?,
        },
        ("set", [field, value @ ..]) if !value.is_empty() => AppEvent::ConfigUpdate {
            field: field.to_string(),
            value: value.join(" "),
        },
        ("quit" | "exit" | "q", []) => AppEvent::Quit,
        _ => return Err(format!("Unrecognized command: '{}'", line.trim())),
    };

    Ok(Some(event))
}

/// Blocking send into the event loop; `false` once the loop is gone
fn forward(runtime: &Handle, event_tx: &AsyncSender<AppEvent>, event: AppEvent) -> bool {
    match runtime.block_on(event_tx.send(event)) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send command to app: {}", e);
            false
        }
    }
}

/// Read commands from stdin on a dedicated thread.
///
/// A plain thread rather than the blocking pool: a pending stdin read can't be
/// cancelled and would otherwise hold up runtime shutdown. EOF sends `Quit`.
pub fn spawn_stdin_watcher(
    event_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> std::io::Result<JoinHandle<()>> {
    let runtime = Handle::current();

    std::thread::Builder::new()
        .name("stdin-watcher".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if cancel.is_cancelled() {
                    return;
                }

                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };

                match parse_command(&line) {
                    Ok(Some(event)) => {
                        let quit = matches!(event, AppEvent::Quit);
                        if !forward(&runtime, &event_tx, event) || quit {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("{}", e),
                }
            }

            if !cancel.is_cancelled() {
                tracing::info!("Input closed, quitting");
                forward(&runtime, &event_tx, AppEvent::Quit);
            }
        })
}
