use kanal::AsyncReceiver;
use textsnap_types::AppEvent;
use tokio_util::sync::CancellationToken;

/// Console stand-in for the on-screen overlay and toast messages
pub async fn presenter_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => event?,
        };

        if let AppEvent::OcrStatusUpdate { status, capturing } = &event {
            tracing::info!("OCR status: {} (capturing: {})", status, capturing);
        }

        match render(&event) {
            Some(Line::Out(line)) => println!("{line}"),
            Some(Line::Err(line)) => eprintln!("{line}"),
            None => {}
        }

        if matches!(event, AppEvent::Quit) {
            break;
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

pub fn render(event: &AppEvent) -> Option<Line> {
    match event {
        AppEvent::BackendReady => Some(Line::Out(
            "[ready] 'capture' reads the outlined region, 'select on' to drag your own, 'quit' exits"
                .to_string(),
        )),
        AppEvent::OverlayChanged(region) => Some(Line::Out(format!("[overlay] {region}"))),
        AppEvent::ShowText { capture_id, text } => {
            Some(Line::Out(format!("[text {capture_id}]\n{text}")))
        }
        AppEvent::ShowError { kind, message, .. } if kind.is_blocking() => Some(Line::Err(format!(
            "[blocked] {message}. Grant access, then capture again."
        ))),
        AppEvent::ShowError { message, .. } => Some(Line::Err(format!("[error] {message}"))),
        _ => None,
    }
}
