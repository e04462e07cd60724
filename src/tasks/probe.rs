use std::path::Path;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{ImageProbed, ImageStatus, ProbeImage};

/// Read just enough of the file to learn its dimensions.
pub fn probe(path: &Path) -> ImageStatus {
    match image::image_dimensions(path) {
        Ok((width, height)) => ImageStatus::Loaded { width, height },
        Err(err) => ImageStatus::Failed(err.to_string()),
    }
}

/// Probe every slide image off the event loop, at most `max_in_flight` at a
/// time, and report each outcome to the page. Returns once every request has
/// been answered, the page hangs up, or `cancel` fires.
pub async fn run(
    requests: Vec<ProbeImage>,
    to_page: Sender<ImageProbed>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut queue = requests.into_iter();
    let mut tasks: JoinSet<ImageProbed> = JoinSet::new();
    let max_in_flight = max_in_flight.max(1);

    loop {
        while tasks.len() < max_in_flight {
            let Some(ProbeImage { slide, path }) = queue.next() else {
                break;
            };
            debug!(slide, path = %path.display(), "probing slide image");
            tasks.spawn_blocking(move || ImageProbed {
                slide,
                status: probe(&path),
                path,
            });
        }
        if tasks.is_empty() {
            break;
        }

        select! {
            _ = cancel.cancelled() => {
                tasks.abort_all();
                break;
            }
            Some(joined) = tasks.join_next() => match joined {
                Ok(probed) => select! {
                    _ = cancel.cancelled() => {
                        tasks.abort_all();
                        break;
                    }
                    sent = to_page.send(probed) => {
                        if sent.is_err() {
                            debug!("page closed; abandoning image probes");
                            break;
                        }
                    }
                },
                Err(err) => warn!("image probe task failed: {err}"),
            },
            else => break,
        }
    }
    Ok(())
}
