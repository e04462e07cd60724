use anyhow::Result;
use tokio::select;
use tokio::sync::{mpsc::Receiver, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::command::Command;
use crate::events::{ImageProbed, TimerFired};
use crate::page::{Page, Status};
use crate::scheduler::Scheduler;

/// Drive `page` from its three event sources until cancelled or told to quit.
///
/// Every change is applied here, one event at a time, so the page never sees
/// concurrent access. The latest [`Status`] is published on `status` after
/// each event. The page is torn down and handed back on exit.
pub async fn run<S: Scheduler>(
    mut page: Page<S>,
    mut timers: Receiver<TimerFired>,
    mut commands: Receiver<Command>,
    mut probes: Receiver<ImageProbed>,
    status: watch::Sender<Status>,
    cancel: CancellationToken,
) -> Result<Page<S>> {
    status.send_replace(page.status());

    loop {
        select! {
            _ = cancel.cancelled() => break,

            Some(fired) = timers.recv() => {
                page.on_timer(fired);
            }

            Some(command) = commands.recv() => {
                debug!(?command, "command received");
                match command {
                    Command::Quit => {
                        info!("quit requested; initiating shutdown");
                        cancel.cancel();
                        break;
                    }
                    Command::Status => info!(status = %page.status(), "carousel status"),
                    other => page.perform(&other),
                }
            }

            Some(probed) = probes.recv() => {
                page.apply_image_status(&probed);
            }
        }
        status.send_if_modified(|current| {
            let next = page.status();
            let changed = *current != next;
            *current = next;
            changed
        });
    }

    page.teardown();
    status.send_replace(page.status());
    Ok(page)
}
