use photo_carousel::events::{ImageProbed, ImageStatus, ProbeImage};
use photo_carousel::tasks::probe;
use std::fs;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn probes_report_loaded_and_failed_images() {
    let tmp = tempdir().unwrap();
    let good = tmp.path().join("good.png");
    image::RgbaImage::new(4, 3).save(&good).unwrap();
    let corrupt = tmp.path().join("corrupt.jpg");
    fs::write(&corrupt, b"definitely not a jpeg").unwrap();
    let missing = tmp.path().join("missing.webp");

    let requests = vec![
        ProbeImage {
            slide: 0,
            path: good.clone(),
        },
        ProbeImage {
            slide: 1,
            path: corrupt.clone(),
        },
        ProbeImage {
            slide: 2,
            path: missing.clone(),
        },
    ];

    let (tx, mut rx) = mpsc::channel::<ImageProbed>(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(probe::run(requests, tx, cancel.clone(), 1));

    let mut results: Vec<ImageProbed> = Vec::new();
    while results.len() < 3 {
        let probed = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout waiting for probe result")
            .expect("probe channel closed early");
        results.push(probed);
    }
    results.sort_by_key(|p| p.slide);

    assert_eq!(results[0].path, good);
    assert_eq!(
        results[0].status,
        ImageStatus::Loaded {
            width: 4,
            height: 3
        }
    );
    assert!(matches!(results[1].status, ImageStatus::Failed(_)));
    assert!(matches!(results[2].status, ImageStatus::Failed(_)));

    handle
        .await
        .expect("probe task panicked")
        .expect("probe task failed");
    assert!(rx.recv().await.is_none(), "sender dropped once probes finish");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn probe_stops_when_cancelled() {
    let tmp = tempdir().unwrap();
    let requests = (0..16)
        .map(|slide| ProbeImage {
            slide,
            path: tmp.path().join(format!("{slide}.png")),
        })
        .collect();

    // Nobody reads, so the task parks on a full channel until cancelled.
    let (tx, _rx) = mpsc::channel::<ImageProbed>(1);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(probe::run(requests, tx, cancel.clone(), 2));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    cancel.cancel();

    tokio::time::timeout(std::time::Duration::from_secs(2), handle)
        .await
        .expect("probe task ignored cancellation")
        .expect("probe task panicked")
        .expect("probe task failed");
}

#[test]
fn probe_reads_dimensions_synchronously() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("wide.png");
    image::RgbaImage::new(16, 2).save(&path).unwrap();
    assert_eq!(
        probe::probe(&path),
        ImageStatus::Loaded {
            width: 16,
            height: 2
        }
    );
}
